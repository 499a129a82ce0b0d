//! Containerized execution strategy (Linux targets).
//!
//! Builds (or reuses) a per-libc-family build image from an embedded
//! Dockerfile, then re-invokes this orchestrator's hidden `matrix` entry
//! point inside `docker run` with three bind mounts: source (read-only),
//! output (read-write), and the binary itself. The transient workspace
//! lives on the container's own filesystem and is never mounted.

use std::collections::BTreeMap;

use relforge_platform::{Abi, Arch, Target};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::ReleaseConfig;
use crate::consts;
use crate::error::{ReleaseError, Result};
use crate::exec;

/// Build-environment descriptor for glibc-based targets.
const GNU_DOCKERFILE: &str =
  include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/env/linux-gnu.Dockerfile"));

/// Build-environment descriptor for musl-based targets.
const MUSL_DOCKERFILE: &str =
  include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/env/linux-musl.Dockerfile"));

/// Image tag for a target's build environment, derived from libc family
/// and CPU architecture.
pub fn image_tag(target: &Target) -> String {
  format!("{}:{}-{}", consts::IMAGE_PREFIX, target.abi, target.arch)
}

fn docker_platform(arch: Arch) -> &'static str {
  match arch {
    Arch::X86_64 => "linux/amd64",
    Arch::Aarch64 => "linux/arm64",
  }
}

fn dockerfile_for(target: &Target) -> &'static str {
  match target.abi {
    Abi::Musl => MUSL_DOCKERFILE,
    _ => GNU_DOCKERFILE,
  }
}

/// Run the matrix for `config` inside the build container.
pub async fn run(config: &ReleaseConfig) -> Result<()> {
  // The orchestrator binary is bind-mounted and re-executed inside the
  // image, so the host must itself be Linux.
  if !cfg!(target_os = "linux") {
    return Err(ReleaseError::Toolchain(
      "containerized builds require a Linux host".to_string(),
    ));
  }

  preflight().await?;
  let tag = ensure_image(&config.target).await?;
  run_matrix_in_container(config, &tag).await
}

/// Verify the container daemon is reachable before any image work.
async fn preflight() -> Result<()> {
  exec::run_captured("docker", &["version".to_string()], &BTreeMap::new())
    .await
    .map_err(|e| match e {
      ReleaseError::MissingTool { program } => ReleaseError::MissingTool { program },
      _ => ReleaseError::Toolchain("docker daemon not reachable".to_string()),
    })?;
  Ok(())
}

/// Build the target's build-environment image, reusing an existing one.
async fn ensure_image(target: &Target) -> Result<String> {
  let tag = image_tag(target);
  let env = BTreeMap::new();

  let inspect = ["image".to_string(), "inspect".to_string(), tag.clone()];
  if exec::run_captured("docker", &inspect, &env).await.is_ok() {
    debug!(tag, "reusing existing build image");
    return Ok(tag);
  }

  info!(tag, "building build-environment image");
  let context = TempDir::with_prefix("relforge-image-")?;
  let dockerfile = context.path().join("Dockerfile");
  std::fs::write(&dockerfile, dockerfile_for(target))?;

  let args = vec![
    "build".to_string(),
    "--platform".to_string(),
    docker_platform(target.arch).to_string(),
    "-t".to_string(),
    tag.clone(),
    "-f".to_string(),
    dockerfile.display().to_string(),
    context.path().display().to_string(),
  ];
  exec::run_checked("docker", &args, None, &env).await?;
  Ok(tag)
}

async fn run_matrix_in_container(config: &ReleaseConfig, tag: &str) -> Result<()> {
  let exe = std::env::current_exe()?;
  let mut args = vec![
    "run".to_string(),
    "--rm".to_string(),
    "--platform".to_string(),
    docker_platform(config.target.arch).to_string(),
  ];

  // Artifacts written to the output mount must belong to the caller, not
  // to a container account.
  #[cfg(unix)]
  {
    let uid = nix::unistd::Uid::current();
    let gid = nix::unistd::Gid::current();
    args.push("--user".to_string());
    args.push(format!("{uid}:{gid}"));
  }

  args.push("-v".to_string());
  args.push(format!("{}:{}:ro", config.source_dir.display(), consts::CONTAINER_SRC));
  args.push("-v".to_string());
  args.push(format!("{}:{}", config.out_dir.display(), consts::CONTAINER_OUT));
  args.push("-v".to_string());
  args.push(format!("{}:{}:ro", exe.display(), consts::CONTAINER_BIN));

  if let Ok(filter) = std::env::var("RUST_LOG") {
    args.push("-e".to_string());
    args.push(format!("RUST_LOG={filter}"));
  }

  args.push(tag.to_string());
  args.extend(matrix_command(&config.target));

  info!(tag, target = %config.target, "running build matrix in container");
  exec::run_checked("docker", &args, None, &BTreeMap::new()).await
}

/// The re-entry command executed inside the container.
fn matrix_command(target: &Target) -> Vec<String> {
  vec![
    consts::CONTAINER_BIN.to_string(),
    "matrix".to_string(),
    "--target".to_string(),
    target.to_string(),
    "--source".to_string(),
    consts::CONTAINER_SRC.to_string(),
    "--workspace".to_string(),
    consts::CONTAINER_WORKSPACE.to_string(),
    "--out".to_string(),
    consts::CONTAINER_OUT.to_string(),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn image_tag_encodes_family_and_arch() {
    let gnu = Target::parse("linux-gnu-x86_64").unwrap();
    let musl = Target::parse("linux-musl-aarch64").unwrap();
    assert_eq!(image_tag(&gnu), "libmem-build-env:gnu-x86_64");
    assert_eq!(image_tag(&musl), "libmem-build-env:musl-aarch64");
  }

  #[test]
  fn dockerfile_follows_libc_family() {
    let gnu = Target::parse("linux-gnu-x86_64").unwrap();
    let musl = Target::parse("linux-musl-x86_64").unwrap();
    assert!(dockerfile_for(&gnu).contains("debian"));
    assert!(dockerfile_for(&musl).contains("alpine"));
  }

  #[test]
  fn docker_platform_mapping() {
    assert_eq!(docker_platform(Arch::X86_64), "linux/amd64");
    assert_eq!(docker_platform(Arch::Aarch64), "linux/arm64");
  }

  #[test]
  fn matrix_command_uses_container_paths() {
    let target = Target::parse("linux-musl-x86_64").unwrap();
    let cmd = matrix_command(&target);
    assert_eq!(cmd[0], "/usr/local/bin/relforge");
    assert_eq!(cmd[1], "matrix");
    assert!(cmd.contains(&"/src".to_string()));
    assert!(cmd.contains(&"/out".to_string()));
    assert!(cmd.contains(&"linux-musl-x86_64".to_string()));
  }
}
