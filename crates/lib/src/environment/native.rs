//! Host-native execution strategy (Windows/MSVC targets).
//!
//! Locates the newest Visual Studio installation via `vswhere`, captures
//! the environment produced by `vcvarsall.bat` for the target
//! architecture, and runs the matrix in-process with that environment
//! applied to every tool invocation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use relforge_platform::{Arch, Target};
use tracing::{debug, info};

use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::exec;
use crate::matrix::{self, BuildContext};
use crate::workspace::TransientWorkspace;

/// Run the matrix for `config` with an activated host toolchain.
pub async fn run(config: &ReleaseConfig) -> Result<()> {
  let env = activate_msvc(&config.target).await?;
  let workspace = TransientWorkspace::create_temp()?;

  let ctx = BuildContext {
    target: config.target,
    source_dir: config.source_dir.clone(),
    workspace_dir: workspace.path().to_path_buf(),
    out_dir: config.out_dir.clone(),
  };
  matrix::run_matrix(&ctx, &env).await
  // `workspace` drops here on success and on error alike.
}

/// `vcvarsall.bat` architecture argument for a target.
fn vcvars_arch(arch: Arch) -> &'static str {
  match arch {
    Arch::X86_64 => "x64",
    // Cross-compile from an x64 host toolchain to ARM64.
    Arch::Aarch64 => "x64_arm64",
  }
}

/// Capture the environment map produced by MSVC toolchain activation.
async fn activate_msvc(target: &Target) -> Result<BTreeMap<String, String>> {
  let vcvarsall = locate_vcvarsall().await?;
  info!(script = %vcvarsall.display(), arch = vcvars_arch(target.arch), "activating MSVC toolchain");

  // `call vcvarsall.bat <arch> && set` prints the activated environment;
  // parsing it beats trying to re-implement the script's logic.
  let command = format!(
    "call \"{}\" {} >nul && set",
    vcvarsall.display(),
    vcvars_arch(target.arch)
  );
  let args = vec!["/C".to_string(), command];
  let output = exec::run_captured("cmd.exe", &args, &BTreeMap::new())
    .await
    .map_err(|e| ReleaseError::Toolchain(format!("vcvarsall failed: {e}")))?;

  let env = parse_env_block(&String::from_utf8_lossy(&output.stdout));
  if !env.contains_key("VCToolsVersion") {
    return Err(ReleaseError::Toolchain(
      "vcvarsall produced no VC environment".to_string(),
    ));
  }
  debug!(vars = env.len(), "captured activated environment");
  Ok(env)
}

/// Find `vcvarsall.bat` through `vswhere`.
async fn locate_vcvarsall() -> Result<PathBuf> {
  let program_files =
    std::env::var("ProgramFiles(x86)").unwrap_or_else(|_| r"C:\Program Files (x86)".to_string());
  let vswhere = PathBuf::from(program_files)
    .join("Microsoft Visual Studio")
    .join("Installer")
    .join("vswhere.exe");

  let args = vec![
    "-latest".to_string(),
    "-products".to_string(),
    "*".to_string(),
    "-requires".to_string(),
    "Microsoft.VisualStudio.Component.VC.Tools.x86.x64".to_string(),
    "-property".to_string(),
    "installationPath".to_string(),
  ];
  let output = exec::run_captured(&vswhere.display().to_string(), &args, &BTreeMap::new())
    .await
    .map_err(|e| ReleaseError::Toolchain(format!("vswhere failed: {e}")))?;

  let install = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if install.is_empty() {
    return Err(ReleaseError::Toolchain(
      "no Visual Studio installation with C++ tools found".to_string(),
    ));
  }

  Ok(PathBuf::from(install).join(r"VC\Auxiliary\Build\vcvarsall.bat"))
}

/// Parse `set`-style `KEY=VALUE` lines into an environment map.
fn parse_env_block(text: &str) -> BTreeMap<String, String> {
  text
    .lines()
    .filter_map(|line| {
      let (key, value) = line.split_once('=')?;
      if key.is_empty() {
        return None;
      }
      Some((key.trim().to_string(), value.trim_end_matches('\r').to_string()))
    })
    .collect()
}
