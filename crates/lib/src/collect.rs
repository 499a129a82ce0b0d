//! Shared (non-variant) artifact collection.
//!
//! Runs once after the matrix: mirrors the header tree, gathers license
//! texts for the project and its bundled third-party components, and
//! records toolchain version stamps for the platform family.

use std::collections::BTreeMap;
use std::path::Path;

use relforge_platform::{Abi, Target};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::Result;
use crate::probe;

/// Bundled components whose license files ship in the release, as
/// (component name, root directory relative to the source tree).
pub const LICENSE_COMPONENTS: &[(&str, &str)] = &[
  ("libmem", "."),
  ("capstone", "external/capstone"),
  ("keystone", "external/keystone"),
  ("llvm", "external/llvm"),
];

/// File-name prefixes that identify a license document.
const LICENSE_PREFIXES: &[&str] = &["license", "copying", "exception"];

/// Copy a file and normalize its permissions to `0644`.
pub(crate) fn copy_file_0644(src: &Path, dst: &Path) -> Result<()> {
  if let Some(parent) = dst.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::copy(src, dst)?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dst, std::fs::Permissions::from_mode(0o644))?;
  }
  #[cfg(not(unix))]
  {
    let mut perms = std::fs::metadata(dst)?.permissions();
    perms.set_readonly(false);
    std::fs::set_permissions(dst, perms)?;
  }
  Ok(())
}

/// Mirror `<source>/include` verbatim into `<out>/include`.
pub fn copy_headers(source_dir: &Path, out_dir: &Path) -> Result<()> {
  let src = source_dir.join("include");
  let dst = out_dir.join("include");
  info!(from = %src.display(), to = %dst.display(), "copying header tree");

  for entry in WalkDir::new(&src).sort_by_file_name() {
    let entry = entry.map_err(std::io::Error::from)?;
    let rel = entry
      .path()
      .strip_prefix(&src)
      .expect("walkdir yields paths under its root");
    let target = dst.join(rel);
    if entry.file_type().is_dir() {
      std::fs::create_dir_all(&target)?;
    } else {
      copy_file_0644(entry.path(), &target)?;
    }
  }
  Ok(())
}

/// Collect license documents into `<out>/licenses/`.
///
/// Each component root is scanned non-recursively for files whose name
/// starts (case-insensitively) with `license`, `copying` or `exception`;
/// matches land as `<component>-<stem lowercased>.txt`. A component with
/// no license file is skipped silently, as is a missing component root.
pub fn collect_licenses(source_dir: &Path, out_dir: &Path) -> Result<()> {
  let dst = out_dir.join("licenses");
  std::fs::create_dir_all(&dst)?;

  for (component, rel_root) in LICENSE_COMPONENTS {
    let root = source_dir.join(rel_root);
    let entries = match std::fs::read_dir(&root) {
      Ok(entries) => entries,
      Err(_) => {
        debug!(component, root = %root.display(), "component root absent, skipping");
        continue;
      }
    };

    for entry in entries {
      let entry = entry?;
      if !entry.file_type()?.is_file() {
        continue;
      }
      let file_name = entry.file_name();
      let Some(name) = file_name.to_str() else { continue };
      let lower = name.to_lowercase();
      if !LICENSE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        continue;
      }

      let stem = Path::new(&lower)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(lower.clone());
      let dest = dst.join(format!("{component}-{stem}.txt"));
      debug!(component, file = name, dest = %dest.display(), "collecting license");
      copy_file_0644(&entry.path(), &dest)?;
    }
  }
  Ok(())
}

/// Record toolchain identification for the target's platform family.
///
/// Best-effort by policy: a failed probe still writes the stamp file with
/// a blank value so the output tree shape is stable.
pub async fn write_toolchain_stamps(
  target: &Target,
  out_dir: &Path,
  env: &BTreeMap<String, String>,
) -> Result<()> {
  match target.abi {
    Abi::Gnu => {
      let version = probe::glibc_version().await;
      write_stamp(out_dir, "GLIBC_VERSION.txt", version)?;
    }
    Abi::Musl => {
      let version = probe::musl_version().await;
      write_stamp(out_dir, "MUSL_VERSION.txt", version)?;
    }
    Abi::Msvc => {
      // Sourced from the activated toolchain environment, not a probe.
      let msvc = env.get("VCToolsVersion").cloned();
      let winsdk = env
        .get("WindowsSDKVersion")
        .map(|v| v.trim_end_matches('\\').to_string());
      write_stamp(out_dir, "MSVC_VERSION.txt", msvc)?;
      write_stamp(out_dir, "WINSDK_VERSION.txt", winsdk)?;
    }
  }
  Ok(())
}

fn write_stamp(out_dir: &Path, name: &str, value: Option<String>) -> Result<()> {
  let value = value.unwrap_or_default();
  info!(stamp = name, version = %value, "recording toolchain version");
  std::fs::write(out_dir.join(name), format!("{value}\n"))?;
  Ok(())
}
