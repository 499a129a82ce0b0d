//! Per-invocation release configuration.
//!
//! All knobs are read exactly once, up front, and threaded by reference
//! from then on. There is no ambient/global "current platform" state.

use std::path::{Path, PathBuf};

use relforge_platform::Target;

use crate::consts;
use crate::error::{ReleaseError, Result};

/// Configuration for one release invocation.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
  /// Validated target platform.
  pub target: Target,
  /// Canonicalized libmem source checkout.
  pub source_dir: PathBuf,
  /// Destination of the normalized output tree.
  pub out_dir: PathBuf,
  /// True when the caller supplied `RELFORGE_OUT_DIR` explicitly.
  pub out_dir_explicit: bool,
  /// Skip tarball creation; the output tree is the final artifact.
  pub skip_archive: bool,
}

impl ReleaseConfig {
  /// Build the configuration from the environment.
  ///
  /// Validates the source tree (a `CMakeLists.txt` must exist at its root)
  /// but performs no mutation; the output directory is only checked and
  /// created later by [`prepare_out_dir`](Self::prepare_out_dir).
  pub fn from_env(target: Target, source_dir: &Path) -> Result<Self> {
    let source_dir = dunce::canonicalize(source_dir)?;
    if !source_dir.join("CMakeLists.txt").is_file() {
      return Err(ReleaseError::SourceTreeInvalid(source_dir));
    }

    let (out_dir, out_dir_explicit) = match std::env::var_os(consts::ENV_OUT_DIR) {
      Some(dir) if !dir.is_empty() => (PathBuf::from(dir), true),
      _ => {
        let name = format!(
          "{}-{}-{}",
          consts::PROJECT_NAME,
          consts::RELEASE_LABEL,
          target
        );
        (source_dir.join(consts::DEFAULT_OUT_ROOT).join(name), false)
      }
    };

    let skip_archive = std::env::var(consts::ENV_SKIP_ARCHIVE)
      .map(|v| is_truthy(&v))
      .unwrap_or(false);

    Ok(Self {
      target,
      source_dir,
      out_dir,
      out_dir_explicit,
      skip_archive,
    })
  }

  /// Create the (empty) output directory.
  ///
  /// An explicit destination that already exists is refused outright so a
  /// release run can never clobber caller data. The tool-managed default
  /// destination is wiped and recreated, which is what local re-runs want.
  pub fn prepare_out_dir(&self) -> Result<()> {
    if self.out_dir.exists() {
      if self.out_dir_explicit {
        return Err(ReleaseError::OutputDirExists(self.out_dir.clone()));
      }
      std::fs::remove_dir_all(&self.out_dir)?;
    }
    std::fs::create_dir_all(&self.out_dir)?;
    Ok(())
  }

  /// Path of the archive produced beside the output tree.
  pub fn archive_path(&self) -> PathBuf {
    let name = self
      .out_dir
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| consts::PROJECT_NAME.to_string());
    match self.out_dir.parent() {
      Some(parent) => parent.join(format!("{name}.tar.gz")),
      None => PathBuf::from(format!("{name}.tar.gz")),
    }
  }
}

fn is_truthy(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
