//! Transient per-invocation build workspace.
//!
//! Holds the per-variant CMake build trees. Owned by exactly one
//! invocation and removed on every exit path: the RAII guard covers
//! normal and error returns, and the CLI's signal handling drops the
//! in-flight future (and therefore this guard) on interruption.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;

/// Scratch directory for intermediate build trees.
#[derive(Debug)]
pub enum TransientWorkspace {
  /// Host-native runs: a tempdir under the system temp root.
  Temp(TempDir),
  /// Container runs: a fixed path on the container's own filesystem.
  Fixed(PathBuf),
}

impl TransientWorkspace {
  /// Create a fresh workspace under the system temp directory.
  pub fn create_temp() -> Result<Self> {
    let temp = TempDir::with_prefix("relforge-")?;
    debug!(path = %temp.path().display(), "created transient workspace");
    Ok(TransientWorkspace::Temp(temp))
  }

  /// Create (or reuse empty) a workspace at a fixed path.
  pub fn at(path: &Path) -> Result<Self> {
    std::fs::create_dir_all(path)?;
    debug!(path = %path.display(), "created transient workspace");
    Ok(TransientWorkspace::Fixed(path.to_path_buf()))
  }

  pub fn path(&self) -> &Path {
    match self {
      TransientWorkspace::Temp(temp) => temp.path(),
      TransientWorkspace::Fixed(path) => path,
    }
  }
}

impl Drop for TransientWorkspace {
  fn drop(&mut self) {
    // TempDir cleans itself up; fixed paths are removed here.
    if let TransientWorkspace::Fixed(path) = self {
      let _ = std::fs::remove_dir_all(&path);
    }
  }
}
