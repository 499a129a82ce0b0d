//! Error types for release orchestration.
//!
//! Policy: usage errors and external-tool failures abort the run
//! immediately; only toolchain-version probes (`probe` module) are allowed
//! to degrade silently, and they do so by returning `Option`, never by
//! swallowing a `ReleaseError`.

use std::path::PathBuf;

use thiserror::Error;

use relforge_platform::PlatformError;

/// Errors that can occur while orchestrating a release build.
#[derive(Debug, Error)]
pub enum ReleaseError {
  /// The requested platform is not in the supported allow-list.
  #[error(transparent)]
  Platform(#[from] PlatformError),

  /// The invocation directory is not a libmem source checkout.
  #[error("not a libmem source tree (no CMakeLists.txt): {0}")]
  SourceTreeInvalid(PathBuf),

  /// A caller-specified output directory already exists.
  #[error("output directory already exists, refusing to overwrite: {0}")]
  OutputDirExists(PathBuf),

  /// A required external tool could not be spawned.
  #[error("required tool not found on PATH: {program}")]
  MissingTool { program: String },

  /// An external tool exited non-zero.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// The build finished but the expected library artifact is missing.
  #[error("built artifact not found: {0}")]
  ArtifactMissing(PathBuf),

  /// Host toolchain activation failed (MSVC targets).
  #[error("toolchain activation failed: {0}")]
  Toolchain(String),

  /// Filesystem operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReleaseError>;
