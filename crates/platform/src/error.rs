//! Error types for relforge-platform

use thiserror::Error;

/// Errors that can occur while resolving a target platform
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
  /// The identifier is not in the supported-target allow-list.
  #[error("unsupported platform: {0}")]
  Unsupported(String),
}
