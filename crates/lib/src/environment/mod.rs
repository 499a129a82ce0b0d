//! Execution strategies for the build matrix.
//!
//! Strategy selection decides *where* the matrix runs, never *what* it
//! does: Linux targets build inside an isolated container, everything
//! else runs against an activated host toolchain. Both paths feed the
//! same `BuildContext` into `matrix::run_matrix`.

mod container;
mod native;

use relforge_platform::Target;

use crate::config::ReleaseConfig;
use crate::error::Result;

pub use container::image_tag;

/// How the matrix is executed for a given target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  /// Inside a per-family build container (all Linux targets).
  Container,
  /// Directly on the host with an activated toolchain (Windows targets).
  Native,
}

impl Strategy {
  /// Deterministic strategy choice for a target.
  pub fn select(target: &Target) -> Strategy {
    if target.is_linux() {
      Strategy::Container
    } else {
      Strategy::Native
    }
  }
}

/// Provision the selected environment and run the matrix in it.
///
/// On return the output tree is fully populated; archiving is the
/// caller's business.
pub async fn run_release(config: &ReleaseConfig) -> Result<()> {
  match Strategy::select(&config.target) {
    Strategy::Container => container::run(config).await,
    Strategy::Native => native::run(config).await,
  }
}
