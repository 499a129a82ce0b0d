//! relforge-lib: Core logic for the libmem release-build orchestrator
//!
//! This crate provides the building blocks the `relforge` binary wires
//! together:
//! - `variant`: the build matrix derived from a target platform
//! - `environment`: containerized vs. host-native execution strategies
//! - `matrix`: the strategy-agnostic per-variant build executor
//! - `collect`: header/license/toolchain-stamp collection
//! - `archive`: reproducible tarball packing of the output tree

pub mod archive;
pub mod collect;
pub mod config;
pub mod consts;
pub mod environment;
pub mod error;
pub mod exec;
pub mod matrix;
pub mod probe;
pub mod variant;
pub mod workspace;

pub use config::ReleaseConfig;
pub use error::{ReleaseError, Result};
pub use matrix::BuildContext;
