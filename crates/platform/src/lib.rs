//! Target platform model for the relforge release builder.
//!
//! This crate provides the platform identifier handled by every other part
//! of the tool:
//! - OS / ABI / CPU architecture enums
//! - The fixed allow-list of supported release targets
//! - Exact-match parsing of `{os}-{abi}-{arch}` identifier strings

mod error;
mod target;

pub use error::PlatformError;
pub use target::{Abi, Arch, Os, Target};
