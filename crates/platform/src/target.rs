//! Target platform identifiers and the supported-release allow-list.

use std::fmt;

use crate::PlatformError;

/// Operating system of a release target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  Windows,
}

impl Os {
  /// Returns the OS name as used in platform identifier strings
  pub const fn as_str(&self) -> &'static str {
    match self {
      Os::Linux => "linux",
      Os::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// ABI / libc family of a release target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abi {
  Gnu,
  Musl,
  Msvc,
}

impl Abi {
  /// Returns the ABI name as used in platform identifier strings
  pub const fn as_str(&self) -> &'static str {
    match self {
      Abi::Gnu => "gnu",
      Abi::Musl => "musl",
      Abi::Msvc => "msvc",
    }
  }
}

impl fmt::Display for Abi {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// CPU architecture of a release target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  /// Returns the architecture name as used in platform identifier strings
  pub const fn as_str(&self) -> &'static str {
    match self {
      Arch::X86_64 => "x86_64",
      Arch::Aarch64 => "aarch64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A release target identifier (e.g. `linux-musl-x86_64`).
///
/// Targets are only ever constructed from the fixed allow-list below, so a
/// `Target` value in hand is always one the release pipeline knows how to
/// build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
  pub os: Os,
  pub abi: Abi,
  pub arch: Arch,
}

/// Every target the release pipeline supports.
const SUPPORTED: &[Target] = &[
  Target::new(Os::Linux, Abi::Gnu, Arch::X86_64),
  Target::new(Os::Linux, Abi::Gnu, Arch::Aarch64),
  Target::new(Os::Linux, Abi::Musl, Arch::X86_64),
  Target::new(Os::Linux, Abi::Musl, Arch::Aarch64),
  Target::new(Os::Windows, Abi::Msvc, Arch::X86_64),
  Target::new(Os::Windows, Abi::Msvc, Arch::Aarch64),
];

impl Target {
  /// Create a target identifier
  pub const fn new(os: Os, abi: Abi, arch: Arch) -> Self {
    Self { os, abi, arch }
  }

  /// All supported release targets, in allow-list order.
  pub fn supported() -> &'static [Target] {
    SUPPORTED
  }

  /// Resolve a free-form identifier string against the allow-list.
  ///
  /// Matching is exact: the input must equal the canonical
  /// `{os}-{abi}-{arch}` rendering of a supported target. Anything else is
  /// rejected, so this runs before any side effect is taken on behalf of
  /// the identifier.
  pub fn parse(s: &str) -> Result<Target, PlatformError> {
    SUPPORTED
      .iter()
      .find(|t| t.to_string() == s)
      .copied()
      .ok_or_else(|| PlatformError::Unsupported(s.to_string()))
  }

  /// Returns true for targets built inside a container (all Linux targets).
  pub fn is_linux(&self) -> bool {
    self.os == Os::Linux
  }

  /// Returns true for targets built with the MSVC toolchain.
  pub fn is_msvc(&self) -> bool {
    self.abi == Abi::Msvc
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}-{}", self.os, self.abi, self.arch)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_accepts_every_supported_target() {
    for target in Target::supported() {
      let parsed = Target::parse(&target.to_string()).unwrap();
      assert_eq!(parsed, *target);
    }
  }

  #[test]
  fn parse_rejects_unknown_identifiers() {
    for bad in ["linux-gnu-riscv64", "darwin-gnu-x86_64", "linux-gnu", "", "LINUX-GNU-X86_64"] {
      let err = Target::parse(bad).unwrap_err();
      assert_eq!(err, PlatformError::Unsupported(bad.to_string()));
    }
  }

  #[test]
  fn parse_rejects_reordered_segments() {
    assert!(Target::parse("x86_64-linux-gnu").is_err());
    assert!(Target::parse("gnu-linux-x86_64").is_err());
  }

  #[test]
  fn display_round_trips() {
    let target = Target::new(Os::Linux, Abi::Musl, Arch::X86_64);
    assert_eq!(target.to_string(), "linux-musl-x86_64");
    assert_eq!(Target::parse("linux-musl-x86_64").unwrap(), target);
  }

  #[test]
  fn allow_list_has_six_targets() {
    assert_eq!(Target::supported().len(), 6);
  }

  #[test]
  fn family_predicates() {
    let musl = Target::parse("linux-musl-aarch64").unwrap();
    assert!(musl.is_linux());
    assert!(!musl.is_msvc());

    let msvc = Target::parse("windows-msvc-x86_64").unwrap();
    assert!(!msvc.is_linux());
    assert!(msvc.is_msvc());
  }
}
