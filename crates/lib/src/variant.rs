//! Build variants and the per-target build matrix.
//!
//! The variant set is derived once from the target platform and drives
//! everything downstream: CMake flags, artifact names, and the
//! `lib/<variant>/` layout of the output tree.

use relforge_platform::{Arch, Target};

/// Build profile of a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
  Release,
  Debug,
}

impl Profile {
  /// Value passed to `CMAKE_BUILD_TYPE`.
  pub const fn as_str(&self) -> &'static str {
    match self {
      Profile::Release => "Release",
      Profile::Debug => "Debug",
    }
  }
}

/// Library linkage of a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
  Static,
  Shared,
}

impl Linkage {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Linkage::Static => "static",
      Linkage::Shared => "shared",
    }
  }
}

/// MSVC C runtime linkage flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsvcRuntime {
  /// Dynamically linked CRT (`/MD`).
  Md,
  /// Statically linked CRT (`/MT`).
  Mt,
}

impl MsvcRuntime {
  /// Short code used in variant names (`MD` / `MT`).
  pub const fn code(&self) -> &'static str {
    match self {
      MsvcRuntime::Md => "MD",
      MsvcRuntime::Mt => "MT",
    }
  }

  /// Value passed to `CMAKE_MSVC_RUNTIME_LIBRARY` for the given profile.
  pub const fn cmake_value(&self, profile: Profile) -> &'static str {
    match (self, profile) {
      (MsvcRuntime::Md, Profile::Release) => "MultiThreadedDLL",
      (MsvcRuntime::Md, Profile::Debug) => "MultiThreadedDebugDLL",
      (MsvcRuntime::Mt, Profile::Release) => "MultiThreaded",
      (MsvcRuntime::Mt, Profile::Debug) => "MultiThreadedDebug",
    }
  }
}

/// One concrete build configuration within the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variant {
  pub profile: Profile,
  pub linkage: Linkage,
  /// CRT flavor; `Some` only on MSVC targets.
  pub msvc_runtime: Option<MsvcRuntime>,
}

impl Variant {
  /// Directory name of this variant under `lib/` in the output tree.
  ///
  /// Non-MSVC variants are named by linkage alone (`static`, `shared`).
  /// MSVC variants append the runtime code plus the conventional `d`
  /// suffix for Debug, e.g. `static-MTd`.
  pub fn name(&self) -> String {
    match self.msvc_runtime {
      None => self.linkage.as_str().to_string(),
      Some(runtime) => {
        let debug = match self.profile {
          Profile::Debug => "d",
          Profile::Release => "",
        };
        format!("{}-{}{}", self.linkage.as_str(), runtime.code(), debug)
      }
    }
  }

  /// CMake configure-step arguments for this variant on the given target.
  ///
  /// Test suites of the underlying library are always disabled; release
  /// archives never ship test binaries.
  pub fn configure_args(&self, target: &Target) -> Vec<String> {
    let mut args = vec![
      format!("-DCMAKE_BUILD_TYPE={}", self.profile.as_str()),
      format!(
        "-DLIBMEM_BUILD_STATIC={}",
        match self.linkage {
          Linkage::Static => "ON",
          Linkage::Shared => "OFF",
        }
      ),
      "-DLIBMEM_BUILD_TESTS=OFF".to_string(),
    ];

    if let Some(runtime) = self.msvc_runtime {
      args.push(format!(
        "-DCMAKE_MSVC_RUNTIME_LIBRARY={}",
        runtime.cmake_value(self.profile)
      ));
    } else {
      // On MSVC the architecture is selected by toolchain activation, so
      // the optimization flag string only applies to makefile targets.
      let opt = arch_opt_flags(target.arch);
      args.push(format!("-DCMAKE_C_FLAGS={opt}"));
      args.push(format!("-DCMAKE_CXX_FLAGS={opt}"));
    }

    args
  }
}

/// CMake generator for the target's OS family.
pub fn generator(target: &Target) -> &'static str {
  if target.is_msvc() {
    "NMake Makefiles"
  } else {
    "Unix Makefiles"
  }
}

/// Architecture-specific optimization flags for makefile targets.
pub fn arch_opt_flags(arch: Arch) -> &'static str {
  match arch {
    Arch::X86_64 => "-O2 -march=x86-64",
    Arch::Aarch64 => "-O2 -march=armv8-a",
  }
}

/// File name of the library artifact a variant's build produces.
pub fn artifact_file_name(target: &Target, linkage: Linkage) -> &'static str {
  match (target.is_msvc(), linkage) {
    (true, Linkage::Shared) => "libmem.dll",
    (true, Linkage::Static) => "libmem.lib",
    (false, Linkage::Shared) => "liblibmem.so",
    (false, Linkage::Static) => "liblibmem.a",
  }
}

/// The full build matrix for a target, in build order.
///
/// MSVC targets expand to six variants: {Debug,Release} over `shared-MD`,
/// `static-MD` and `static-MT` (a shared library with a static CRT is
/// deliberately not built). Every other target builds `static` and
/// `shared`, Release only.
pub fn variants_for(target: &Target) -> Vec<Variant> {
  if target.is_msvc() {
    let pairs = [
      (Linkage::Shared, MsvcRuntime::Md),
      (Linkage::Static, MsvcRuntime::Md),
      (Linkage::Static, MsvcRuntime::Mt),
    ];
    let mut variants = Vec::with_capacity(6);
    for (linkage, runtime) in pairs {
      for profile in [Profile::Release, Profile::Debug] {
        variants.push(Variant {
          profile,
          linkage,
          msvc_runtime: Some(runtime),
        });
      }
    }
    variants
  } else {
    [Linkage::Static, Linkage::Shared]
      .into_iter()
      .map(|linkage| Variant {
        profile: Profile::Release,
        linkage,
        msvc_runtime: None,
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn msvc_matrix_has_six_variants_covering_all_axes() {
    let target = Target::parse("windows-msvc-x86_64").unwrap();
    let variants = variants_for(&target);
    assert_eq!(variants.len(), 6);

    let profiles: HashSet<_> = variants.iter().map(|v| v.profile).collect();
    let linkages: HashSet<_> = variants.iter().map(|v| v.linkage).collect();
    let runtimes: HashSet<_> = variants.iter().filter_map(|v| v.msvc_runtime).collect();
    assert_eq!(profiles.len(), 2);
    assert_eq!(linkages.len(), 2);
    assert_eq!(runtimes.len(), 2);

    let names: HashSet<_> = variants.iter().map(|v| v.name()).collect();
    let expected: HashSet<_> = ["shared-MD", "shared-MDd", "static-MD", "static-MDd", "static-MT", "static-MTd"]
      .into_iter()
      .map(String::from)
      .collect();
    assert_eq!(names, expected);
  }

  #[test]
  fn non_msvc_matrix_is_release_static_and_shared() {
    for id in ["linux-gnu-x86_64", "linux-musl-aarch64"] {
      let target = Target::parse(id).unwrap();
      let variants = variants_for(&target);
      assert_eq!(variants.len(), 2);
      assert!(variants.iter().all(|v| v.profile == Profile::Release));
      assert!(variants.iter().all(|v| v.msvc_runtime.is_none()));
      let names: Vec<_> = variants.iter().map(|v| v.name()).collect();
      assert_eq!(names, ["static", "shared"]);
    }
  }

  #[test]
  fn artifact_names_follow_platform_and_linkage() {
    let linux = Target::parse("linux-gnu-x86_64").unwrap();
    let windows = Target::parse("windows-msvc-x86_64").unwrap();
    assert_eq!(artifact_file_name(&linux, Linkage::Shared), "liblibmem.so");
    assert_eq!(artifact_file_name(&linux, Linkage::Static), "liblibmem.a");
    assert_eq!(artifact_file_name(&windows, Linkage::Shared), "libmem.dll");
    assert_eq!(artifact_file_name(&windows, Linkage::Static), "libmem.lib");
  }

  #[test]
  fn generator_depends_on_os_family() {
    let linux = Target::parse("linux-musl-x86_64").unwrap();
    let windows = Target::parse("windows-msvc-aarch64").unwrap();
    assert_eq!(generator(&linux), "Unix Makefiles");
    assert_eq!(generator(&windows), "NMake Makefiles");
  }

  #[test]
  fn configure_args_disable_tests_everywhere() {
    for id in ["linux-gnu-aarch64", "windows-msvc-x86_64"] {
      let target = Target::parse(id).unwrap();
      for variant in variants_for(&target) {
        let args = variant.configure_args(&target);
        assert!(args.iter().any(|a| a == "-DLIBMEM_BUILD_TESTS=OFF"));
      }
    }
  }

  #[test]
  fn configure_args_use_arch_specific_opt_flags() {
    let x86 = Target::parse("linux-gnu-x86_64").unwrap();
    let arm = Target::parse("linux-gnu-aarch64").unwrap();
    let variant = variants_for(&x86)[0];

    let x86_args = variant.configure_args(&x86);
    assert!(x86_args.iter().any(|a| a == "-DCMAKE_C_FLAGS=-O2 -march=x86-64"));

    let arm_args = variant.configure_args(&arm);
    assert!(arm_args.iter().any(|a| a == "-DCMAKE_C_FLAGS=-O2 -march=armv8-a"));
  }

  #[test]
  fn msvc_runtime_flag_matches_profile() {
    let target = Target::parse("windows-msvc-x86_64").unwrap();
    let variant = Variant {
      profile: Profile::Debug,
      linkage: Linkage::Static,
      msvc_runtime: Some(MsvcRuntime::Mt),
    };
    let args = variant.configure_args(&target);
    assert!(args.iter().any(|a| a == "-DCMAKE_MSVC_RUNTIME_LIBRARY=MultiThreadedDebug"));
    // No makefile-style flag injection on MSVC.
    assert!(!args.iter().any(|a| a.starts_with("-DCMAKE_C_FLAGS")));
  }
}
