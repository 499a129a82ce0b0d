//! Project-wide constants.

/// Name of the library being released.
pub const PROJECT_NAME: &str = "libmem";

/// Label baked into default output-directory names. CI renames the
/// destination via `RELFORGE_OUT_DIR` instead of changing this.
pub const RELEASE_LABEL: &str = "local";

/// Environment variable overriding the output directory path.
pub const ENV_OUT_DIR: &str = "RELFORGE_OUT_DIR";

/// Environment variable that skips archive creation when set truthy.
pub const ENV_SKIP_ARCHIVE: &str = "RELFORGE_SKIP_ARCHIVE";

/// Default output root, relative to the source checkout.
pub const DEFAULT_OUT_ROOT: &str = "build/out";

/// Repository prefix for build-environment container images.
pub const IMAGE_PREFIX: &str = "libmem-build-env";

/// Mount point of the source tree inside a build container (read-only).
pub const CONTAINER_SRC: &str = "/src";

/// Mount point of the output directory inside a build container (read-write).
pub const CONTAINER_OUT: &str = "/out";

/// Transient workspace path inside a build container. Lives on the
/// container's own filesystem, never bind-mounted.
pub const CONTAINER_WORKSPACE: &str = "/tmp/relforge-build";

/// Mount point of the orchestrator binary inside a build container.
pub const CONTAINER_BIN: &str = "/usr/local/bin/relforge";

/// Numeric owner forced onto every archive entry for reproducibility.
pub const ARCHIVE_UID: u64 = 0;
pub const ARCHIVE_GID: u64 = 0;
