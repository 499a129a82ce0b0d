//! Tolerant toolchain-version probes.
//!
//! Toolchain stamps are informational, so a probe never fails the run: a
//! command that exits non-zero, prints only to stderr, or cannot be
//! spawned at all yields `None` and the stamp file is written blank. This
//! policy is deliberate and lives here under its own name rather than
//! hiding inside a catch-all.

use tokio::process::Command;
use tracing::debug;

/// Run a command and return its trimmed output, tolerating failure.
///
/// Non-zero exit codes are accepted (the musl loader prints its version
/// banner to stderr and exits 1). Stdout is preferred; stderr is the
/// fallback. `None` means the program could not be spawned or produced no
/// text at all.
pub async fn probe(program: &str, args: &[&str]) -> Option<String> {
  let output = match Command::new(program).args(args).kill_on_drop(true).output().await {
    Ok(output) => output,
    Err(e) => {
      debug!(program, error = %e, "version probe could not run");
      return None;
    }
  };

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if !stdout.is_empty() {
    return Some(stdout);
  }
  let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
  if !stderr.is_empty() {
    return Some(stderr);
  }
  None
}

/// glibc version, e.g. `2.36`, from `ldd --version`.
///
/// First line looks like `ldd (Debian GLIBC 2.36-9+deb12u4) 2.36`; the
/// version is the last whitespace-separated token.
pub async fn glibc_version() -> Option<String> {
  let text = probe("ldd", &["--version"]).await?;
  let first = text.lines().next()?;
  first.split_whitespace().last().map(str::to_string)
}

/// musl version, e.g. `1.2.4`, from the loader's banner.
///
/// musl's `ldd` run without arguments prints usage plus a line like
/// `Version 1.2.4` to stderr and exits non-zero; the probe tolerates both.
pub async fn musl_version() -> Option<String> {
  let text = probe("ldd", &[]).await?;
  let line = text.lines().find(|l| l.trim_start().starts_with("Version"))?;
  line.split_whitespace().last().map(str::to_string)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn probe_missing_program_is_none() {
    assert_eq!(probe("relforge-no-such-probe", &[]).await, None);
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn probe_tolerates_nonzero_exit() {
    let out = probe("/bin/sh", &["-c", "echo v9.9; exit 3"]).await;
    assert_eq!(out.as_deref(), Some("v9.9"));
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn probe_falls_back_to_stderr() {
    let out = probe("/bin/sh", &["-c", "echo banner 1>&2; exit 1"]).await;
    assert_eq!(out.as_deref(), Some("banner"));
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn probe_silent_command_is_none() {
    assert_eq!(probe("/bin/sh", &["-c", "exit 0"]).await, None);
  }
}
