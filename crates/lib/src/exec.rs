//! Checked external-tool invocation.
//!
//! Every external process (CMake, Docker, toolchain activation) goes
//! through here so the fail-fast policy lives in one place: a non-zero
//! exit aborts the run, nothing is retried.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ReleaseError, Result};

/// Run a command with inherited stdio, failing on non-zero exit.
///
/// `env` is an overlay on the inherited environment; the native strategy
/// passes the activated toolchain map through it, the container strategy
/// passes nothing.
pub async fn run_checked(
  program: &str,
  args: &[String],
  cwd: Option<&Path>,
  env: &BTreeMap<String, String>,
) -> Result<()> {
  info!(cmd = %render(program, args), "running");

  let mut command = Command::new(program);
  command.args(args).envs(env).kill_on_drop(true);
  if let Some(dir) = cwd {
    command.current_dir(dir);
  }

  let status = command.status().await.map_err(|e| spawn_error(program, e))?;

  if !status.success() {
    return Err(ReleaseError::CmdFailed {
      cmd: render(program, args),
      code: status.code(),
    });
  }
  Ok(())
}

/// Run a command with captured output, failing on non-zero exit.
///
/// Returns the raw output so callers can parse stdout (e.g. `vswhere`,
/// `vcvarsall && set`). Stderr is logged at debug level on failure.
pub async fn run_captured(
  program: &str,
  args: &[String],
  env: &BTreeMap<String, String>,
) -> Result<Output> {
  debug!(cmd = %render(program, args), "running (captured)");

  let output = Command::new(program)
    .args(args)
    .envs(env)
    .kill_on_drop(true)
    .output()
    .await
    .map_err(|e| spawn_error(program, e))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    return Err(ReleaseError::CmdFailed {
      cmd: render(program, args),
      code: output.status.code(),
    });
  }
  Ok(output)
}

fn spawn_error(program: &str, err: std::io::Error) -> ReleaseError {
  if err.kind() == std::io::ErrorKind::NotFound {
    ReleaseError::MissingTool {
      program: program.to_string(),
    }
  } else {
    ReleaseError::Io(err)
  }
}

fn render(program: &str, args: &[String]) -> String {
  let mut cmd = program.to_string();
  for arg in args {
    cmd.push(' ');
    if arg.contains(' ') {
      cmd.push('"');
      cmd.push_str(arg);
      cmd.push('"');
    } else {
      cmd.push_str(arg);
    }
  }
  cmd
}
