//! relforge: release-build orchestrator for libmem.
//!
//! One invocation builds the full variant matrix for a target platform,
//! collects the artifacts into a normalized output tree, and packs a
//! reproducible tarball. Exit codes: 0 on success, 1 on usage errors and
//! build failures, 130 when interrupted.

mod cmd;
mod output;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Release-build orchestrator for libmem
#[derive(Parser)]
#[command(name = "relforge", version, about)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
  /// Target platform identifier, e.g. linux-musl-x86_64
  #[arg(value_name = "PLATFORM", required = true)]
  platform: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Run the build matrix against explicit inputs.
  ///
  /// Internal re-entry point used when the matrix runs inside a build
  /// container; hidden from help output.
  #[command(hide = true)]
  Matrix(cmd::MatrixArgs),
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      // Usage errors exit 1 per the release-pipeline contract; help and
      // version requests are not errors.
      let usage_ok = matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
      let _ = err.print();
      std::process::exit(if usage_ok { 0 } else { 1 });
    }
  };

  let runtime = match tokio::runtime::Runtime::new() {
    Ok(runtime) => runtime,
    Err(err) => {
      output::print_error(&format!("failed to start async runtime: {err}"));
      std::process::exit(1);
    }
  };

  let code = runtime.block_on(async {
    tokio::select! {
      result = dispatch(cli) => match result {
        Ok(()) => 0,
        Err(err) => {
          output::print_error(&format!("{err:#}"));
          1
        }
      },
      _ = shutdown_signal() => {
        // Dropping the in-flight future kills spawned tools
        // (kill_on_drop) and removes the transient workspace.
        output::print_warning("interrupted, cleaning up");
        130
      }
    }
  });
  std::process::exit(code);
}

async fn dispatch(cli: Cli) -> Result<()> {
  match cli.command {
    Some(Command::Matrix(args)) => cmd::cmd_matrix(args).await,
    None => {
      let platform = cli.platform.expect("clap enforces the positional argument");
      cmd::cmd_release(&platform).await
    }
  }
}

async fn shutdown_signal() {
  #[cfg(unix)]
  {
    use tokio::signal::unix::{SignalKind, signal};
    let mut term = match signal(SignalKind::terminate()) {
      Ok(term) => term,
      Err(_) => {
        let _ = tokio::signal::ctrl_c().await;
        return;
      }
    };
    tokio::select! {
      _ = tokio::signal::ctrl_c() => {}
      _ = term.recv() => {}
    }
  }
  #[cfg(not(unix))]
  {
    let _ = tokio::signal::ctrl_c().await;
  }
}
