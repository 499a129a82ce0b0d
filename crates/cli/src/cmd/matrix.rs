//! Implementation of the hidden `relforge matrix` subcommand.
//!
//! This is the containerized strategy's re-entry point: the orchestrator
//! bind-mounts itself into the build image and invokes this subcommand
//! against the standardized inputs, so exactly one implementation of the
//! matrix logic exists. It doubles as the test seam for exercising the
//! matrix without Docker or a real toolchain.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use relforge_lib::matrix::{self, BuildContext};
use relforge_lib::workspace::TransientWorkspace;
use relforge_platform::Target;

/// Standardized inputs of one matrix run.
#[derive(Args)]
pub struct MatrixArgs {
  /// Target platform identifier.
  #[arg(long)]
  pub target: String,

  /// Source tree root.
  #[arg(long)]
  pub source: PathBuf,

  /// Transient workspace for per-variant build trees.
  #[arg(long)]
  pub workspace: PathBuf,

  /// Output tree destination.
  #[arg(long)]
  pub out: PathBuf,
}

pub async fn cmd_matrix(args: MatrixArgs) -> Result<()> {
  let target = Target::parse(&args.target)?;
  let workspace = TransientWorkspace::at(&args.workspace)?;

  let ctx = BuildContext {
    target,
    source_dir: args.source,
    workspace_dir: workspace.path().to_path_buf(),
    out_dir: args.out,
  };
  // Tool invocations inherit the surrounding environment (the container's,
  // or the activated shell's); no overlay is applied here.
  matrix::run_matrix(&ctx, &BTreeMap::new()).await?;
  Ok(())
}
