//! Implementation of the main release command (`relforge <PLATFORM>`).
//!
//! Validates the platform, prepares the output directory, runs the build
//! matrix through the selected environment strategy, and packs the final
//! archive unless skipped.

use std::time::Instant;

use anyhow::{Context, Result};
use relforge_lib::{ReleaseConfig, archive, environment};
use relforge_platform::Target;
use tracing::info;

use crate::output;

/// Execute a full release build for the given platform identifier.
///
/// Platform validation happens before any filesystem or process action;
/// an unknown identifier exits 1 with usage text and no side effects.
pub async fn cmd_release(platform: &str) -> Result<()> {
  let target = match Target::parse(platform) {
    Ok(target) => target,
    Err(err) => {
      output::print_error(&err.to_string());
      eprintln!();
      eprintln!("Usage: relforge <PLATFORM>");
      eprintln!();
      eprintln!("Supported platforms:");
      for t in Target::supported() {
        eprintln!("  {t}");
      }
      std::process::exit(1);
    }
  };

  let started = Instant::now();
  let source_dir = std::env::current_dir().context("cannot determine current directory")?;
  let config = ReleaseConfig::from_env(target, &source_dir)?;
  config.prepare_out_dir()?;
  info!(
    target = %target,
    out_dir = %config.out_dir.display(),
    skip_archive = config.skip_archive,
    "resolved release configuration"
  );

  output::print_info(&format!("building libmem release for {target}"));
  environment::run_release(&config).await?;

  println!();
  if config.skip_archive {
    output::print_success(&format!(
      "release tree ready in {}",
      output::format_duration(started.elapsed())
    ));
    output::print_stat("output", &config.out_dir.display().to_string());
  } else {
    let archive_path = archive::pack_tree(&config.out_dir)?;
    let size = std::fs::metadata(&archive_path).map(|m| m.len()).unwrap_or(0);
    output::print_success(&format!(
      "release packed in {}",
      output::format_duration(started.elapsed())
    ));
    output::print_stat("output", &config.out_dir.display().to_string());
    output::print_stat("archive", &archive_path.display().to_string());
    output::print_stat("size", &output::format_bytes(size));
  }
  Ok(())
}
