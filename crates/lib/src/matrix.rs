//! Strategy-agnostic build-matrix executor.
//!
//! Both execution strategies converge here with the same four inputs:
//! target, source dir, workspace dir, output dir. Variants build strictly
//! sequentially and fail fast; a partially-built matrix is never
//! published.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use relforge_platform::Target;
use tracing::info;
use walkdir::WalkDir;

use crate::collect;
use crate::error::{ReleaseError, Result};
use crate::exec;
use crate::variant::{self, Variant};

/// The four standardized inputs every matrix run receives, regardless of
/// which strategy is hosting it.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub target: Target,
  pub source_dir: PathBuf,
  pub workspace_dir: PathBuf,
  pub out_dir: PathBuf,
}

/// Run the full matrix plus the shared collection pass.
///
/// `env` is the overlay applied to every external tool invocation; the
/// native strategy supplies the activated toolchain environment here.
pub async fn run_matrix(ctx: &BuildContext, env: &BTreeMap<String, String>) -> Result<()> {
  let variants = variant::variants_for(&ctx.target);
  info!(target = %ctx.target, variants = variants.len(), "starting build matrix");

  for variant in &variants {
    build_variant(ctx, env, variant).await?;
  }

  collect::copy_headers(&ctx.source_dir, &ctx.out_dir)?;
  collect::collect_licenses(&ctx.source_dir, &ctx.out_dir)?;
  collect::write_toolchain_stamps(&ctx.target, &ctx.out_dir, env).await?;
  Ok(())
}

/// Build one variant and place its artifact under `lib/<variant>/`.
///
/// Independently invocable and idempotent: the per-variant build tree is
/// recreated from scratch on every call.
pub async fn build_variant(
  ctx: &BuildContext,
  env: &BTreeMap<String, String>,
  variant: &Variant,
) -> Result<()> {
  let name = variant.name();
  let build_dir = ctx.workspace_dir.join(&name);
  if build_dir.exists() {
    std::fs::remove_dir_all(&build_dir)?;
  }
  std::fs::create_dir_all(&build_dir)?;

  info!(variant = %name, "configuring");
  let mut configure_args = vec![
    "-S".to_string(),
    ctx.source_dir.display().to_string(),
    "-B".to_string(),
    build_dir.display().to_string(),
    "-G".to_string(),
    variant::generator(&ctx.target).to_string(),
  ];
  configure_args.extend(variant.configure_args(&ctx.target));
  exec::run_checked("cmake", &configure_args, None, env).await?;

  info!(variant = %name, jobs = cpu_count(), "building");
  let build_args = vec![
    "--build".to_string(),
    build_dir.display().to_string(),
    "--parallel".to_string(),
    cpu_count().to_string(),
  ];
  exec::run_checked("cmake", &build_args, None, env).await?;

  let artifact = variant::artifact_file_name(&ctx.target, variant.linkage);
  let produced = locate_artifact(&build_dir, artifact)?;
  let dest = ctx.out_dir.join("lib").join(&name).join(artifact);
  info!(variant = %name, artifact, "collecting artifact");
  collect::copy_file_0644(&produced, &dest)?;
  Ok(())
}

/// Find the built library under the variant's build tree.
///
/// Makefile generators emit at the build-tree root; a recursive search
/// covers generators that nest per-target output directories.
fn locate_artifact(build_dir: &Path, file_name: &str) -> Result<PathBuf> {
  let direct = build_dir.join(file_name);
  if direct.is_file() {
    return Ok(direct);
  }

  for entry in WalkDir::new(build_dir).sort_by_file_name().into_iter().flatten() {
    if entry.file_type().is_file() && entry.file_name() == file_name {
      return Ok(entry.into_path());
    }
  }
  Err(ReleaseError::ArtifactMissing(direct))
}

fn cpu_count() -> usize {
  std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn locate_artifact_prefers_build_root() {
    let build = TempDir::new().unwrap();
    std::fs::write(build.path().join("liblibmem.a"), "archive").unwrap();

    let found = locate_artifact(build.path(), "liblibmem.a").unwrap();
    assert_eq!(found, build.path().join("liblibmem.a"));
  }

  #[test]
  fn locate_artifact_searches_nested_directories() {
    let build = TempDir::new().unwrap();
    let nested = build.path().join("Release");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(nested.join("libmem.dll"), "pe").unwrap();

    let found = locate_artifact(build.path(), "libmem.dll").unwrap();
    assert_eq!(found, nested.join("libmem.dll"));
  }

  #[test]
  fn locate_artifact_missing_is_an_error() {
    let build = TempDir::new().unwrap();
    let err = locate_artifact(build.path(), "liblibmem.so").unwrap_err();
    assert!(matches!(err, ReleaseError::ArtifactMissing(_)));
  }

  #[test]
  fn cpu_count_is_positive() {
    assert!(cpu_count() >= 1);
  }
}
