//! Reproducible archiving of the output tree.
//!
//! Entries are appended in sorted order with ownership forced to a fixed
//! numeric `0:0`, so two releases built by different users on different
//! machines produce comparable archives. The tree's contents sit under a
//! single top-level entry equal to the output directory's base name.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::info;
use walkdir::WalkDir;

use crate::consts;
use crate::error::Result;

/// Pack a completed output tree into `<out_dir>.tar.gz` beside it.
///
/// Returns the archive path.
pub fn pack_tree(out_dir: &Path) -> Result<PathBuf> {
  let base = out_dir
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| consts::PROJECT_NAME.to_string());
  let archive_path = match out_dir.parent() {
    Some(parent) => parent.join(format!("{base}.tar.gz")),
    None => PathBuf::from(format!("{base}.tar.gz")),
  };

  info!(archive = %archive_path.display(), "packing output tree");

  let file = File::create(&archive_path)?;
  let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
  let mut builder = tar::Builder::new(encoder);

  for entry in WalkDir::new(out_dir).sort_by_file_name() {
    let entry = entry.map_err(std::io::Error::from)?;
    let rel = entry
      .path()
      .strip_prefix(out_dir)
      .expect("walkdir yields paths under its root");
    if rel.as_os_str().is_empty() {
      continue;
    }
    let entry_path = Path::new(&base).join(rel);
    let metadata = entry.metadata().map_err(std::io::Error::from)?;

    let mut header = tar::Header::new_gnu();
    header.set_metadata(&metadata);
    header.set_uid(consts::ARCHIVE_UID);
    header.set_gid(consts::ARCHIVE_GID);

    if entry.file_type().is_dir() {
      header.set_entry_type(tar::EntryType::Directory);
      header.set_size(0);
      builder.append_data(&mut header, &entry_path, std::io::empty())?;
    } else {
      header.set_size(metadata.len());
      let mut reader = File::open(entry.path())?;
      builder.append_data(&mut header, &entry_path, &mut reader)?;
    }
  }

  let mut writer = builder.into_inner()?.finish()?;
  writer.flush()?;
  Ok(archive_path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use flate2::read::GzDecoder;
  use tempfile::TempDir;

  fn sample_tree(root: &Path) -> PathBuf {
    let out = root.join("libmem-local-linux-gnu-x86_64");
    std::fs::create_dir_all(out.join("lib/static")).unwrap();
    std::fs::create_dir_all(out.join("include")).unwrap();
    std::fs::write(out.join("lib/static/liblibmem.a"), "archive bytes").unwrap();
    std::fs::write(out.join("include/libmem.h"), "// api\n").unwrap();
    std::fs::write(out.join("GLIBC_VERSION.txt"), "2.36\n").unwrap();
    out
  }

  fn read_entries(archive: &Path) -> Vec<(String, u64, u64)> {
    let file = File::open(archive).unwrap();
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar
      .entries()
      .unwrap()
      .map(|e| {
        let entry = e.unwrap();
        let path = entry.path().unwrap().to_string_lossy().into_owned();
        let header = entry.header();
        (path, header.uid().unwrap(), header.gid().unwrap())
      })
      .collect()
  }

  #[test]
  fn archive_sits_beside_the_tree() {
    let temp = TempDir::new().unwrap();
    let out = sample_tree(temp.path());

    let archive = pack_tree(&out).unwrap();
    assert_eq!(
      archive,
      temp.path().join("libmem-local-linux-gnu-x86_64.tar.gz")
    );
    assert!(archive.is_file());
  }

  #[test]
  fn entries_live_under_the_base_name() {
    let temp = TempDir::new().unwrap();
    let out = sample_tree(temp.path());

    let archive = pack_tree(&out).unwrap();
    let entries = read_entries(&archive);
    assert!(!entries.is_empty());
    for (path, _, _) in &entries {
      assert!(
        path.starts_with("libmem-local-linux-gnu-x86_64/"),
        "unexpected entry path: {path}"
      );
    }
    assert!(
      entries
        .iter()
        .any(|(p, _, _)| p == "libmem-local-linux-gnu-x86_64/lib/static/liblibmem.a")
    );
  }

  #[test]
  fn ownership_is_normalized_to_zero() {
    let temp = TempDir::new().unwrap();
    let out = sample_tree(temp.path());

    let archive = pack_tree(&out).unwrap();
    for (path, uid, gid) in read_entries(&archive) {
      assert_eq!((uid, gid), (0, 0), "entry {path} has non-normalized owner");
    }
  }

  #[test]
  fn entry_order_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let out = sample_tree(temp.path());

    let first = pack_tree(&out).unwrap();
    let first_entries: Vec<String> = read_entries(&first).into_iter().map(|(p, _, _)| p).collect();
    std::fs::remove_file(&first).unwrap();

    let second = pack_tree(&out).unwrap();
    let second_entries: Vec<String> = read_entries(&second).into_iter().map(|(p, _, _)| p).collect();
    assert_eq!(first_entries, second_entries);
  }
}
