//! Tests for the tar.gz and zip bundles.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tempfile::TempDir;
use torstatic_lib::consts::{API_HEADER, TAR_ARCHIVE, ZIP_ARCHIVE};
use torstatic_lib::package::{PackageError, bundle_paths, package_libs};
use torstatic_lib::resolve::{LibSet, static_tail};

use super::common::{FIXED_MTIME, TestTree};

fn sets() -> Vec<LibSet> {
  let mut sets = vec![
    LibSet::new("tor/src/core", ["tor-app", "tor-core"]),
    LibSet::new("tor/src/lib", ["tor-buf"]),
  ];
  sets.extend(static_tail());
  sets
}

/// Tree holding every file `sets()` names, each with distinct content.
fn populated() -> TestTree {
  let tree = TestTree::new();
  for (i, rel) in bundle_paths(&sets()).iter().enumerate() {
    let content = format!("!<arch>\n{rel}\n{}", "x".repeat(i * 97));
    tree.write_file(rel, content.as_bytes());
  }
  tree
}

#[derive(Debug, PartialEq)]
struct Stored {
  data: Vec<u8>,
  mode: u32,
}

fn read_tar(path: &Path) -> BTreeMap<String, (Stored, u64)> {
  let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
  let mut entries = BTreeMap::new();
  for entry in archive.entries().unwrap() {
    let mut entry = entry.unwrap();
    let name = entry.path().unwrap().to_string_lossy().replace('\\', "/");
    let mode = entry.header().mode().unwrap();
    let mtime = entry.header().mtime().unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    entries.insert(name, (Stored { data, mode }, mtime));
  }
  entries
}

/// Entries with the Unix mtime an extractor restores, taken from the
/// extended timestamp field.
fn read_zip(path: &Path) -> BTreeMap<String, (Stored, Option<u64>)> {
  let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
  let mut entries = BTreeMap::new();
  for i in 0..archive.len() {
    let mut file = archive.by_index(i).unwrap();
    assert_eq!(file.compression(), zip::CompressionMethod::Deflated);
    let name = file.name().to_string();
    let mode = file.unix_mode().unwrap() & 0o7777;
    let modified = file.extra_data_fields().find_map(|field| match field {
      zip::ExtraField::ExtendedTimestamp(ts) => ts.mod_time().map(u64::from),
      _ => None,
    });
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    entries.insert(name, (Stored { data, mode }, modified));
  }
  entries
}

#[test]
fn both_archives_hold_the_same_files() {
  let tree = populated();
  let root = tree.root();

  let summary = package_libs(&root, &sets()).unwrap();

  let expected = bundle_paths(&sets());
  assert_eq!(summary.files, expected);
  assert_eq!(summary.tar_path, root.join(TAR_ARCHIVE));
  assert_eq!(summary.zip_path, root.join(ZIP_ARCHIVE));

  let tar = read_tar(&summary.tar_path);
  let zip = read_zip(&summary.zip_path);
  assert_eq!(tar.keys().collect::<Vec<_>>(), zip.keys().collect::<Vec<_>>());
  assert_eq!(tar.len(), expected.len());
  assert!(tar.contains_key(API_HEADER));

  for rel in &expected {
    let on_disk = std::fs::read(root.join(rel)).unwrap();
    let (tar_entry, _) = &tar[rel];
    let (zip_entry, _) = &zip[rel];
    assert_eq!(tar_entry.data, on_disk, "{rel} differs in tar");
    assert_eq!(tar_entry, zip_entry, "{rel} differs between archives");
  }
}

#[test]
fn modification_times_match_the_sources() {
  let tree = populated();
  let summary = package_libs(&tree.root(), &sets()).unwrap();

  let tar = read_tar(&summary.tar_path);
  let zip = read_zip(&summary.zip_path);
  for (name, (_, mtime)) in &tar {
    assert_eq!(*mtime, FIXED_MTIME, "{name}");
    assert_eq!(zip[name].1, Some(*mtime), "{name} mtime differs between archives");
  }
}

#[cfg(unix)]
#[test]
fn permissions_are_preserved() {
  use std::os::unix::fs::PermissionsExt;

  let tree = populated();
  let exe = tree.root().join("xz/dist/lib/liblzma.a");
  std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

  let summary = package_libs(&tree.root(), &sets()).unwrap();

  let (tar_entry, _) = &read_tar(&summary.tar_path)["xz/dist/lib/liblzma.a"];
  let (zip_entry, _) = &read_zip(&summary.zip_path)["xz/dist/lib/liblzma.a"];
  assert_eq!(tar_entry.mode, 0o755);
  assert_eq!(zip_entry.mode, 0o755);
}

#[test]
fn extracted_archives_are_identical() {
  let tree = populated();
  let summary = package_libs(&tree.root(), &sets()).unwrap();

  let from_tar = TempDir::new().unwrap();
  tar::Archive::new(GzDecoder::new(File::open(&summary.tar_path).unwrap()))
    .unpack(from_tar.path())
    .unwrap();
  let from_zip = TempDir::new().unwrap();
  zip::ZipArchive::new(File::open(&summary.zip_path).unwrap())
    .unwrap()
    .extract(from_zip.path())
    .unwrap();

  for rel in bundle_paths(&sets()) {
    let a = std::fs::read(from_tar.path().join(&rel)).unwrap();
    let b = std::fs::read(from_zip.path().join(&rel)).unwrap();
    assert_eq!(a, b, "{rel}");
  }
}

#[test]
fn missing_library_fails_and_leaves_no_archive() {
  let tree = populated();
  std::fs::remove_file(tree.root().join("zlib/dist/lib/libz.a")).unwrap();

  let err = package_libs(&tree.root(), &sets()).unwrap_err();

  assert!(matches!(err, PackageError::Read { .. }));
  assert!(err.to_string().contains("libz.a"), "{err}");
  assert!(tree.root_files().is_empty(), "left behind: {:?}", tree.root_files());
}

#[test]
fn failed_run_keeps_previous_archives() {
  let tree = populated();
  tree.write_file(TAR_ARCHIVE, b"previous tar");
  tree.write_file(ZIP_ARCHIVE, b"previous zip");
  std::fs::remove_file(tree.root().join(API_HEADER)).unwrap();

  package_libs(&tree.root(), &sets()).unwrap_err();

  assert_eq!(std::fs::read(tree.root().join(TAR_ARCHIVE)).unwrap(), b"previous tar");
  assert_eq!(std::fs::read(tree.root().join(ZIP_ARCHIVE)).unwrap(), b"previous zip");
  assert_eq!(tree.root_files(), [TAR_ARCHIVE, ZIP_ARCHIVE]);
}

#[test]
fn rerun_replaces_archives() {
  let tree = populated();
  tree.write_file(TAR_ARCHIVE, b"stale");

  let summary = package_libs(&tree.root(), &sets()).unwrap();

  assert_eq!(read_tar(&summary.tar_path).len(), bundle_paths(&sets()).len());
  assert_eq!(tree.root_files(), [TAR_ARCHIVE, ZIP_ARCHIVE]);
}
