//! Bundle the resolved static libraries into `libs.tar.gz` and `libs.zip`.
//!
//! Both archives are written side by side into temporary files next to
//! their final paths. They are renamed into place only once every entry has
//! been written to both, so a failed run leaves no archive behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, Timelike, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};
use zip::write::FullFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::consts::{API_HEADER, TAR_ARCHIVE, ZIP_ARCHIVE};
use crate::resolve::LibSet;

/// Info-ZIP extended timestamp extra field.
const EXTENDED_TIMESTAMP: u16 = 0x5455;

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("unable to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("unable to write {}: {source}", archive.display())]
  Write {
    archive: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("unable to write {}: {source}", archive.display())]
  Zip {
    archive: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },
}

/// One file as stored in both archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  /// Relative path inside the archive, `/`-separated.
  pub path: String,
  pub data: Vec<u8>,
  pub mode: u32,
  /// Seconds since the Unix epoch.
  pub mtime: u64,
}

impl ArchiveEntry {
  /// Load `rel` from under `root` with its metadata.
  pub fn load(root: &Path, rel: &str) -> Result<Self, PackageError> {
    let path = root.join(rel);
    let read_err = |source| PackageError::Read {
      path: path.clone(),
      source,
    };

    let metadata = fs::metadata(&path).map_err(read_err)?;
    let data = fs::read(&path).map_err(read_err)?;
    let mtime = metadata.modified().and_then(unix_seconds).map_err(read_err)?;

    Ok(Self {
      path: rel.to_string(),
      data,
      mode: file_mode(&metadata),
      mtime,
    })
  }
}

fn unix_seconds(time: SystemTime) -> io::Result<u64> {
  time
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "modification time is before 1970"))
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
  use std::os::unix::fs::PermissionsExt;
  metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(metadata: &fs::Metadata) -> u32 {
  if metadata.permissions().readonly() { 0o444 } else { 0o644 }
}

/// Every file that goes into the bundle, relative to the build root.
pub fn bundle_paths(sets: &[LibSet]) -> Vec<String> {
  sets
    .iter()
    .flat_map(LibSet::archive_paths)
    .chain(std::iter::once(API_HEADER.to_string()))
    .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
  pub files: Vec<String>,
  pub bytes: u64,
  pub tar_path: PathBuf,
  pub zip_path: PathBuf,
}

/// Writes the same entries to a gzipped tar and a deflated zip.
pub struct Packager {
  tar: tar::Builder<GzEncoder<NamedTempFile>>,
  zip: ZipWriter<NamedTempFile>,
  tar_path: PathBuf,
  zip_path: PathBuf,
  files: Vec<String>,
  bytes: u64,
}

impl Packager {
  /// Start archives that will land at `tar_path` and `zip_path`.
  pub fn create(tar_path: &Path, zip_path: &Path) -> Result<Self, PackageError> {
    let tar_file = temp_beside(tar_path)?;
    let zip_file = temp_beside(zip_path)?;

    Ok(Self {
      tar: tar::Builder::new(GzEncoder::new(tar_file, Compression::default())),
      zip: ZipWriter::new(zip_file),
      tar_path: tar_path.to_path_buf(),
      zip_path: zip_path.to_path_buf(),
      files: Vec::new(),
      bytes: 0,
    })
  }

  pub fn add(&mut self, entry: &ArchiveEntry) -> Result<(), PackageError> {
    debug!(path = %entry.path, size = entry.data.len(), "packaging");

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(entry.data.len() as u64);
    header.set_mode(entry.mode);
    header.set_mtime(entry.mtime);
    self
      .tar
      .append_data(&mut header, &entry.path, entry.data.as_slice())
      .map_err(|source| self.tar_error(source))?;

    let mut options = FullFileOptions::default()
      .compression_method(CompressionMethod::Deflated)
      .unix_permissions(entry.mode)
      .last_modified_time(zip_time(entry.mtime));
    options
      .add_extra_data(EXTENDED_TIMESTAMP, extended_timestamp(entry.mtime), false)
      .map_err(|source| self.zip_error(source))?;
    self
      .zip
      .start_file(entry.path.as_str(), options)
      .map_err(|source| self.zip_error(source))?;
    self
      .zip
      .write_all(&entry.data)
      .map_err(|source| self.zip_error(source.into()))?;

    self.files.push(entry.path.clone());
    self.bytes += entry.data.len() as u64;
    Ok(())
  }

  /// Finish both archives and move them into place.
  pub fn finish(self) -> Result<PackageSummary, PackageError> {
    let Self {
      tar,
      zip,
      tar_path,
      zip_path,
      files,
      bytes,
    } = self;

    let tar_err = |source| PackageError::Write {
      archive: tar_path.clone(),
      source,
    };
    let tar_file = tar.into_inner().and_then(GzEncoder::finish).map_err(tar_err)?;
    let zip_file = zip.finish().map_err(|source| PackageError::Zip {
      archive: zip_path.clone(),
      source,
    })?;

    tar_file.persist(&tar_path).map_err(|e| tar_err(e.error))?;
    zip_file.persist(&zip_path).map_err(|e| PackageError::Write {
      archive: zip_path.clone(),
      source: e.error,
    })?;

    Ok(PackageSummary {
      files,
      bytes,
      tar_path,
      zip_path,
    })
  }

  fn tar_error(&self, source: io::Error) -> PackageError {
    PackageError::Write {
      archive: self.tar_path.clone(),
      source,
    }
  }

  fn zip_error(&self, source: zip::result::ZipError) -> PackageError {
    PackageError::Zip {
      archive: self.zip_path.clone(),
      source,
    }
  }
}

fn temp_beside(path: &Path) -> Result<NamedTempFile, PackageError> {
  let dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  NamedTempFile::new_in(dir).map_err(|source| PackageError::Write {
    archive: path.to_path_buf(),
    source,
  })
}

/// Body of the extended timestamp field: flags (modification time only) and
/// the mtime as 32-bit little-endian seconds. Extractors read this in
/// preference to the DOS fields, so the instant survives any local timezone.
fn extended_timestamp(mtime: u64) -> [u8; 5] {
  let secs = i32::try_from(mtime).unwrap_or(i32::MAX).to_le_bytes();
  [0x01, secs[0], secs[1], secs[2], secs[3]]
}

/// DOS time for readers that ignore the extended timestamp. Written as UTC,
/// two-second resolution, 1980 to 2107. Times outside that range are clamped
/// to the earliest representable value.
fn zip_time(mtime: u64) -> zip::DateTime {
  let time = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(mtime);
  let utc: DateTime<Utc> = time.into();
  let Ok(year) = u16::try_from(utc.year()) else {
    return zip::DateTime::default();
  };
  zip::DateTime::from_date_and_time(
    year,
    utc.month() as u8,
    utc.day() as u8,
    utc.hour() as u8,
    utc.minute() as u8,
    utc.second() as u8,
  )
  .unwrap_or_default()
}

/// Package every archive named by `sets`, plus the daemon API header, into
/// `libs.tar.gz` and `libs.zip` under `root`.
pub fn package_libs(root: &Path, sets: &[LibSet]) -> Result<PackageSummary, PackageError> {
  let mut packager = Packager::create(&root.join(TAR_ARCHIVE), &root.join(ZIP_ARCHIVE))?;
  for rel in bundle_paths(sets) {
    let entry = ArchiveEntry::load(root, &rel)?;
    packager.add(&entry)?;
  }
  let summary = packager.finish()?;
  info!(
    files = summary.files.len(),
    bytes = summary.bytes,
    "wrote {} and {}",
    summary.tar_path.display(),
    summary.zip_path.display()
  );
  Ok(summary)
}
