//! Path rendering for the external toolchain.
//!
//! Autoconf scripts and makefiles under MSYS only understand POSIX-style
//! absolute paths, so Windows paths are rewritten before they are placed
//! into configure flags or environment overlays.

use std::path::Path;

use super::os::Os;

/// Render an absolute path the way the toolchain on `os` expects it.
pub fn toolchain_path(path: &Path, os: Os) -> String {
  let raw = path.to_string_lossy();
  match os {
    Os::Windows => msys_path(&raw),
    Os::Linux | Os::MacOs => raw.into_owned(),
  }
}

/// Convert a Windows path such as `C:\work\tree` into `/c/work/tree`.
///
/// Paths without a drive letter only get their separators normalised.
pub fn msys_path(path: &str) -> String {
  let bytes = path.as_bytes();
  if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
    let drive = (bytes[0] as char).to_ascii_lowercase();
    let rest = path[2..].replace('\\', "/");
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
      format!("/{}", drive)
    } else {
      format!("/{}/{}", drive, rest)
    }
  } else {
    path.replace('\\', "/")
  }
}
