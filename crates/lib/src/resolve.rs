//! Static link order for the finished library set.
//!
//! The daemon's build system knows which of its internal archives it needs
//! and in what order, so it is asked (`make show-libs`) instead of guessed.
//! The other libraries follow in the fixed [`Library::LINK_TAIL`] order.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::consts::DIST_DIR;
use crate::library::Library;
use crate::runner::{CommandRunner, CommandStep, RunError};

/// Make target in the daemon's tree that lists its static archives.
pub const SHOW_LIBS_TARGET: &str = "show-libs";

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("failed 'make {SHOW_LIBS_TARGET}' in {folder}: {source}")]
  Query {
    folder: &'static str,
    #[source]
    source: RunError,
  },

  #[error("'make {SHOW_LIBS_TARGET}' printed nothing")]
  EmptyResponse,

  #[error("'{0}' is not a static library path")]
  Malformed(String),
}

/// A link-search directory and the libraries linked from it, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibSet {
  pub dir: String,
  pub libs: Vec<String>,
}

impl LibSet {
  pub fn new(dir: impl Into<String>, libs: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      dir: dir.into(),
      libs: libs.into_iter().map(Into::into).collect(),
    }
  }

  /// `-L<dir> -l<name>...`
  pub fn linker_flags(&self) -> String {
    let mut flags = format!("-L{}", self.dir);
    for lib in &self.libs {
      flags.push_str(" -l");
      flags.push_str(lib);
    }
    flags
  }

  /// Relative path of every archive this set names.
  pub fn archive_paths(&self) -> impl Iterator<Item = String> + '_ {
    self.libs.iter().map(|lib| format!("{}/lib{}.a", self.dir, lib))
  }
}

impl fmt::Display for LibSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.linker_flags())
  }
}

/// Group a space-separated list of archive paths by directory.
///
/// Directories keep first-seen order and each file name is reduced to its
/// bare library name (`libfoo.a` becomes `foo`).
pub fn parse_dependency_line(line: &str) -> Result<Vec<LibSet>, ResolveError> {
  group_under("", line)
}

/// As [`parse_dependency_line`], with every directory joined under `base`
/// before grouping, so spellings that clean to the same path share a set.
fn group_under(base: &str, line: &str) -> Result<Vec<LibSet>, ResolveError> {
  let mut sets: Vec<LibSet> = Vec::new();

  for token in line.split_whitespace() {
    let (dir, file) = token.rsplit_once('/').unwrap_or(("", token));
    let name = file
      .strip_suffix(".a")
      .and_then(|f| f.strip_prefix("lib"))
      .filter(|n| !n.is_empty())
      .ok_or_else(|| ResolveError::Malformed(token.to_string()))?;

    let dir = clean_join(base, dir);
    match sets.iter_mut().find(|s| s.dir == dir) {
      Some(set) => set.libs.push(name.to_string()),
      None => sets.push(LibSet::new(dir, [name])),
    }
  }

  if sets.is_empty() {
    return Err(ResolveError::EmptyResponse);
  }
  Ok(sets)
}

/// Join `base` and `rel` with `/`, dropping empty and `.` components and
/// folding `..`. An empty result is `.`.
fn clean_join(base: &str, rel: &str) -> String {
  let mut parts: Vec<&str> = Vec::new();
  for part in base.split('/').chain(rel.split('/')) {
    match part {
      "" | "." => {}
      ".." => {
        if parts.last().is_some_and(|p| *p != "..") {
          parts.pop();
        } else {
          parts.push(part);
        }
      }
      _ => parts.push(part),
    }
  }
  if parts.is_empty() { ".".to_string() } else { parts.join("/") }
}

/// Sets for the libraries whose archives are installed under `<folder>/dist/lib`.
pub fn static_tail() -> Vec<LibSet> {
  Library::LINK_TAIL
    .iter()
    .map(|lib| LibSet::new(format!("{}/{}/lib", lib.folder(), DIST_DIR), lib.link_names().iter().copied()))
    .collect()
}

/// Full link requirement, dependents first.
///
/// Paths are relative to the build root.
pub fn resolve(config: &BuildConfig, runner: &dyn CommandRunner) -> Result<Vec<LibSet>, ResolveError> {
  let daemon = Library::Tor;
  let step = CommandStep::new("make", config.library_dir(daemon)).arg(SHOW_LIBS_TARGET);

  let stdout = runner.output(&step).map_err(|source| ResolveError::Query {
    folder: daemon.folder(),
    source,
  })?;
  debug!(response = %stdout.trim(), "daemon link order");

  let mut sets = group_under(daemon.folder(), &stdout)?;
  sets.extend(static_tail());

  info!(sets = sets.len(), "resolved library set");
  Ok(sets)
}
