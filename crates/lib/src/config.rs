//! Immutable configuration for one run.

use std::io;
use std::path::{Path, PathBuf};

use crate::consts::{DEFAULT_AUTOPOINT_PATH, DIST_DIR};
use crate::library::Library;
use crate::platform::Platform;
use crate::platform::paths::toolchain_path;

/// Everything the components need to know about a run.
///
/// Constructed once by the front end and passed by reference; nothing reads
/// ambient state after this value exists.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  root: PathBuf,
  platform: Platform,
  jobs: usize,
  verbose: bool,
  autopoint_path: PathBuf,
  dry_run: bool,
}

impl BuildConfig {
  /// Configuration rooted at `root` with default settings.
  ///
  /// `root` is used as given; see [`BuildConfig::canonical`] for the usual
  /// front-end entry point.
  pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
    Self {
      root: root.into(),
      platform,
      jobs: default_jobs(),
      verbose: false,
      autopoint_path: PathBuf::from(DEFAULT_AUTOPOINT_PATH),
      dry_run: false,
    }
  }

  /// Like [`BuildConfig::new`], but resolves `root` to an absolute path first.
  pub fn canonical(root: &Path, platform: Platform) -> io::Result<Self> {
    Ok(Self::new(dunce::canonicalize(root)?, platform))
  }

  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = jobs.max(1);
    self
  }

  pub fn with_verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }

  pub fn with_host(mut self, host: Option<String>) -> Self {
    self.platform = self.platform.with_host(host);
    self
  }

  pub fn with_autopoint_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.autopoint_path = path.into();
    self
  }

  pub fn with_dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn platform(&self) -> &Platform {
    &self.platform
  }

  pub fn host(&self) -> Option<&str> {
    self.platform.host.as_deref()
  }

  pub fn jobs(&self) -> usize {
    self.jobs
  }

  pub fn verbose(&self) -> bool {
    self.verbose
  }

  pub fn autopoint_path(&self) -> &Path {
    &self.autopoint_path
  }

  pub fn dry_run(&self) -> bool {
    self.dry_run
  }

  /// Source folder of `library`.
  pub fn library_dir(&self, library: Library) -> PathBuf {
    self.root.join(library.folder())
  }

  /// `<library>/dist`, rendered for the platform's toolchain.
  pub fn dist_path(&self, library: Library) -> String {
    toolchain_path(&self.library_dir(library).join(DIST_DIR), self.platform.os)
  }

  /// Parallel-job flag passed to make.
  pub fn jobs_flag(&self) -> String {
    format!("-j{}", self.jobs)
  }
}

fn default_jobs() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
