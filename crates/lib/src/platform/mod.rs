//! Platform descriptor for a build run.
//!
//! The descriptor is derived once at startup and never changes afterwards.

pub mod arch;
pub mod os;
pub mod paths;

use std::fmt;

use thiserror::Error;
use tracing::debug;

pub use arch::Arch;
pub use os::Os;

use crate::runner::{CommandRunner, CommandStep, RunError};

#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("unsupported operating system: {0}")]
  UnsupportedOs(String),

  #[error("failed to query machine architecture: {0}")]
  ArchQuery(#[source] RunError),
}

/// Operating system, CPU architecture and optional cross-compile host triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
  pub host: Option<String>,
}

impl Platform {
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch, host: None }
  }

  /// Set the cross-compile host triple. Empty strings count as unset.
  pub fn with_host(mut self, host: Option<String>) -> Self {
    self.host = host.filter(|h| !h.trim().is_empty());
    self
  }

  /// Detect the platform of the running process.
  ///
  /// On macOS the hardware architecture is asked from `uname -m`, since a
  /// translated x86_64 binary still has to produce arm64 libraries on arm64
  /// hardware.
  pub fn detect(runner: &dyn CommandRunner) -> Result<Self, PlatformError> {
    let os = Os::current().ok_or_else(|| PlatformError::UnsupportedOs(std::env::consts::OS.to_string()))?;

    let arch = match os {
      Os::MacOs => {
        let step = CommandStep::new("uname", ".").arg("-m");
        let out = runner.output(&step).map_err(PlatformError::ArchQuery)?;
        Arch::from_name(&out)
      }
      Os::Linux | Os::Windows => Arch::current(),
    };

    debug!(os = %os, arch = %arch, "detected platform");
    Ok(Self::new(os, arch))
  }

  pub fn is_cross(&self) -> bool {
    self.host.is_some()
  }

  /// Returns the platform triple string (e.g., "aarch64-darwin")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.host {
      Some(host) => write!(f, "{} (host {})", self.triple(), host),
      None => write!(f, "{}", self.triple()),
    }
  }
}
