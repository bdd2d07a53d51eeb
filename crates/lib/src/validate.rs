//! Preconditions checked before any command runs.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{MINGW_MARKER, WINDOWS_SHELL_MARKERS};
use crate::library::Library;
use crate::platform::{Os, Platform};
use crate::runner::{CommandRunner, CommandStep, RunError};

#[derive(Debug, Error)]
pub enum ValidateError {
  #[error("{} is not a dir", .0.display())]
  MissingFolder(PathBuf),

  #[error("this has to be run in a MSYS or MinGW shell, uname failed: {0}")]
  ShellQuery(#[source] RunError),

  #[error("this has to be run in a MSYS or MinGW64 shell, uname output: {0}")]
  NotMingwShell(String),

  #[error("a MinGW shell must run the Windows binary, not the Linux one (uname output: {0})")]
  MingwOnLinux(String),
}

/// Check that every library folder exists under `root` and that the shell
/// matches the platform the binary was built for.
pub fn validate_environment(
  root: &Path,
  libraries: &[Library],
  platform: &Platform,
  runner: &dyn CommandRunner,
) -> Result<(), ValidateError> {
  for lib in libraries {
    let dir = root.join(lib.folder());
    if !dir.is_dir() {
      return Err(ValidateError::MissingFolder(PathBuf::from(lib.folder())));
    }
  }

  match platform.os {
    Os::Windows => {
      let uname = identify_shell(root, runner)?;
      if !WINDOWS_SHELL_MARKERS.iter().any(|m| uname.starts_with(m)) {
        return Err(ValidateError::NotMingwShell(uname.trim_end().to_string()));
      }
    }
    Os::Linux => {
      let uname = identify_shell(root, runner)?;
      if uname.starts_with(MINGW_MARKER) {
        return Err(ValidateError::MingwOnLinux(uname.trim_end().to_string()));
      }
    }
    Os::MacOs => {}
  }

  Ok(())
}

fn identify_shell(root: &Path, runner: &dyn CommandRunner) -> Result<String, ValidateError> {
  let step = CommandStep::new("uname", root).arg("-a");
  let uname = runner.output(&step).map_err(ValidateError::ShellQuery)?;
  debug!(uname = %uname.trim_end(), "shell identification");
  Ok(uname)
}
