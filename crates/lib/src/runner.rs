//! External command execution.
//!
//! Every subprocess the orchestrator starts goes through [`CommandRunner`],
//! so orchestration can be exercised against a recording stub instead of a
//! real toolchain.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

/// Errors from running a single external command.
#[derive(Debug, Error)]
pub enum RunError {
  /// The process could not be started at all.
  #[error("failed to start `{program} {}` in {}: {source}", args.join(" "), dir.display())]
  Spawn {
    dir: PathBuf,
    program: String,
    args: Vec<String>,
    #[source]
    source: io::Error,
  },

  /// The process ran and exited unsuccessfully.
  #[error("`{program} {}` in {} failed with exit code {code:?}", args.join(" "), dir.display())]
  Failed {
    dir: PathBuf,
    program: String,
    args: Vec<String>,
    code: Option<i32>,
  },
}

impl RunError {
  fn spawn(step: &CommandStep, source: io::Error) -> Self {
    Self::Spawn {
      dir: step.dir.clone(),
      program: step.program.clone(),
      args: step.args.clone(),
      source,
    }
  }

  fn failed(step: &CommandStep, code: Option<i32>) -> Self {
    Self::Failed {
      dir: step.dir.clone(),
      program: step.program.clone(),
      args: step.args.clone(),
      code,
    }
  }
}

/// One external command: program, arguments, environment overlay and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
  pub program: String,
  pub args: Vec<String>,
  /// Added on top of the inherited environment.
  pub env: BTreeMap<String, String>,
  pub dir: PathBuf,
}

impl CommandStep {
  pub fn new(program: impl Into<String>, dir: impl AsRef<Path>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
      dir: dir.as_ref().to_path_buf(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  fn command(&self) -> Command {
    let mut command = Command::new(&self.program);
    command.args(&self.args).current_dir(&self.dir).envs(&self.env);
    command
  }
}

impl fmt::Display for CommandStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Synchronous execution of command steps.
pub trait CommandRunner {
  /// Run a step to completion. Output goes wherever the runner decides.
  fn run(&self, step: &CommandStep) -> Result<(), RunError>;

  /// Run a step and return its standard output.
  fn output(&self, step: &CommandStep) -> Result<String, RunError>;
}

/// Spawns real processes, one at a time.
///
/// With `verbose` the child inherits stdout and stderr; otherwise its output
/// is discarded rather than buffered, since compile logs can be very large.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
  verbose: bool,
}

impl ProcessRunner {
  pub fn new(verbose: bool) -> Self {
    Self { verbose }
  }

  fn stdio(&self) -> Stdio {
    if self.verbose { Stdio::inherit() } else { Stdio::null() }
  }
}

impl CommandRunner for ProcessRunner {
  fn run(&self, step: &CommandStep) -> Result<(), RunError> {
    info!(dir = %step.dir.display(), "running {}", step);
    if !step.env.is_empty() {
      debug!(env = ?step.env, "environment overlay");
    }

    let status = step
      .command()
      .stdin(Stdio::null())
      .stdout(self.stdio())
      .stderr(self.stdio())
      .status()
      .map_err(|e| RunError::spawn(step, e))?;

    if !status.success() {
      return Err(RunError::failed(step, status.code()));
    }
    Ok(())
  }

  fn output(&self, step: &CommandStep) -> Result<String, RunError> {
    debug!(dir = %step.dir.display(), "querying {}", step);

    let output = step
      .command()
      .stdin(Stdio::null())
      .stderr(self.stdio())
      .output()
      .map_err(|e| RunError::spawn(step, e))?;

    if !output.status.success() {
      return Err(RunError::failed(step, output.status.code()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!(stdout = %stdout.trim_end(), "command output");
    Ok(stdout)
  }
}

/// Logs build steps instead of executing them.
///
/// Queries still run for real so that validation and the daemon's link
/// order reflect the actual tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner {
  inner: ProcessRunner,
}

impl DryRunRunner {
  pub fn new(verbose: bool) -> Self {
    Self {
      inner: ProcessRunner::new(verbose),
    }
  }
}

impl CommandRunner for DryRunRunner {
  fn run(&self, step: &CommandStep) -> Result<(), RunError> {
    if step.env.is_empty() {
      info!(dir = %step.dir.display(), "would run {}", step);
    } else {
      info!(dir = %step.dir.display(), env = ?step.env, "would run {}", step);
    }
    Ok(())
  }

  fn output(&self, step: &CommandStep) -> Result<String, RunError> {
    self.inner.output(step)
  }
}
