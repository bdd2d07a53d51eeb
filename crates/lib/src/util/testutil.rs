//! Test utilities for torstatic-lib.
//!
//! Cross-platform command helpers plus a recording [`CommandRunner`] that
//! never spawns anything.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use crate::runner::{CommandRunner, CommandStep, RunError};

/// A step that prints an environment variable.
#[cfg(unix)]
pub fn echo_env_step(var: &str, dir: &Path) -> CommandStep {
  CommandStep::new("/bin/sh", dir).args(["-c".to_string(), format!("echo \"${}\"", var)])
}

#[cfg(windows)]
pub fn echo_env_step(var: &str, dir: &Path) -> CommandStep {
  CommandStep::new("cmd.exe", dir).args(["/C".to_string(), format!("echo %{}%", var)])
}

/// A step that creates an empty file in its working directory.
#[cfg(unix)]
pub fn touch_step(filename: &str, dir: &Path) -> CommandStep {
  CommandStep::new("/bin/sh", dir).args(["-c".to_string(), format!(": > '{}'", filename)])
}

#[cfg(windows)]
pub fn touch_step(filename: &str, dir: &Path) -> CommandStep {
  CommandStep::new("cmd.exe", dir).args(["/C".to_string(), format!("type nul > {}", filename)])
}

/// A step that exits with the given status.
#[cfg(unix)]
pub fn exit_step(code: i32, dir: &Path) -> CommandStep {
  CommandStep::new("/bin/sh", dir).args(["-c".to_string(), format!("exit {}", code)])
}

#[cfg(windows)]
pub fn exit_step(code: i32, dir: &Path) -> CommandStep {
  CommandStep::new("cmd.exe", dir).args(["/C".to_string(), format!("exit {}", code)])
}

type FailPredicate = Box<dyn Fn(&CommandStep) -> bool>;

/// Records every step it is given, in order.
///
/// `run` fails for steps matching the failure predicate. `output` returns the
/// canned stdout registered for the step's program and fails otherwise.
#[derive(Default)]
pub struct RecordingRunner {
  steps: RefCell<Vec<CommandStep>>,
  fail_when: Option<FailPredicate>,
  outputs: HashMap<String, String>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail_when(mut self, predicate: impl Fn(&CommandStep) -> bool + 'static) -> Self {
    self.fail_when = Some(Box::new(predicate));
    self
  }

  pub fn with_output(mut self, program: &str, stdout: &str) -> Self {
    self.outputs.insert(program.to_string(), stdout.to_string());
    self
  }

  pub fn steps(&self) -> Vec<CommandStep> {
    self.steps.borrow().clone()
  }

  /// Last path component of each recorded working directory, deduplicated in order.
  pub fn folders(&self) -> Vec<String> {
    let mut folders: Vec<String> = Vec::new();
    for step in self.steps.borrow().iter() {
      let name = step
        .dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
      if folders.last() != Some(&name) {
        folders.push(name);
      }
    }
    folders
  }

  fn failure(step: &CommandStep) -> RunError {
    RunError::Failed {
      dir: step.dir.clone(),
      program: step.program.clone(),
      args: step.args.clone(),
      code: Some(1),
    }
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&self, step: &CommandStep) -> Result<(), RunError> {
    self.steps.borrow_mut().push(step.clone());
    match &self.fail_when {
      Some(predicate) if predicate(step) => Err(Self::failure(step)),
      _ => Ok(()),
    }
  }

  fn output(&self, step: &CommandStep) -> Result<String, RunError> {
    self.steps.borrow_mut().push(step.clone());
    self
      .outputs
      .get(&step.program)
      .cloned()
      .ok_or_else(|| Self::failure(step))
  }
}
