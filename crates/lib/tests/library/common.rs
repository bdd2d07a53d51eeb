//! Shared helpers for library integration tests.

use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use torstatic_lib::library::Library;
use torstatic_lib::runner::{CommandRunner, CommandStep, RunError};

/// 2024-05-06T07:08:10Z
pub const FIXED_MTIME: u64 = 1_714_979_290;

/// Synthetic source tree with every library folder present.
pub struct TestTree {
  pub temp: TempDir,
}

impl TestTree {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    for lib in Library::ALL {
      std::fs::create_dir_all(temp.path().join(lib.folder())).unwrap();
    }
    Self { temp }
  }

  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  /// Write a file relative to the root with a fixed modification time.
  pub fn write_file(&self, relative_path: &str, content: &[u8]) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    File::options()
      .write(true)
      .open(&path)
      .unwrap()
      .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(FIXED_MTIME))
      .unwrap();
    path
  }

  /// Names of the regular files directly under the root.
  pub fn root_files(&self) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(self.temp.path())
      .unwrap()
      .map(|e| e.unwrap())
      .filter(|e| e.file_type().unwrap().is_file())
      .map(|e| e.file_name().to_string_lossy().into_owned())
      .collect();
    names.sort();
    names
  }
}

/// Runner that never spawns: records steps and answers queries from a fixed
/// table keyed by program name.
#[derive(Default)]
pub struct CannedRunner {
  pub steps: RefCell<Vec<CommandStep>>,
  pub outputs: Vec<(&'static str, &'static str)>,
}

impl CannedRunner {
  pub fn with_output(program: &'static str, stdout: &'static str) -> Self {
    Self {
      steps: RefCell::default(),
      outputs: vec![(program, stdout)],
    }
  }

  pub fn folders(&self) -> Vec<String> {
    let mut folders: Vec<String> = Vec::new();
    for step in self.steps.borrow().iter() {
      let name = folder_of(&step.dir);
      if folders.last() != Some(&name) {
        folders.push(name);
      }
    }
    folders
  }
}

fn folder_of(dir: &Path) -> String {
  dir.file_name().unwrap().to_string_lossy().into_owned()
}

impl CommandRunner for CannedRunner {
  fn run(&self, step: &CommandStep) -> Result<(), RunError> {
    self.steps.borrow_mut().push(step.clone());
    Ok(())
  }

  fn output(&self, step: &CommandStep) -> Result<String, RunError> {
    self.steps.borrow_mut().push(step.clone());
    self
      .outputs
      .iter()
      .find(|(program, _)| *program == step.program)
      .map(|(_, stdout)| stdout.to_string())
      .ok_or_else(|| RunError::Failed {
        dir: step.dir.clone(),
        program: step.program.clone(),
        args: step.args.clone(),
        code: Some(2),
      })
  }
}
