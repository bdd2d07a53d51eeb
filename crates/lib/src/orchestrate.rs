//! Dependency-ordered build and clean over the library set.
//!
//! Libraries are processed strictly one at a time. The first failure stops
//! the walk; nothing already built is rolled back.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::consts::DIST_DIR;
use crate::graph::{GraphError, LibraryGraph};
use crate::library::{Library, UnknownLibrary};
use crate::plan::{BuildPlan, CleanPlan, PlanError};
use crate::runner::{CommandRunner, RunError};

#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error("cannot plan {library}: {source}")]
  Plan {
    library: Library,
    #[source]
    source: PlanError,
  },

  #[error("building {library} failed: {source}")]
  Build {
    library: Library,
    #[source]
    source: RunError,
  },

  #[error("cleaning {library} failed: {source}")]
  Clean {
    library: Library,
    #[source]
    source: RunError,
  },

  #[error("{} is not a directory", .0.display())]
  NotADirectory(PathBuf),

  #[error("unable to remove {}: {source}", path.display())]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// What a build or clean command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  All,
  One(Library),
}

impl FromStr for Target {
  type Err = UnknownLibrary;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "all" {
      Ok(Target::All)
    } else {
      s.parse().map(Target::One)
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Target::All => f.write_str("all"),
      Target::One(lib) => write!(f, "{}", lib),
    }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
  pub built: Vec<Library>,
  pub steps: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanSummary {
  pub cleaned: Vec<Library>,
  /// Libraries that had never been configured.
  pub skipped: Vec<Library>,
}

pub struct Orchestrator<'a> {
  config: &'a BuildConfig,
  runner: &'a dyn CommandRunner,
  graph: LibraryGraph,
}

impl<'a> Orchestrator<'a> {
  pub fn new(config: &'a BuildConfig, runner: &'a dyn CommandRunner) -> Result<Self, BuildError> {
    Ok(Self {
      config,
      runner,
      graph: LibraryGraph::new()?,
    })
  }

  /// Build order of every library.
  pub fn order(&self) -> &[Library] {
    self.graph.order()
  }

  fn targets(&self, target: Target) -> Vec<Library> {
    match target {
      Target::All => self.graph.order().to_vec(),
      Target::One(lib) => vec![lib],
    }
  }

  /// Build `target`.
  ///
  /// A single library is built on its own; its prerequisites must already
  /// be installed. Every plan is rendered before the first command runs.
  pub fn build(&self, target: Target) -> Result<BuildSummary, BuildError> {
    if let Target::One(library) = target {
      self.warn_missing_prerequisites(library);
    }

    let plans = self
      .targets(target)
      .into_iter()
      .map(|library| BuildPlan::for_library(library, self.config).map_err(|source| BuildError::Plan { library, source }))
      .collect::<Result<Vec<_>, _>>()?;

    let mut summary = BuildSummary::default();
    for plan in plans {
      info!("*** Building {} ***", plan.library);
      for step in &plan.steps {
        self.runner.run(step).map_err(|source| BuildError::Build {
          library: plan.library,
          source,
        })?;
        summary.steps += 1;
      }
      info!("*** Done building {} ***", plan.library);
      summary.built.push(plan.library);
    }
    Ok(summary)
  }

  /// Prerequisites of `library` with no `dist` directory yet.
  fn missing_prerequisites(&self, library: Library) -> Vec<Library> {
    self
      .graph
      .dependencies(library)
      .into_iter()
      .filter(|dep| !self.config.library_dir(*dep).join(DIST_DIR).is_dir())
      .collect()
  }

  fn warn_missing_prerequisites(&self, library: Library) {
    for dep in self.missing_prerequisites(library) {
      warn!(
        prerequisite = %dep,
        "prerequisite {} of {} is not built, building anyway", dep, library
      );
    }
  }

  /// Clean `target`, stopping at the first library that fails.
  pub fn clean(&self, target: Target) -> Result<CleanSummary, BuildError> {
    let mut summary = CleanSummary::default();
    for library in self.targets(target) {
      info!("*** Cleaning {} ***", library);
      if self.clean_one(library)? {
        summary.cleaned.push(library);
      } else {
        summary.skipped.push(library);
      }
      info!("*** Done cleaning {} ***", library);
    }
    Ok(summary)
  }

  /// Returns false when the library had nothing to clean.
  fn clean_one(&self, library: Library) -> Result<bool, BuildError> {
    let dir = self.config.library_dir(library);
    if !dir.is_dir() {
      return Err(BuildError::NotADirectory(dir));
    }

    let plan = CleanPlan::for_library(library, self.config).map_err(|source| BuildError::Plan { library, source })?;

    for path in &plan.purge {
      if self.config.dry_run() {
        info!(path = %path.display(), "would remove");
        continue;
      }
      match std::fs::remove_dir_all(path) {
        Ok(()) => info!(path = %path.display(), "removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
          return Err(BuildError::Remove {
            path: path.clone(),
            source,
          });
        }
      }
    }

    if !plan.control_file.is_file() {
      warn!(
        control_file = %plan.control_file.display(),
        "skipping clean of {}, nothing to clean", library
      );
      return Ok(false);
    }

    self
      .runner
      .run(&plan.step)
      .map_err(|source| BuildError::Clean { library, source })?;
    Ok(true)
  }
}
