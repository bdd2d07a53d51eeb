//! Build and clean plans.
//!
//! A plan is the fully rendered list of [`CommandStep`]s for one library on
//! one platform. Rendering happens before anything runs, so an unsupported
//! platform is reported without spawning a process.

pub mod recipes;
pub mod types;

use std::env;
use std::iter;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::BuildConfig;
use crate::library::Library;
use crate::platform::{Arch, Os, Platform};
use crate::runner::CommandStep;

use recipes::{BUILD_RECIPES, CLEAN_RECIPES};
use types::{Arg, CleanRecipe, EnvSpec, Recipe, StepSpec, Val};

/// Every program a plan may invoke.
pub const TOOLS: &[&str] = &["sh", "perl", "make"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
  #[error("unsupported architecture: {0}")]
  UnsupportedArch(String),

  #[error("no {kind} recipe for {library} on {os}")]
  NoRecipe {
    kind: &'static str,
    library: Library,
    os: Os,
  },
}

/// Ordered steps that configure, compile and install one library into `<library>/dist`.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  pub library: Library,
  pub steps: Vec<CommandStep>,
}

impl BuildPlan {
  pub fn for_library(library: Library, config: &BuildConfig) -> Result<Self, PlanError> {
    let recipe = find_recipe(library, config.platform())?;
    let render = Render { library, config };

    let env = render.env(recipe.env)?;
    let dir = config.library_dir(library);

    let mut steps = Vec::with_capacity(recipe.configure.len() + recipe.make.len());
    for spec in recipe.configure.iter().chain(recipe.make) {
      steps.push(render.step(spec, &dir, &env)?);
    }

    Ok(Self { library, steps })
  }
}

/// Removal of one library's build outputs.
#[derive(Debug, Clone)]
pub struct CleanPlan {
  pub library: Library,
  /// If this file is missing there is nothing to clean.
  pub control_file: PathBuf,
  /// Directories removed before `step` runs.
  pub purge: Vec<PathBuf>,
  pub step: CommandStep,
}

impl CleanPlan {
  pub fn for_library(library: Library, config: &BuildConfig) -> Result<Self, PlanError> {
    let recipe = find_clean_recipe(library, config.platform())?;
    let render = Render { library, config };
    let dir = config.library_dir(library);

    let mut args = Vec::new();
    render.args(recipe.args, &mut args)?;
    let env = render.env(recipe.env)?;

    let mut step = CommandStep::new("make", &dir).args(args);
    step.env = env.into_iter().collect();

    Ok(Self {
      library,
      control_file: dir.join(recipe.control_file),
      purge: recipe.purge.iter().map(|p| dir.join(p)).collect(),
      step,
    })
  }
}

fn find_recipe(library: Library, platform: &Platform) -> Result<&'static Recipe, PlanError> {
  BUILD_RECIPES
    .iter()
    .find(|r| r.library == library && r.platforms.matches(platform))
    .ok_or(PlanError::NoRecipe {
      kind: "build",
      library,
      os: platform.os,
    })
}

fn find_clean_recipe(library: Library, platform: &Platform) -> Result<&'static CleanRecipe, PlanError> {
  CLEAN_RECIPES
    .iter()
    .find(|r| r.library == library && r.platforms.matches(platform))
    .ok_or(PlanError::NoRecipe {
      kind: "clean",
      library,
      os: platform.os,
    })
}

/// OpenSSL configuration target for macOS.
///
/// An explicit host triple wins over the detected architecture. Anything
/// other than x86_64 or arm64 is rejected.
pub fn darwin_tls_target(platform: &Platform) -> Result<&'static str, PlanError> {
  if let Some(host) = platform.host.as_deref() {
    return if host.starts_with("x86_64") {
      Ok("darwin64-x86_64-cc")
    } else if host.starts_with("arm64") || host.starts_with("aarch64") {
      Ok("darwin64-arm64-cc")
    } else {
      Err(PlanError::UnsupportedArch(host.to_string()))
    };
  }

  match platform.arch {
    Arch::X86_64 => Ok("darwin64-x86_64-cc"),
    Arch::Aarch64 => Ok("darwin64-arm64-cc"),
    other => Err(PlanError::UnsupportedArch(other.to_string())),
  }
}

struct Render<'a> {
  library: Library,
  config: &'a BuildConfig,
}

impl Render<'_> {
  fn value(&self, val: &Val) -> Result<Option<String>, PlanError> {
    let rendered = match *val {
      Val::Lit(s) => s.to_string(),
      Val::OwnDist(flag, suffix) => format!("{}{}{}", flag, self.config.dist_path(self.library), suffix),
      Val::DepDist(flag, dep, suffix) => format!("{}{}{}", flag, self.config.dist_path(dep), suffix),
      Val::Jobs => self.config.jobs_flag(),
      Val::Host(flag) => match self.config.host() {
        Some(host) => format!("{}{}", flag, host),
        None => return Ok(None),
      },
      Val::TlsTarget => darwin_tls_target(self.config.platform())?.to_string(),
      Val::ToolPath => {
        let inherited = env::var_os("PATH").unwrap_or_default();
        let dirs = iter::once(self.config.autopoint_path().to_path_buf()).chain(env::split_paths(&inherited));
        match env::join_paths(dirs) {
          Ok(joined) => joined.to_string_lossy().into_owned(),
          Err(_) => self.config.autopoint_path().to_string_lossy().into_owned(),
        }
      }
      Val::Splice(_) => return Ok(None),
    };
    Ok(Some(rendered))
  }

  fn args(&self, args: &[Arg], out: &mut Vec<String>) -> Result<(), PlanError> {
    let platform = self.config.platform();
    for arg in args.iter().filter(|a| a.when.holds(platform)) {
      if let Val::Splice(inner) = arg.val {
        self.args(inner, out)?;
      } else if let Some(value) = self.value(&arg.val)? {
        out.push(value);
      }
    }
    Ok(())
  }

  fn env(&self, specs: &[EnvSpec]) -> Result<Vec<(String, String)>, PlanError> {
    let platform = self.config.platform();
    let mut env = Vec::new();
    for spec in specs.iter().filter(|s| s.when.holds(platform)) {
      if let Some(value) = self.value(&spec.val)? {
        env.push((spec.name.to_string(), value));
      }
    }
    Ok(env)
  }

  fn step(&self, spec: &StepSpec, dir: &Path, env: &[(String, String)]) -> Result<CommandStep, PlanError> {
    let mut args = Vec::new();
    self.args(spec.args, &mut args)?;

    let mut step = CommandStep::new(spec.program, dir).args(args);
    step.env = env.iter().cloned().collect();
    Ok(step)
  }
}
