mod build;
mod clean;
mod package;
mod show_libs;

use std::fmt;
use std::str::FromStr;

use torstatic_lib::orchestrate::Target;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use package::cmd_package_libs;
pub use show_libs::cmd_show_libs;

/// The single positional command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Build(Target),
  Clean(Target),
  ShowLibs,
  PackageLibs,
}

impl FromStr for Command {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "show-libs" => return Ok(Command::ShowLibs),
      "package-libs" => return Ok(Command::PackageLibs),
      _ => {}
    }

    if let Some(name) = s.strip_prefix("build-") {
      name.parse().map(Command::Build).map_err(|e| e.to_string())
    } else if let Some(name) = s.strip_prefix("clean-") {
      name.parse().map(Command::Clean).map_err(|e| e.to_string())
    } else {
      Err(format!(
        "invalid command '{}', expected build-<library>, clean-<library>, show-libs or package-libs",
        s
      ))
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Command::Build(target) => write!(f, "build-{}", target),
      Command::Clean(target) => write!(f, "clean-{}", target),
      Command::ShowLibs => f.write_str("show-libs"),
      Command::PackageLibs => f.write_str("package-libs"),
    }
  }
}
