//! Building blocks of the declarative recipe tables.

use crate::library::Library;
use crate::platform::{Os, Platform};

/// Condition under which an argument or environment entry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  Always,
  On(Os),
  NotOn(Os),
  /// A cross-compile host triple was given.
  Cross,
  /// Cross-compiling on the given OS.
  CrossOn(Os),
}

impl When {
  pub fn holds(&self, platform: &Platform) -> bool {
    match *self {
      When::Always => true,
      When::On(os) => platform.os == os,
      When::NotOn(os) => platform.os != os,
      When::Cross => platform.is_cross(),
      When::CrossOn(os) => platform.is_cross() && platform.os == os,
    }
  }
}

/// A value rendered at plan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Val {
  Lit(&'static str),
  /// Flag, then the library's own `dist` directory, then a suffix.
  OwnDist(&'static str, &'static str),
  /// Flag, then another library's `dist` directory, then a suffix.
  DepDist(&'static str, Library, &'static str),
  /// `-j<N>`.
  Jobs,
  /// Flag followed by the cross-compile host triple. Dropped without one.
  Host(&'static str),
  /// OpenSSL's macOS configuration target.
  TlsTarget,
  /// The autopoint directory prepended to the inherited `PATH`.
  ToolPath,
  /// Inline a shared argument list.
  Splice(&'static [Arg]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arg {
  pub when: When,
  pub val: Val,
}

pub const fn lit(s: &'static str) -> Arg {
  arg(Val::Lit(s))
}

pub const fn arg(val: Val) -> Arg {
  when(When::Always, val)
}

pub const fn when(when: When, val: Val) -> Arg {
  Arg { when, val }
}

pub const fn splice(args: &'static [Arg]) -> Arg {
  arg(Val::Splice(args))
}

#[derive(Debug, Clone, Copy)]
pub struct StepSpec {
  pub program: &'static str,
  pub args: &'static [Arg],
}

#[derive(Debug, Clone, Copy)]
pub struct EnvSpec {
  pub when: When,
  pub name: &'static str,
  pub val: Val,
}

pub const fn env(name: &'static str, val: Val) -> EnvSpec {
  EnvSpec {
    when: When::Always,
    name,
    val,
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platforms {
  Any,
  On(Os),
}

impl Platforms {
  pub fn matches(&self, platform: &Platform) -> bool {
    match self {
      Platforms::Any => true,
      Platforms::On(os) => platform.os == *os,
    }
  }
}

/// How to configure, compile and install one library.
///
/// The environment overlay applies to every step.
#[derive(Debug, Clone, Copy)]
pub struct Recipe {
  pub library: Library,
  pub platforms: Platforms,
  pub env: &'static [EnvSpec],
  pub configure: &'static [StepSpec],
  pub make: &'static [StepSpec],
}

/// How to clean one library.
#[derive(Debug, Clone, Copy)]
pub struct CleanRecipe {
  pub library: Library,
  pub platforms: Platforms,
  /// Build-control file whose absence means the library was never configured.
  pub control_file: &'static str,
  /// Directories under the library folder removed before cleaning.
  pub purge: &'static [&'static str],
  pub env: &'static [EnvSpec],
  /// Arguments to `make`.
  pub args: &'static [Arg],
}
