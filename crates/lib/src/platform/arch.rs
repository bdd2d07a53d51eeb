use std::fmt;

/// CPU architecture of the build machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  Aarch64,
  X86,
  Arm,
  /// Anything the recipes have no special handling for.
  Other,
}

impl Arch {
  /// Detect the architecture this binary was compiled for.
  pub fn current() -> Self {
    Self::from_name(std::env::consts::ARCH)
  }

  /// Parse an architecture name as printed by `uname -m` or used in target triples.
  pub fn from_name(name: &str) -> Self {
    match name.trim() {
      "x86_64" | "amd64" => Self::X86_64,
      "aarch64" | "arm64" => Self::Aarch64,
      "x86" | "i386" | "i486" | "i586" | "i686" => Self::X86,
      "arm" | "armv7l" | "armv6l" => Self::Arm,
      _ => Self::Other,
    }
  }

  /// Returns the lowercase string identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
      Self::X86 => "x86",
      Self::Arm => "arm",
      Self::Other => "unknown",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
