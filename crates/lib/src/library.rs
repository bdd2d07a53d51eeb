//! The fixed set of native libraries and what each one needs.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized library: {0}")]
pub struct UnknownLibrary(pub String);

/// One of the libraries in the chain. Its identity is its folder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Library {
  /// TLS library.
  OpenSsl,
  /// Event library.
  Libevent,
  /// Compression library.
  Zlib,
  /// LZMA library.
  Xz,
  /// The daemon, built as a set of static libraries.
  Tor,
}

impl Library {
  /// Every library, in declaration order. Ties in the build order are
  /// broken by position in this list.
  pub const ALL: [Library; 5] = [Self::OpenSsl, Self::Libevent, Self::Zlib, Self::Xz, Self::Tor];

  /// Link-order tail appended after the daemon's own libraries.
  pub const LINK_TAIL: [Library; 4] = [Self::Libevent, Self::Xz, Self::Zlib, Self::OpenSsl];

  pub fn folder(&self) -> &'static str {
    match self {
      Self::OpenSsl => "_openssl",
      Self::Libevent => "libevent",
      Self::Zlib => "zlib",
      Self::Xz => "xz",
      Self::Tor => "tor",
    }
  }

  /// Libraries that must be built before this one.
  pub fn dependencies(&self) -> &'static [Library] {
    match self {
      Self::Libevent => &[Self::OpenSsl],
      Self::Tor => &[Self::OpenSsl, Self::Libevent, Self::Zlib, Self::Xz],
      Self::OpenSsl | Self::Zlib | Self::Xz => &[],
    }
  }

  /// Bare names of the static libraries installed under `dist/lib`.
  ///
  /// The daemon reports its own through `make show-libs` instead.
  pub fn link_names(&self) -> &'static [&'static str] {
    match self {
      Self::OpenSsl => &["ssl", "crypto"],
      Self::Libevent => &["event"],
      Self::Zlib => &["z"],
      Self::Xz => &["lzma"],
      Self::Tor => &[],
    }
  }
}

impl fmt::Display for Library {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.folder())
  }
}

impl FromStr for Library {
  type Err = UnknownLibrary;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|lib| lib.folder() == s)
      .ok_or_else(|| UnknownLibrary(s.to_string()))
  }
}
