pub const APP_NAME: &str = "tor-static";

/// Subdirectory of every library folder that receives installed artifacts.
pub const DIST_DIR: &str = "dist";

/// Header shipped alongside the static libraries, relative to the root.
pub const API_HEADER: &str = "tor/src/feature/api/tor_api.h";

pub const TAR_ARCHIVE: &str = "libs.tar.gz";
pub const ZIP_ARCHIVE: &str = "libs.zip";

/// Default location of `autopoint` on macOS (Homebrew gettext).
pub const DEFAULT_AUTOPOINT_PATH: &str = "/usr/local/opt/gettext/bin";

/// Prefixes `uname -a` prints under a usable Windows shell.
pub const WINDOWS_SHELL_MARKERS: &[&str] = &["MINGW64", "MSYS2"];

/// Prefix that must not appear in `uname -a` on Linux.
pub const MINGW_MARKER: &str = "MINGW";
