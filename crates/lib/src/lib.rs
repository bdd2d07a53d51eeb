//! torstatic-lib: build orchestration for a statically linked Tor.
//!
//! The crate builds a fixed chain of native libraries in dependency order
//! and bundles the resulting archives:
//! - [`validate`]: source tree and shell preconditions
//! - [`plan`]: per-library, per-platform command tables
//! - [`orchestrate`]: dependency-ordered build and clean
//! - [`resolve`]: static link order, asked of Tor's own build system
//! - [`package`]: `libs.tar.gz` and `libs.zip`

pub mod config;
pub mod consts;
pub mod graph;
pub mod library;
pub mod orchestrate;
pub mod package;
pub mod plan;
pub mod platform;
pub mod resolve;
pub mod runner;
pub mod util;
pub mod validate;
