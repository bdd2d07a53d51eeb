//! End-to-end runs of the public API against a canned runner.

use torstatic_lib::config::BuildConfig;
use torstatic_lib::library::Library;
use torstatic_lib::orchestrate::{Orchestrator, Target};
use torstatic_lib::package::{bundle_paths, package_libs};
use torstatic_lib::platform::{Arch, Os, Platform};
use torstatic_lib::resolve::resolve;
use torstatic_lib::validate::validate_environment;

use super::common::{CannedRunner, TestTree};

const SHOW_LIBS: &str = "src/core/libtor-app.a src/lib/libtor-buf.a src/core/libtor-core.a ../tor/src/ext/libkeccak-tiny.a\n";

fn linux(tree: &TestTree) -> BuildConfig {
  BuildConfig::canonical(&tree.root(), Platform::new(Os::Linux, Arch::X86_64))
    .unwrap()
    .with_jobs(3)
}

#[test]
fn validate_then_build_all_in_order() {
  let tree = TestTree::new();
  let config = linux(&tree);
  let runner = CannedRunner::with_output("uname", "Linux host 6.8.0 x86_64 GNU/Linux\n");

  validate_environment(config.root(), &Library::ALL, config.platform(), &runner).unwrap();
  let orchestrator = Orchestrator::new(&config, &runner).unwrap();
  let summary = orchestrator.build(Target::All).unwrap();

  assert_eq!(orchestrator.order(), Library::ALL);
  assert_eq!(summary.built, Library::ALL);
  let folders = runner.folders();
  let root_name = tree.root().file_name().unwrap().to_string_lossy().into_owned();
  assert_eq!(folders, [root_name.as_str(), "_openssl", "libevent", "zlib", "xz", "tor"]);
}

#[test]
fn build_steps_carry_job_count() {
  let tree = TestTree::new();
  let config = linux(&tree);
  let runner = CannedRunner::default();

  Orchestrator::new(&config, &runner)
    .unwrap()
    .build(Target::One(Library::Xz))
    .unwrap();

  let steps = runner.steps.borrow();
  assert!(steps.iter().any(|s| s.program == "make" && s.args == ["-j3"]));
  assert!(steps.iter().all(|s| s.dir == tree.root().join("xz")));
}

#[test]
fn resolve_then_package() {
  let tree = TestTree::new();
  let config = linux(&tree);
  let runner = CannedRunner::with_output("make", SHOW_LIBS);

  let sets = resolve(&config, &runner).unwrap();
  let rendered: Vec<String> = sets.iter().map(|s| s.linker_flags()).collect();
  assert_eq!(
    rendered,
    [
      "-Ltor/src/core -ltor-app -ltor-core",
      "-Ltor/src/lib -ltor-buf",
      "-Ltor/src/ext -lkeccak-tiny",
      "-Llibevent/dist/lib -levent",
      "-Lxz/dist/lib -llzma",
      "-Lzlib/dist/lib -lz",
      "-L_openssl/dist/lib -lssl -lcrypto",
    ]
  );

  for rel in bundle_paths(&sets) {
    tree.write_file(&rel, rel.as_bytes());
  }
  let summary = package_libs(config.root(), &sets).unwrap();

  assert_eq!(summary.files.len(), 10);
  assert!(summary.tar_path.is_file());
  assert!(summary.zip_path.is_file());
}

#[test]
fn failed_query_stops_before_packaging() {
  let tree = TestTree::new();
  let config = linux(&tree);
  let runner = CannedRunner::default();

  assert!(resolve(&config, &runner).is_err());
  assert!(tree.root_files().is_empty());
}
