use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use torstatic_lib::config::BuildConfig;
use torstatic_lib::orchestrate::{Orchestrator, Target};
use torstatic_lib::runner::CommandRunner;

use crate::output::{OutputFormat, format_duration, print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
struct BuildReport {
  libraries: Vec<&'static str>,
  commands: usize,
  dry_run: bool,
}

pub fn cmd_build(config: &BuildConfig, runner: &dyn CommandRunner, target: Target, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let orchestrator = Orchestrator::new(config, runner)?;
  let summary = orchestrator
    .build(target)
    .with_context(|| format!("Failed to build {}", target))?;

  let report = BuildReport {
    libraries: summary.built.iter().map(|lib| lib.folder()).collect(),
    commands: summary.steps,
    dry_run: config.dry_run(),
  };

  if output.is_json() {
    print_json(&report)?;
  } else {
    println!();
    if report.dry_run {
      print_info("Dry run - no commands were executed");
    } else {
      print_success("Build complete!");
    }
    print_stat("Platform", &config.platform().to_string());
    print_stat("Libraries", &report.libraries.join(", "));
    print_stat("Commands", &report.commands.to_string());
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}
