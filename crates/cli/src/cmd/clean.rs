use anyhow::{Context, Result};
use serde::Serialize;

use torstatic_lib::config::BuildConfig;
use torstatic_lib::orchestrate::{Orchestrator, Target};
use torstatic_lib::runner::CommandRunner;

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
struct CleanReport {
  cleaned: Vec<&'static str>,
  skipped: Vec<&'static str>,
  dry_run: bool,
}

pub fn cmd_clean(config: &BuildConfig, runner: &dyn CommandRunner, target: Target, output: OutputFormat) -> Result<()> {
  let orchestrator = Orchestrator::new(config, runner)?;
  let summary = orchestrator
    .clean(target)
    .with_context(|| format!("Failed to clean {}", target))?;

  let report = CleanReport {
    cleaned: summary.cleaned.iter().map(|lib| lib.folder()).collect(),
    skipped: summary.skipped.iter().map(|lib| lib.folder()).collect(),
    dry_run: config.dry_run(),
  };

  if output.is_json() {
    print_json(&report)?;
    return Ok(());
  }

  println!();
  if report.dry_run {
    print_info("Dry run - no commands were executed");
  } else {
    print_success("Clean complete!");
  }
  if !report.cleaned.is_empty() {
    print_stat("Cleaned", &report.cleaned.join(", "));
  }
  if !report.skipped.is_empty() {
    print_stat("Nothing to clean", &report.skipped.join(", "));
  }

  Ok(())
}
