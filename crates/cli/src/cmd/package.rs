use std::time::Instant;

use anyhow::{Context, Result};

use torstatic_lib::config::BuildConfig;
use torstatic_lib::package::package_libs;
use torstatic_lib::resolve::resolve;
use torstatic_lib::runner::CommandRunner;

use crate::output::{OutputFormat, format_bytes, format_duration, print_json, print_stat, print_success};

pub fn cmd_package_libs(config: &BuildConfig, runner: &dyn CommandRunner, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let sets = resolve(config, runner)?;
  let summary = package_libs(config.root(), &sets).context("Failed to package libraries")?;

  if output.is_json() {
    print_json(&summary)?;
  } else {
    println!();
    print_success("Libraries packaged!");
    print_stat("Files", &summary.files.len().to_string());
    print_stat("Size", &format_bytes(summary.bytes));
    print_stat("Tar archive", &summary.tar_path.display().to_string());
    print_stat("Zip archive", &summary.zip_path.display().to_string());
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}
