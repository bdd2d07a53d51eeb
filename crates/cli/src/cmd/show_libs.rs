use anyhow::Result;

use torstatic_lib::config::BuildConfig;
use torstatic_lib::resolve::resolve;
use torstatic_lib::runner::CommandRunner;

use crate::output::{OutputFormat, print_json};

/// Print linker flags in link order, one directory per line.
pub fn cmd_show_libs(config: &BuildConfig, runner: &dyn CommandRunner, output: OutputFormat) -> Result<()> {
  let sets = resolve(config, runner)?;

  if output.is_json() {
    print_json(&sets)?;
  } else {
    for set in &sets {
      println!("{}", set.linker_flags());
    }
  }

  Ok(())
}
