mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use torstatic_lib::config::BuildConfig;
use torstatic_lib::consts::{APP_NAME, DEFAULT_AUTOPOINT_PATH};
use torstatic_lib::library::Library;
use torstatic_lib::platform::Platform;
use torstatic_lib::runner::{CommandRunner, DryRunRunner, ProcessRunner};
use torstatic_lib::validate::validate_environment;

use cmd::Command;
use output::{OutputFormat, print_error};

/// Build Tor and its dependencies as static libraries
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// build-all, build-<library>, clean-all, clean-<library>, show-libs or package-libs
  #[arg(value_name = "COMMAND")]
  command: Command,

  /// Show build tool output and debug logs
  #[arg(short, long)]
  verbose: bool,

  /// Parallel jobs passed to make (default: number of CPUs)
  #[arg(short = 'j', long, env = "TOR_STATIC_JOBS")]
  jobs: Option<usize>,

  /// Cross-compile host triple passed to configure
  #[arg(long, env = "TOR_STATIC_HOST")]
  host: Option<String>,

  /// Directory holding autopoint, prepended to PATH for xz on macOS
  #[arg(long, env = "TOR_STATIC_AUTOPOINT_PATH", default_value = DEFAULT_AUTOPOINT_PATH)]
  autopoint_path: PathBuf,

  /// Directory containing the library source folders
  #[arg(long, env = "TOR_STATIC_ROOT", default_value = ".")]
  root: PathBuf,

  /// Log build and clean commands instead of running them
  #[arg(long)]
  dry_run: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

/// RUST_LOG wins; otherwise info, or debug with --verbose.
fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let process = ProcessRunner::new(cli.verbose);
  let platform = Platform::detect(&process).context("Failed to detect platform")?;

  let mut config = BuildConfig::canonical(&cli.root, platform)
    .with_context(|| format!("Failed to resolve root directory {}", cli.root.display()))?
    .with_verbose(cli.verbose)
    .with_host(cli.host)
    .with_autopoint_path(cli.autopoint_path)
    .with_dry_run(cli.dry_run);
  if let Some(jobs) = cli.jobs {
    config = config.with_jobs(jobs);
  }

  validate_environment(config.root(), &Library::ALL, config.platform(), &process)?;

  let runner: Box<dyn CommandRunner> = if config.dry_run() {
    Box::new(DryRunRunner::new(cli.verbose))
  } else {
    Box::new(process)
  };

  match cli.command {
    Command::Build(target) => cmd::cmd_build(&config, runner.as_ref(), target, cli.output),
    Command::Clean(target) => cmd::cmd_clean(&config, runner.as_ref(), target, cli.output),
    Command::ShowLibs => cmd::cmd_show_libs(&config, runner.as_ref(), cli.output),
    Command::PackageLibs => cmd::cmd_package_libs(&config, runner.as_ref(), cli.output),
  }
}
