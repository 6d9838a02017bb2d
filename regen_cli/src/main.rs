use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use regen::{Cache, Driver, Invoker, Outcome, ResourceKey};
use regen::tracker::log::TracingTracker;

use crate::config::CliConfig;

mod config;

/// Regenerates Java sources from WSDL files and endpoint classes, skipping WSDL files that have not changed since
/// their last successful generation.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
  /// Configuration file, relative to the base directory.
  #[arg(short, long, default_value = "regen.toml")]
  config: PathBuf,
  /// Project base directory that relative paths are resolved against. Defaults to the current directory.
  #[arg(short, long)]
  base_dir: Option<PathBuf>,
  /// Only report which inputs are stale, without generating.
  #[arg(long)]
  dry_run: bool,
  /// Log checks and marker updates.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let args = Args::parse();
  let default_directive = if args.verbose { "regen=debug" } else { "regen=info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();

  match run(args) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      error!("{:#}", e);
      ExitCode::FAILURE
    }
  }
}

/// Runs every configured generator, returning whether all inputs succeeded.
fn run(args: Args) -> anyhow::Result<bool> {
  let base_dir = match args.base_dir {
    Some(base_dir) => base_dir,
    None => std::env::current_dir().context("failed to get current directory")?,
  };
  let config = CliConfig::read(&base_dir.join(&args.config))?.resolve(&base_dir);
  let store = config.cache.open_store()?;
  let mut driver = Driver::new(Cache::with_tracker(store, TracingTracker));
  let mut invoker = config.tool.invoker(&base_dir);
  let mut success = true;

  if let Some(wsimport) = &config.wsimport {
    let inputs = wsimport.inputs()?;
    if inputs.is_empty() {
      info!("no WSDL files or URLs to process");
    }
    if args.dry_run {
      for input in driver.stale(&inputs) {
        info!(key = %input.key, "stale");
      }
    } else {
      let report = driver.run(&inputs, &mut invoker, |input| {
        let invocation = wsimport.args(input.relative_path.as_deref())?.with_input(input);
        Ok(config.tool.argv(invocation))
      });
      for (key, outcome) in report.failures() {
        match outcome {
          Outcome::Failed(e) => error!(%key, error = %e, "wsimport failed"),
          Outcome::Misconfigured(e) => error!(%key, error = %e, "wsimport not run"),
          _ => {}
        }
      }
      for (key, outcome) in report.outcomes() {
        if let Outcome::Generated { cache_error: Some(e) } = outcome {
          warn!(%key, error = %e, "generated, but will be regenerated next time");
        }
      }
      success &= report.is_success();
    }
  }

  if let Some(wsgen) = &config.wsgen {
    for (sei, invocation) in wsgen.invocations() {
      let argv = config.tool.argv(invocation);
      if args.dry_run {
        info!(sei, "stale");
        continue;
      }
      let key = ResourceKey::parse(&format!("class:{}", sei))?;
      info!(sei, ?argv, "processing");
      if let Err(e) = invoker.invoke(&key, &argv) {
        error!(sei, error = %e, "wsgen failed");
        success = false;
      }
    }
  }

  Ok(success)
}
