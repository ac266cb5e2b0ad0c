mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cfgengine_lib::consts::{INSTALL_SCRIPT_FILENAME, LOG_ENV_VAR};
use cfgengine_lib::logger::{self, Severity};

use cmd::{DocumentArgs, Override, RunOptions};
use output::OutputFormat;

/// cfgengine - drive install configuration from resource definitions
#[derive(Parser)]
#[command(name = "cfgengine")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Configure every module and write the install script
  Run {
    #[command(flatten)]
    documents: DocumentArgs,

    /// Where to write the install script
    #[arg(short, long, default_value = INSTALL_SCRIPT_FILENAME)]
    output: PathBuf,

    /// Override a config value (repeatable)
    #[arg(long = "set", value_name = "MODULE.PORT=VALUE", value_parser = cmd::parse_override)]
    overrides: Vec<Override>,

    /// Replace an existing install script without keeping a .prev copy
    #[arg(long)]
    no_backup: bool,

    /// Prompt for each config value
    #[arg(short, long)]
    interactive: bool,
  },

  /// List config port types per module
  Types {
    #[command(flatten)]
    documents: DocumentArgs,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show current config values per module
  Values {
    #[command(flatten)]
    documents: DocumentArgs,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show one resource by key and id
  Resource {
    #[command(flatten)]
    documents: DocumentArgs,

    /// Resource key
    key: String,

    /// Resource id
    id: String,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(env_filter(cli.verbose))
    .with_writer(std::io::stderr)
    .without_time()
    .init();
  logger::register_logger(forward_to_tracing)?;

  match cli.command {
    Commands::Run {
      documents,
      output,
      overrides,
      no_backup,
      interactive,
    } => cmd::cmd_run(
      &documents,
      &RunOptions {
        output,
        overrides,
        backup_previous: !no_backup,
        interactive,
      },
    ),
    Commands::Types { documents, format } => cmd::cmd_types(&documents, format),
    Commands::Values { documents, format } => cmd::cmd_values(&documents, format),
    Commands::Resource {
      documents,
      key,
      id,
      format,
    } => cmd::cmd_resource(&documents, &key, &id, format),
  }
}

/// Filter from `CFGENGINE_LOG`, falling back to `info` (or `debug` when verbose).
fn env_filter(verbose: bool) -> EnvFilter {
  let fallback = if verbose { "debug" } else { "info" };
  EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Engine API messages go through the same subscriber as everything else.
fn forward_to_tracing(area: &str, subarea: &str, severity: Severity, message: &str) {
  match severity {
    Severity::Debug => tracing::debug!(area, subarea, "{}", message),
    Severity::Info => tracing::info!(area, subarea, "{}", message),
    Severity::Warning => tracing::warn!(area, subarea, "{}", message),
    Severity::Error => tracing::error!(area, subarea, "{}", message),
  }
}
