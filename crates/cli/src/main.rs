mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use critstore_lib::index::ScopeCategory;
use critstore_lib::store::Section;
use tracing_subscriber::EnvFilter;

use crate::cmd::{cmd_get, cmd_info, cmd_ls, cmd_put, cmd_resolve, cmd_rm};
use crate::output::{OutputFormat, print_error};

/// critstore - Inspect and edit a critical data store
#[derive(Parser)]
#[command(name = "critstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to the config file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show store locations, codec and recovery source
  Info {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// List scopes with their usage and record paths
  Ls {
    /// Only list this section
    section: Option<Section>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Print a record payload
  Get {
    section: Section,
    scope: u32,
    path: String,

    /// Print the payload as UTF-8 text instead of hex
    #[arg(long)]
    utf8: bool,
  },

  /// Write a UTF-8 record and commit
  Put {
    section: Section,
    scope: u32,
    path: String,
    value: String,

    /// Commit even if existing store files could not be loaded
    #[arg(long)]
    force: bool,
  },

  /// Remove a record and commit
  Rm {
    section: Section,
    scope: u32,
    path: String,

    /// Commit even if existing store files could not be loaded
    #[arg(long)]
    force: bool,
  },

  /// Resolve a data category to its storage coordinate
  Resolve {
    category: ScopeCategory,

    /// Theme, paytable or extension identifier (defaults to the configured context)
    #[arg(long)]
    id: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let config = cli.config.as_deref();
  match cli.command {
    Commands::Info { output } => cmd_info(config, output),
    Commands::Ls { section, output } => cmd_ls(config, section, output),
    Commands::Get {
      section,
      scope,
      path,
      utf8,
    } => cmd_get(config, section, scope, &path, utf8),
    Commands::Put {
      section,
      scope,
      path,
      value,
      force,
    } => cmd_put(config, section, scope, &path, &value, force),
    Commands::Rm {
      section,
      scope,
      path,
      force,
    } => cmd_rm(config, section, scope, &path, force),
    Commands::Resolve { category, id, output } => cmd_resolve(config, category, id.as_deref(), output),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
