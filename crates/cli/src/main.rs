mod cmd;
mod input;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use usepkg_lib::plan::Reactivation;
use usepkg_lib::shell::Shell;

use crate::output::print_error;

/// usepkg - Activate and deactivate software packages in the current shell
#[derive(Parser)]
#[command(name = "usepkg")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Shell to emit commands for (detected from $SHELL if omitted)
  #[arg(long, global = true)]
  shell: Option<Shell>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Activate a package in the current shell
  Use {
    /// Package name from USE_PKG_PACKAGES, or a path to a .use file
    package: String,

    /// Fail instead of re-activating a branch that is already active
    #[arg(long)]
    no_reactivate: bool,
  },

  /// Deactivate a package in the current shell
  Unuse {
    /// Active branch, active package name, or package to read the branch from
    target: String,

    /// Drop the ledger record without undoing anything
    #[arg(long)]
    forget: bool,
  },

  /// List the packages active in the current shell
  Used {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Print the shell functions that connect usepkg to the shell
  Init,
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let shell = cli.shell.unwrap_or_else(Shell::detect);

  let result = match cli.command {
    Commands::Use {
      package,
      no_reactivate,
    } => {
      let reactivation = if no_reactivate {
        Reactivation::Reject
      } else {
        Reactivation::Unwind
      };
      cmd::cmd_use(&package, shell, reactivation, cli.verbose)
    }
    Commands::Unuse { target, forget } => cmd::cmd_unuse(&target, shell, forget, cli.verbose),
    Commands::Used { json } => cmd::cmd_used(cli.verbose, json),
    Commands::Init => cmd::cmd_init(shell),
  };

  if let Err(err) = result {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}
