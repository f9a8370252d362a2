//! Implementation of the `usepkg use` command.
//!
//! Loads a package, plans its activation against the calling shell, and
//! prints the resulting script for the shell wrapper to evaluate.

use anyhow::{Context, Result};

use usepkg_lib::config::Settings;
use usepkg_lib::ledger::load_ledger;
use usepkg_lib::package::open_package;
use usepkg_lib::plan::{Reactivation, plan_activation};
use usepkg_lib::shell::Shell;
use usepkg_lib::transaction::Transaction;

use crate::input::sample_shell;
use crate::output::{print_directives, print_info, print_script, print_success, symbols};

/// Execute the use command.
///
/// Nothing is written to stdout unless planning succeeds, so a failed
/// activation leaves the shell untouched.
pub fn cmd_use(package: &str, shell: Shell, reactivation: Reactivation, verbose: bool) -> Result<()> {
  let settings = Settings::from_env().context("Invalid usepkg settings")?;
  let def = open_package(package, &settings).with_context(|| format!("Failed to load package '{}'", package))?;

  let live = sample_shell(shell)?;
  let before = load_ledger(&live);

  let activation = plan_activation(&def, &before, &live, reactivation)
    .with_context(|| format!("Cannot activate '{}'", def.name))?;
  let tx = Transaction::for_activation(&before, &activation)
    .with_context(|| format!("Cannot record activation of '{}'", def.name))?;

  print_script(&tx.script(shell))?;

  if let Some(replaced) = &activation.replaced {
    print_info(&format!(
      "Replaced {} on branch {}",
      replaced.package_name, replaced.branch
    ));
  }
  if verbose {
    print_directives(tx.changes());
    print_info(&format!("{} ledger variables updated", tx.ledger_updates().len()));
  }
  print_success(&format!("Using {} {} {}", def.name, symbols::ARROW, def.branch));

  Ok(())
}
