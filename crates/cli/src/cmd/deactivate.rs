//! Implementation of the `usepkg unuse` command.

use anyhow::{Context, Result};
use tracing::debug;

use usepkg_lib::config::Settings;
use usepkg_lib::ledger::{LedgerError, LedgerStore, load_ledger};
use usepkg_lib::package::open_package;
use usepkg_lib::reconcile::plan_deactivation;
use usepkg_lib::shell::Shell;
use usepkg_lib::transaction::Transaction;

use crate::input::sample_shell;
use crate::output::{print_directives, print_info, print_script, print_success, print_warning};

/// Execute the unuse command.
///
/// `target` may name an active branch, the package behind an active branch,
/// or a package whose definition names an active branch. When it matches
/// nothing the command warns, prints no script, and exits with status 1.
pub fn cmd_unuse(target: &str, shell: Shell, forget: bool, verbose: bool) -> Result<()> {
  let live = sample_shell(shell)?;
  let before = load_ledger(&live);

  let Some(branch) = resolve_branch(target, &before) else {
    print_warning(&format!("'{}' is not in use", target));
    std::process::exit(1);
  };

  if forget {
    let tx = Transaction::forget(&before, &branch).with_context(|| format!("Cannot forget branch '{}'", branch))?;
    print_script(&tx.script(shell))?;
    print_success(&format!("Forgot branch {}", branch));
    return Ok(());
  }

  let deactivation = match plan_deactivation(&branch, &before, &live) {
    Ok(deactivation) => deactivation,
    Err(err @ LedgerError::Serialization { .. }) => {
      return Err(err).with_context(|| {
        format!(
          "Cannot deactivate '{}'; run 'unuse --forget {}' to drop its record",
          branch, branch
        )
      });
    }
    Err(LedgerError::UnknownBranch(_)) => {
      print_warning(&format!("'{}' is not in use", target));
      std::process::exit(1);
    }
    Err(err) => return Err(err.into()),
  };

  let tx = Transaction::for_deactivation(&before, &deactivation)
    .with_context(|| format!("Cannot record deactivation of '{}'", branch))?;
  print_script(&tx.script(shell))?;

  if verbose {
    print_directives(tx.changes());
    print_info(&format!("{} ledger variables updated", tx.ledger_updates().len()));
  }
  print_success(&format!(
    "Stopped using {} ({})",
    deactivation.record.package_name, deactivation.record.branch
  ));

  Ok(())
}

/// Find the active branch `target` refers to.
fn resolve_branch(target: &str, ledger: &LedgerStore) -> Option<String> {
  if let Some(entry) = ledger.entries().into_iter().find(|e| e.branch().eq_ignore_ascii_case(target)) {
    return Some(entry.branch().to_string());
  }

  if let Some(branch) = ledger.branch_for_package(target) {
    debug!(arg = target, branch, "matched active package name");
    return Some(branch.to_string());
  }

  let settings = match Settings::from_env() {
    Ok(settings) => settings,
    Err(err) => {
      debug!(error = %err, "cannot read settings to resolve package");
      return None;
    }
  };

  match open_package(target, &settings) {
    Ok(def) if ledger.contains(&def.branch) => {
      debug!(arg = target, branch = %def.branch, "matched branch from package definition");
      Some(def.branch)
    }
    Ok(def) => {
      debug!(arg = target, branch = %def.branch, "package branch is not active");
      None
    }
    Err(err) => {
      debug!(arg = target, error = %err, "target is not a loadable package");
      None
    }
  }
}
