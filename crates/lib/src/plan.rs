//! Activation planner.
//!
//! Turns a [`PackageDef`] into the directives that apply it and the
//! [`BranchRecord`] that will later let [`plan_deactivation`] undo it.

use tracing::{info, warn};

use crate::directive::Directive;
use crate::ledger::{BranchRecord, LedgerError, LedgerStore};
use crate::package::PackageDef;
use crate::reconcile::plan_deactivation;
use crate::state::{ShellState, join_path_list, split_path_list};

/// What to do when the package's branch is already active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reactivation {
  /// Deactivate the active branch first, then activate over the result.
  #[default]
  Unwind,
  /// Refuse with [`LedgerError::DuplicateBranch`].
  Reject,
}

/// Everything needed to activate one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
  /// The record appended to the ledger.
  pub record: BranchRecord,
  /// The record of the same branch that was deactivated first, if any.
  pub replaced: Option<BranchRecord>,
  /// Unwind directives (if any), then the new state, then activation commands.
  pub directives: Vec<Directive>,
  /// The ledger with the new record appended.
  pub ledger: LedgerStore,
}

/// Plan the activation of `package` against the live shell state.
pub fn plan_activation(
  package: &PackageDef,
  ledger: &LedgerStore,
  live: &ShellState,
  reactivation: Reactivation,
) -> Result<Activation, LedgerError> {
  let mut state = live.clone();
  let mut ledger = ledger.clone();
  let mut directives = Vec::new();
  let mut replaced = None;

  if ledger.contains(&package.branch) {
    if reactivation == Reactivation::Reject {
      return Err(LedgerError::DuplicateBranch(package.branch.clone()));
    }
    let unwind = match plan_deactivation(&package.branch, &ledger, &state) {
      Ok(unwind) => unwind,
      Err(err) => {
        warn!(branch = %package.branch, error = %err, "cannot unwind active branch");
        return Err(LedgerError::DuplicateBranch(package.branch.clone()));
      }
    };
    info!(branch = %package.branch, "deactivating branch before re-activation");
    state.apply_all(&unwind.directives);
    directives = unwind.directives;
    ledger = unwind.ledger;
    replaced = Some(unwind.record);
  }

  let mut record = BranchRecord::new(
    package.branch.as_str(),
    package.name.as_str(),
    package.path.to_string_lossy(),
  );
  record.timestamp = ledger.next_timestamp();

  for (name, value) in &package.aliases {
    if let Some(previous) = state.alias(name) {
      record.pre_activation_aliases.insert(name.clone(), previous.to_string());
    }
    record.new_aliases.insert(name.clone(), value.clone());
    directives.push(Directive::set_alias(name, value));
  }

  for (name, value) in &package.env_vars {
    if let Some(previous) = state.var(name) {
      record.pre_activation_env_vars.insert(name.clone(), previous.to_string());
    }
    record.new_env_vars.insert(name.clone(), value.clone());
    directives.push(Directive::set_var(name, value));
  }

  for (var, edits) in &package.path_vars {
    let prepend = dedup(edits.prepend.iter());
    let postpend = dedup(edits.postpend.iter().filter(|entry| !prepend.contains(*entry)));

    let previous = state.var(var);
    let remaining = previous
      .map(split_path_list)
      .unwrap_or_default()
      .into_iter()
      .filter(|entry| !prepend.contains(entry) && !postpend.contains(entry));

    let merged: Vec<String> = prepend.iter().cloned().chain(remaining).chain(postpend.iter().cloned()).collect();
    directives.push(Directive::set_var(var, join_path_list(&merged)));

    if let Some(previous) = previous {
      record.pre_activation_path_vars.insert(var.clone(), previous.to_string());
    }
    if !prepend.is_empty() {
      record.new_path_prepends.insert(var.clone(), prepend);
    }
    if !postpend.is_empty() {
      record.new_path_postpends.insert(var.clone(), postpend);
    }
  }

  record.on_activate_commands = package.use_cmds.clone();
  record.on_deactivate_commands = package.unuse_cmds.clone();
  directives.extend(package.use_cmds.iter().map(Directive::run));

  ledger.append(record.clone())?;

  info!(
    branch = %record.branch,
    package = %record.package_name,
    timestamp = record.timestamp,
    directives = directives.len(),
    "planned activation"
  );

  Ok(Activation {
    record,
    replaced,
    directives,
    ledger,
  })
}

/// Keep the first occurrence of each entry.
fn dedup<'a>(entries: impl Iterator<Item = &'a String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for entry in entries {
    if !out.contains(entry) {
      out.push(entry.clone());
    }
  }
  out
}
