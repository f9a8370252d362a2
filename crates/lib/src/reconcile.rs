//! Deactivation reconciler.
//!
//! Works out the smallest set of directives that undoes one activation while
//! leaving alone anything a later activation or the user has since changed.
//! The rules for a claimed alias or variable, first match wins:
//!
//! 1. gone from the live state: nothing to do
//! 2. live value differs from what this activation set: the user changed it
//! 3. a later activation set the same value: it owns the entity now
//! 4. otherwise restore the pre-activation value, or remove the entity if it
//!    did not exist before
//!
//! Path variables are reconciled entry by entry: an entry this activation
//! added is removed unless it was already there before activation or a later
//! activation also added it.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::directive::Directive;
use crate::ledger::{BranchRecord, LedgerError, LedgerStore};
use crate::state::{ShellState, join_path_list, split_path_list};

/// Everything needed to deactivate one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deactivation {
  /// The record that was removed.
  pub record: BranchRecord,
  /// Undo directives followed by the package's deactivation commands.
  pub directives: Vec<Directive>,
  /// The ledger with the record removed.
  pub ledger: LedgerStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarUndo<'a> {
  Keep(&'static str),
  Restore(&'a str),
  Remove,
}

fn undo_scalar<'a>(live: Option<&str>, claimed: &str, original: Option<&'a String>, claimed_later: bool) -> ScalarUndo<'a> {
  match live {
    None => ScalarUndo::Keep("no longer set"),
    Some(value) if value != claimed => ScalarUndo::Keep("changed since activation"),
    Some(_) if claimed_later => ScalarUndo::Keep("claimed by a later activation"),
    Some(value) => match original {
      Some(original) if original == value => ScalarUndo::Keep("already at pre-activation value"),
      Some(original) => ScalarUndo::Restore(original),
      None => ScalarUndo::Remove,
    },
  }
}

/// Plan the deactivation of `branch` against the live shell state.
///
/// Fails with [`LedgerError::UnknownBranch`] when the branch is not active and
/// with [`LedgerError::Serialization`] when its record could not be decoded.
pub fn plan_deactivation(branch: &str, ledger: &LedgerStore, live: &ShellState) -> Result<Deactivation, LedgerError> {
  let mut next = ledger.clone();
  let record = next.remove(branch)?;
  let later = ledger.subsequent_to(record.timestamp, &record.branch);

  let mut directives = Vec::new();

  for (name, claimed) in &record.new_aliases {
    let claimed_later = later.iter().any(|r| r.claims_alias(name, claimed));
    match undo_scalar(live.alias(name), claimed, record.pre_activation_aliases.get(name), claimed_later) {
      ScalarUndo::Keep(reason) => debug!(alias = %name, reason, "leaving alias"),
      ScalarUndo::Restore(value) => directives.push(Directive::set_alias(name, value)),
      ScalarUndo::Remove => directives.push(Directive::unset_alias(name)),
    }
  }

  for (name, claimed) in &record.new_env_vars {
    let claimed_later = later.iter().any(|r| r.claims_env_var(name, claimed));
    match undo_scalar(live.var(name), claimed, record.pre_activation_env_vars.get(name), claimed_later) {
      ScalarUndo::Keep(reason) => debug!(var = %name, reason, "leaving variable"),
      ScalarUndo::Restore(value) => directives.push(Directive::set_var(name, value)),
      ScalarUndo::Remove => directives.push(Directive::unset_var(name)),
    }
  }

  for var in record.path_vars() {
    if let Some(directive) = undo_path_var(var, &record, &later, live) {
      directives.push(directive);
    }
  }

  directives.extend(record.on_deactivate_commands.iter().map(Directive::run));

  info!(
    branch = %record.branch,
    package = %record.package_name,
    directives = directives.len(),
    "planned deactivation"
  );

  Ok(Deactivation {
    record,
    directives,
    ledger: next,
  })
}

fn undo_path_var(var: &str, record: &BranchRecord, later: &[&BranchRecord], live: &ShellState) -> Option<Directive> {
  let Some(entries) = live.path_entries(var) else {
    debug!(var, "path variable no longer set");
    return None;
  };

  let original: HashSet<String> = record
    .pre_activation_path_vars
    .get(var)
    .map(|value| split_path_list(value).into_iter().collect())
    .unwrap_or_default();

  let removable: HashSet<&str> = record
    .added_path_entries(var)
    .filter(|entry| !original.contains(*entry))
    .filter(|entry| !later.iter().any(|r| r.claims_path_entry(var, entry)))
    .collect();

  let kept: Vec<&str> = entries
    .iter()
    .map(String::as_str)
    .filter(|entry| !removable.contains(entry))
    .collect();

  if kept.len() == entries.len() {
    debug!(var, "no path entries to remove");
    return None;
  }

  if kept.is_empty() {
    Some(Directive::unset_var(var))
  } else {
    Some(Directive::set_var(var, join_path_list(&kept)))
  }
}
