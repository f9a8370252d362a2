//! One invocation's complete output.
//!
//! A [`Transaction`] pairs the directives that change the shell with the
//! directives that persist the new ledger. It is built only after planning
//! has succeeded, and rendered as a single script: state changes, then
//! package commands, then the ledger. If the shell stops part way through,
//! the ledger has not yet claimed anything.

use tracing::debug;

use crate::directive::Directive;
use crate::ledger::{LedgerError, LedgerStore, ledger_directives};
use crate::plan::Activation;
use crate::reconcile::Deactivation;
use crate::shell::Shell;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
  /// Planner output in order: state changes and package commands.
  changes: Vec<Directive>,
  /// Ledger persistence, always emitted last.
  ledger_updates: Vec<Directive>,
}

impl Transaction {
  /// Build a transaction moving the ledger from `before` to `after`.
  pub fn commit(before: &LedgerStore, after: &LedgerStore, changes: Vec<Directive>) -> Result<Self, LedgerError> {
    let ledger_updates = ledger_directives(before, after)?;
    debug!(
      changes = changes.len(),
      ledger_updates = ledger_updates.len(),
      "committed transaction"
    );
    Ok(Self {
      changes,
      ledger_updates,
    })
  }

  pub fn for_activation(before: &LedgerStore, activation: &Activation) -> Result<Self, LedgerError> {
    Self::commit(before, &activation.ledger, activation.directives.clone())
  }

  pub fn for_deactivation(before: &LedgerStore, deactivation: &Deactivation) -> Result<Self, LedgerError> {
    Self::commit(before, &deactivation.ledger, deactivation.directives.clone())
  }

  /// Drop `branch` from the ledger without touching anything else.
  pub fn forget(before: &LedgerStore, branch: &str) -> Result<Self, LedgerError> {
    let mut after = before.clone();
    after.discard(branch)?;
    Self::commit(before, &after, Vec::new())
  }

  pub fn is_empty(&self) -> bool {
    self.changes.is_empty() && self.ledger_updates.is_empty()
  }

  pub fn changes(&self) -> &[Directive] {
    &self.changes
  }

  pub fn ledger_updates(&self) -> &[Directive] {
    &self.ledger_updates
  }

  /// All directives in emission order.
  pub fn directives(&self) -> impl Iterator<Item = &Directive> {
    self.changes.iter().chain(self.ledger_updates.iter())
  }

  /// Render the whole transaction as one script for `shell`.
  pub fn script(&self, shell: Shell) -> String {
    let all: Vec<Directive> = self.directives().cloned().collect();
    shell.render_script(&all)
  }
}
