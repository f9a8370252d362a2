//! In-memory ledger of the branches active in one shell session.
//!
//! The store is loaded from the session's environment at the start of an
//! invocation (see [`codec`](super::codec)), mutated in memory by the planner
//! or reconciler, and written back as part of the emitted script.

use tracing::debug;

use super::types::{BranchRecord, DamagedBranch, LedgerError};

/// Branch names are compared ASCII case-insensitively because the
/// environment encoding upper-cases them into variable names.
fn same_branch(a: &str, b: &str) -> bool {
  a.eq_ignore_ascii_case(b)
}

/// One row of the ledger, decoded or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEntry<'a> {
  Intact(&'a BranchRecord),
  Damaged(&'a DamagedBranch),
}

impl<'a> LedgerEntry<'a> {
  pub fn branch(&self) -> &'a str {
    match self {
      LedgerEntry::Intact(r) => &r.branch,
      LedgerEntry::Damaged(d) => &d.branch,
    }
  }

  pub fn package_name(&self) -> &'a str {
    match self {
      LedgerEntry::Intact(r) => &r.package_name,
      LedgerEntry::Damaged(d) => &d.package_name,
    }
  }

  pub fn package_path(&self) -> &'a str {
    match self {
      LedgerEntry::Intact(r) => &r.package_path,
      LedgerEntry::Damaged(d) => &d.package_path,
    }
  }

  pub fn timestamp(&self) -> u64 {
    match self {
      LedgerEntry::Intact(r) => r.timestamp,
      LedgerEntry::Damaged(d) => d.timestamp,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerStore {
  /// Intact records, ordered by timestamp.
  records: Vec<BranchRecord>,
  /// Records listed in the index that failed to decode.
  damaged: Vec<DamagedBranch>,
}

impl LedgerStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.records.len() + self.damaged.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty() && self.damaged.is_empty()
  }

  pub fn contains(&self, branch: &str) -> bool {
    self.find(branch).is_some() || self.find_damaged(branch).is_some()
  }

  pub fn find(&self, branch: &str) -> Option<&BranchRecord> {
    self.records.iter().find(|r| same_branch(&r.branch, branch))
  }

  pub fn find_damaged(&self, branch: &str) -> Option<&DamagedBranch> {
    self.damaged.iter().find(|d| same_branch(&d.branch, branch))
  }

  pub fn records(&self) -> &[BranchRecord] {
    &self.records
  }

  /// All rows, intact and damaged, in activation order.
  pub fn entries(&self) -> Vec<LedgerEntry<'_>> {
    let mut entries: Vec<LedgerEntry<'_>> = self
      .records
      .iter()
      .map(LedgerEntry::Intact)
      .chain(self.damaged.iter().map(LedgerEntry::Damaged))
      .collect();
    entries.sort_by_key(|e| e.timestamp());
    entries
  }

  /// Branch of the most recent activation of `package_name`, if any.
  pub fn branch_for_package(&self, package_name: &str) -> Option<&str> {
    self
      .entries()
      .into_iter()
      .rev()
      .find(|e| e.package_name() == package_name)
      .map(|e| e.branch())
  }

  /// Clock value for the next activation.
  pub fn next_timestamp(&self) -> u64 {
    self.entries().last().map(|e| e.timestamp() + 1).unwrap_or(1)
  }

  /// Add a record. Fails if its branch is already active.
  pub fn append(&mut self, record: BranchRecord) -> Result<(), LedgerError> {
    if self.contains(&record.branch) {
      return Err(LedgerError::DuplicateBranch(record.branch));
    }
    debug!(branch = %record.branch, timestamp = record.timestamp, "appending ledger record");
    let pos = self.records.partition_point(|r| r.timestamp <= record.timestamp);
    self.records.insert(pos, record);
    Ok(())
  }

  /// Remove and return a branch's record.
  ///
  /// A branch whose record is damaged cannot be removed this way, since the
  /// caller would have nothing to reconcile against; use [`discard`](Self::discard).
  pub fn remove(&mut self, branch: &str) -> Result<BranchRecord, LedgerError> {
    if let Some(pos) = self.records.iter().position(|r| same_branch(&r.branch, branch)) {
      debug!(branch, "removing ledger record");
      return Ok(self.records.remove(pos));
    }
    match self.find_damaged(branch) {
      Some(d) => Err(LedgerError::Serialization {
        branch: d.branch.clone(),
        message: d.error.clone(),
      }),
      None => Err(LedgerError::UnknownBranch(branch.to_string())),
    }
  }

  /// Drop a branch from the ledger without reconciling it.
  pub fn discard(&mut self, branch: &str) -> Result<(), LedgerError> {
    let before = self.len();
    self.records.retain(|r| !same_branch(&r.branch, branch));
    self.damaged.retain(|d| !same_branch(&d.branch, branch));
    if self.len() == before {
      return Err(LedgerError::UnknownBranch(branch.to_string()));
    }
    debug!(branch, "discarded ledger record");
    Ok(())
  }

  /// Intact records activated strictly after `timestamp`, other than `excluding`.
  pub fn subsequent_to(&self, timestamp: u64, excluding: &str) -> Vec<&BranchRecord> {
    self
      .records
      .iter()
      .filter(|r| r.timestamp > timestamp && !same_branch(&r.branch, excluding))
      .collect()
  }

  pub(crate) fn insert_damaged(&mut self, damaged: DamagedBranch) {
    self.damaged.push(damaged);
  }
}
