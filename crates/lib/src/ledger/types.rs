use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything one activation changed, and what it replaced.
///
/// The `new_*` maps say what the activation claimed; the `pre_activation_*`
/// maps say what was there before. An entity present in `new_*` but absent
/// from the matching `pre_activation_*` map did not exist before activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
  pub branch: String,
  /// Logical activation clock. Larger means activated later.
  pub timestamp: u64,
  pub package_name: String,
  pub package_path: String,

  pub new_aliases: BTreeMap<String, String>,
  pub new_env_vars: BTreeMap<String, String>,
  pub new_path_prepends: BTreeMap<String, Vec<String>>,
  pub new_path_postpends: BTreeMap<String, Vec<String>>,

  pub pre_activation_aliases: BTreeMap<String, String>,
  pub pre_activation_env_vars: BTreeMap<String, String>,
  pub pre_activation_path_vars: BTreeMap<String, String>,

  pub on_activate_commands: Vec<String>,
  pub on_deactivate_commands: Vec<String>,
}

impl BranchRecord {
  pub fn new(branch: impl Into<String>, package_name: impl Into<String>, package_path: impl Into<String>) -> Self {
    Self {
      branch: branch.into(),
      package_name: package_name.into(),
      package_path: package_path.into(),
      ..Self::default()
    }
  }

  /// True when this activation set alias `name` to exactly `value`.
  pub fn claims_alias(&self, name: &str, value: &str) -> bool {
    self.new_aliases.get(name).is_some_and(|v| v == value)
  }

  /// True when this activation set variable `name` to exactly `value`.
  pub fn claims_env_var(&self, name: &str, value: &str) -> bool {
    self.new_env_vars.get(name).is_some_and(|v| v == value)
  }

  /// True when this activation added `entry` to path variable `var`.
  pub fn claims_path_entry(&self, var: &str, entry: &str) -> bool {
    self.added_path_entries(var).any(|e| e == entry)
  }

  /// Entries this activation added to `var`, prepends first.
  pub fn added_path_entries<'a>(&'a self, var: &str) -> impl Iterator<Item = &'a str> + 'a {
    let prepends = self.new_path_prepends.get(var).into_iter().flatten();
    let postpends = self.new_path_postpends.get(var).into_iter().flatten();
    prepends.chain(postpends).map(String::as_str)
  }

  /// Path variables this activation touched, in name order.
  pub fn path_vars(&self) -> Vec<&str> {
    let mut vars: Vec<&str> = self
      .new_path_prepends
      .keys()
      .chain(self.new_path_postpends.keys())
      .map(String::as_str)
      .collect();
    vars.sort_unstable();
    vars.dedup();
    vars
  }
}

/// A branch listed in the ledger index whose record could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamagedBranch {
  pub branch: String,
  pub timestamp: u64,
  pub package_name: String,
  pub package_path: String,
  pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
  #[error("branch '{0}' is already active")]
  DuplicateBranch(String),

  #[error("branch '{0}' is not active")]
  UnknownBranch(String),

  #[error("ledger record for branch '{branch}' cannot be stored or read: {message}")]
  Serialization { branch: String, message: String },
}
