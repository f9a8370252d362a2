//! Ledger persistence in the shell environment.
//!
//! The ledger lives in the session it describes, so that closing the shell
//! forgets it. `USE_BRANCHES` lists the active branches in activation order as
//! `branch,package,path` triples joined by `:`. Each branch then owns one
//! variable per record field, named `USE_<BRANCH>_<FIELD>`, holding JSON.
//!
//! Timestamps are not stored: a branch's position in `USE_BRANCHES` is its
//! place on the activation clock.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::store::LedgerStore;
use super::types::{BranchRecord, DamagedBranch, LedgerError};
use crate::consts::{BRANCHES_VAR, LEDGER_VAR_PREFIX};
use crate::directive::Directive;
use crate::state::ShellState;

const INDEX_SEPARATOR: char = ':';
const TRIPLE_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
  NewAliases,
  NewEnvVars,
  NewPathPrepends,
  NewPathPostpends,
  OriginalAliases,
  OriginalEnvVars,
  OriginalPathVars,
  UseShellCmds,
  UnuseShellCmds,
}

impl RecordField {
  pub const ALL: [RecordField; 9] = [
    RecordField::NewAliases,
    RecordField::NewEnvVars,
    RecordField::NewPathPrepends,
    RecordField::NewPathPostpends,
    RecordField::OriginalAliases,
    RecordField::OriginalEnvVars,
    RecordField::OriginalPathVars,
    RecordField::UseShellCmds,
    RecordField::UnuseShellCmds,
  ];

  pub fn suffix(&self) -> &'static str {
    match self {
      RecordField::NewAliases => "NEW_ALIASES",
      RecordField::NewEnvVars => "NEW_ENV_VARS",
      RecordField::NewPathPrepends => "NEW_PATH_PREPENDS",
      RecordField::NewPathPostpends => "NEW_PATH_POSTPENDS",
      RecordField::OriginalAliases => "ORIGINAL_ALIASES",
      RecordField::OriginalEnvVars => "ORIGINAL_ENV_VARS",
      RecordField::OriginalPathVars => "ORIGINAL_PATH_VARS",
      RecordField::UseShellCmds => "USE_SHELL_CMDS",
      RecordField::UnuseShellCmds => "UNUSE_SHELL_CMDS",
    }
  }
}

/// Name of the environment variable holding `field` for `branch`.
pub fn field_var(branch: &str, field: RecordField) -> String {
  format!("{}{}_{}", LEDGER_VAR_PREFIX, branch.to_ascii_uppercase(), field.suffix())
}

/// Decode the ledger from a session's variables.
///
/// Never fails as a whole. A record whose variables cannot be decoded is kept
/// as a damaged entry so the other branches stay usable; index items that do
/// not even name a branch are skipped with a warning.
pub fn load_ledger(state: &ShellState) -> LedgerStore {
  let mut store = LedgerStore::new();
  let Some(index) = state.var(BRANCHES_VAR) else {
    return store;
  };

  let mut timestamp = 0;
  for item in index.split(INDEX_SEPARATOR).filter(|item| !item.is_empty()) {
    let mut parts = item.splitn(3, TRIPLE_SEPARATOR);
    let branch = parts.next().unwrap_or_default();
    let package_name = parts.next().unwrap_or_default();
    let package_path = parts.next().unwrap_or_default();

    if branch.is_empty() {
      warn!(item, "skipping ledger index entry without a branch");
      continue;
    }
    if store.contains(branch) {
      warn!(branch, "skipping repeated ledger index entry");
      continue;
    }

    timestamp += 1;
    match decode_record(state, branch, package_name, package_path, timestamp) {
      Ok(record) => {
        // contains() was checked above, so this cannot collide
        let _ = store.append(record);
      }
      Err(error) => {
        warn!(branch, error = %error, "ledger record is damaged");
        store.insert_damaged(DamagedBranch {
          branch: branch.to_string(),
          timestamp,
          package_name: package_name.to_string(),
          package_path: package_path.to_string(),
          error,
        });
      }
    }
  }

  debug!(branches = store.len(), "loaded ledger");
  store
}

fn decode_record(
  state: &ShellState,
  branch: &str,
  package_name: &str,
  package_path: &str,
  timestamp: u64,
) -> Result<BranchRecord, String> {
  let mut record = BranchRecord::new(branch, package_name, package_path);
  record.timestamp = timestamp;
  record.new_aliases = read_field(state, branch, RecordField::NewAliases)?;
  record.new_env_vars = read_field(state, branch, RecordField::NewEnvVars)?;
  record.new_path_prepends = read_field(state, branch, RecordField::NewPathPrepends)?;
  record.new_path_postpends = read_field(state, branch, RecordField::NewPathPostpends)?;
  record.pre_activation_aliases = read_field(state, branch, RecordField::OriginalAliases)?;
  record.pre_activation_env_vars = read_field(state, branch, RecordField::OriginalEnvVars)?;
  record.pre_activation_path_vars = read_field(state, branch, RecordField::OriginalPathVars)?;
  record.on_activate_commands = read_field(state, branch, RecordField::UseShellCmds)?;
  record.on_deactivate_commands = read_field(state, branch, RecordField::UnuseShellCmds)?;
  Ok(record)
}

/// A missing variable decodes as an empty value.
fn read_field<T: DeserializeOwned + Default>(state: &ShellState, branch: &str, field: RecordField) -> Result<T, String> {
  let name = field_var(branch, field);
  match state.var(&name) {
    None => Ok(T::default()),
    Some(raw) => serde_json::from_str(raw).map_err(|e| format!("{}: {}", name, e)),
  }
}

fn encode_field<T: Serialize>(branch: &str, value: &T) -> Result<String, LedgerError> {
  serde_json::to_string(value).map_err(|e| LedgerError::Serialization {
    branch: branch.to_string(),
    message: e.to_string(),
  })
}

fn field_directives(record: &BranchRecord) -> Result<Vec<Directive>, LedgerError> {
  let branch = record.branch.as_str();
  let mut out = Vec::with_capacity(RecordField::ALL.len());
  for field in RecordField::ALL {
    let value = match field {
      RecordField::NewAliases => encode_field(branch, &record.new_aliases)?,
      RecordField::NewEnvVars => encode_field(branch, &record.new_env_vars)?,
      RecordField::NewPathPrepends => encode_field(branch, &record.new_path_prepends)?,
      RecordField::NewPathPostpends => encode_field(branch, &record.new_path_postpends)?,
      RecordField::OriginalAliases => encode_field(branch, &record.pre_activation_aliases)?,
      RecordField::OriginalEnvVars => encode_field(branch, &record.pre_activation_env_vars)?,
      RecordField::OriginalPathVars => encode_field(branch, &record.pre_activation_path_vars)?,
      RecordField::UseShellCmds => encode_field(branch, &record.on_activate_commands)?,
      RecordField::UnuseShellCmds => encode_field(branch, &record.on_deactivate_commands)?,
    };
    out.push(Directive::set_var(field_var(branch, field), value));
  }
  Ok(out)
}

fn check_index_part(branch: &str, what: &str, value: &str) -> Result<(), LedgerError> {
  if value.contains(INDEX_SEPARATOR) || value.contains(TRIPLE_SEPARATOR) {
    return Err(LedgerError::Serialization {
      branch: branch.to_string(),
      message: format!("{} '{}' contains ':' or ','", what, value),
    });
  }
  Ok(())
}

fn encode_index(store: &LedgerStore) -> Result<String, LedgerError> {
  let mut items = Vec::with_capacity(store.len());
  for entry in store.entries() {
    let branch = entry.branch();
    check_index_part(branch, "branch", branch)?;
    check_index_part(branch, "package name", entry.package_name())?;
    check_index_part(branch, "package path", entry.package_path())?;
    items.push(format!(
      "{}{sep}{}{sep}{}",
      branch,
      entry.package_name(),
      entry.package_path(),
      sep = TRIPLE_SEPARATOR
    ));
  }
  Ok(items.join(&INDEX_SEPARATOR.to_string()))
}

/// Directives that turn the persisted form of `before` into that of `after`.
///
/// Only branches that were added, removed or changed are written, and
/// `USE_BRANCHES` is touched only when the branch list itself changed.
pub fn ledger_directives(before: &LedgerStore, after: &LedgerStore) -> Result<Vec<Directive>, LedgerError> {
  let mut out = Vec::new();

  for entry in before.entries() {
    if !after.contains(entry.branch()) {
      for field in RecordField::ALL {
        out.push(Directive::unset_var(field_var(entry.branch(), field)));
      }
    }
  }

  for record in after.records() {
    if before.find(&record.branch) != Some(record) {
      out.extend(field_directives(record)?);
    }
  }

  let after_index = encode_index(after)?;
  let before_index = encode_index(before).ok();
  if before_index.as_deref() != Some(after_index.as_str()) {
    if after.is_empty() {
      out.push(Directive::unset_var(BRANCHES_VAR));
    } else {
      out.push(Directive::set_var(BRANCHES_VAR, after_index));
    }
  }

  Ok(out)
}
