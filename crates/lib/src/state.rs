//! Snapshot of the live shell state.
//!
//! The planner and reconciler never read the process environment directly.
//! They receive a [`ShellState`] sampled once at the start of an invocation,
//! which keeps both of them pure and lets tests drive whole sessions without a
//! real shell: [`ShellState::apply`] simulates what the shell does when it
//! evaluates a [`Directive`].

use std::collections::BTreeMap;

use tracing::debug;

use crate::consts::PATH_LIST_SEPARATOR;
use crate::directive::Directive;
use crate::shell::Shell;

/// Split a path-list value into its entries, dropping empty segments.
pub fn split_path_list(value: &str) -> Vec<String> {
  value
    .split(PATH_LIST_SEPARATOR)
    .filter(|entry| !entry.is_empty())
    .map(str::to_string)
    .collect()
}

/// Join path entries back into a single delimited value.
pub fn join_path_list<S: AsRef<str>>(entries: &[S]) -> String {
  entries
    .iter()
    .map(|entry| entry.as_ref())
    .collect::<Vec<&str>>()
    .join(PATH_LIST_SEPARATOR.to_string().as_str())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
  aliases: BTreeMap<String, String>,
  vars: BTreeMap<String, String>,
}

impl ShellState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sample the state of the calling shell.
  ///
  /// Variables come from this process's environment, which the shell exported
  /// to us. Aliases are not inherited by child processes, so the shell wrapper
  /// pipes the output of its `alias` builtin in as `alias_listing`.
  /// Variables whose name or value is not UTF-8 are skipped.
  pub fn from_process(alias_listing: &str, shell: Shell) -> Self {
    let vars = std::env::vars_os()
      .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
        (Ok(name), Ok(value)) => Some((name, value)),
        (name, _) => {
          debug!(var = ?name, "skipping non UTF-8 environment variable");
          None
        }
      })
      .collect();
    Self {
      aliases: shell.parse_aliases(alias_listing),
      vars,
    }
  }

  pub fn with_alias(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.aliases.insert(name.into(), value.into());
    self
  }

  pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.vars.insert(name.into(), value.into());
    self
  }

  pub fn alias(&self, name: &str) -> Option<&str> {
    self.aliases.get(name).map(String::as_str)
  }

  pub fn var(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(String::as_str)
  }

  pub fn aliases(&self) -> &BTreeMap<String, String> {
    &self.aliases
  }

  pub fn vars(&self) -> &BTreeMap<String, String> {
    &self.vars
  }

  /// Entries of a path-list variable, or `None` when the variable is unset.
  pub fn path_entries(&self, name: &str) -> Option<Vec<String>> {
    self.var(name).map(split_path_list)
  }

  /// Apply a directive the way the shell would when evaluating it.
  ///
  /// `Run` directives are opaque and leave the tables untouched.
  pub fn apply(&mut self, directive: &Directive) {
    match directive {
      Directive::SetAlias { name, value } => {
        self.aliases.insert(name.clone(), value.clone());
      }
      Directive::UnsetAlias { name } => {
        self.aliases.remove(name);
      }
      Directive::SetVar { name, value } => {
        self.vars.insert(name.clone(), value.clone());
      }
      Directive::UnsetVar { name } => {
        self.vars.remove(name);
      }
      Directive::Run { .. } => {}
    }
  }

  pub fn apply_all<'a>(&mut self, directives: impl IntoIterator<Item = &'a Directive>) {
    for directive in directives {
      self.apply(directive);
    }
  }
}
