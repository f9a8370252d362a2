use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Prepend and postpend entries a package declares for one path variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathEdits {
  pub prepend: Vec<String>,
  pub postpend: Vec<String>,
}

impl PathEdits {
  pub fn is_empty(&self) -> bool {
    self.prepend.is_empty() && self.postpend.is_empty()
  }
}

/// A parsed package file with built-in variables already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDef {
  pub name: String,
  pub path: PathBuf,
  pub branch: String,
  pub aliases: BTreeMap<String, String>,
  pub env_vars: BTreeMap<String, String>,
  pub path_vars: BTreeMap<String, PathEdits>,
  pub use_cmds: Vec<String>,
  pub unuse_cmds: Vec<String>,
}

/// What is wrong with a package file, and where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
  #[error("line {line}: {message}")]
  AtLine { line: usize, message: String },

  /// A problem with the file as a whole.
  #[error("{0}")]
  Whole(String),
}

impl ParseIssue {
  pub(crate) fn at(line: usize, message: impl Into<String>) -> Self {
    Self::AtLine {
      line,
      message: message.into(),
    }
  }

  pub(crate) fn whole(message: impl Into<String>) -> Self {
    Self::Whole(message.into())
  }

  /// 1-based line number, or `None` for problems with the file as a whole.
  pub fn line(&self) -> Option<usize> {
    match self {
      Self::AtLine { line, .. } => Some(*line),
      Self::Whole(_) => None,
    }
  }
}

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("failed to read package {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("malformed package definition {}: {issue}", path.display())]
  Malformed {
    path: PathBuf,
    #[source]
    issue: ParseIssue,
  },

  #[error("no package named '{0}'")]
  NotFound(String),
}
