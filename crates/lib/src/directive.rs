//! Shell-independent instructions produced by the planner and reconciler.
//!
//! A [`Directive`] says *what* should happen to the live shell; the
//! [`Shell`](crate::shell::Shell) emitter decides how that is spelled for a
//! particular dialect.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Directive {
  SetAlias { name: String, value: String },
  UnsetAlias { name: String },
  SetVar { name: String, value: String },
  UnsetVar { name: String },
  /// A raw command line from a package, passed through untouched.
  Run { command: String },
}

impl Directive {
  pub fn set_alias(name: impl Into<String>, value: impl Into<String>) -> Self {
    Directive::SetAlias {
      name: name.into(),
      value: value.into(),
    }
  }

  pub fn unset_alias(name: impl Into<String>) -> Self {
    Directive::UnsetAlias { name: name.into() }
  }

  pub fn set_var(name: impl Into<String>, value: impl Into<String>) -> Self {
    Directive::SetVar {
      name: name.into(),
      value: value.into(),
    }
  }

  pub fn unset_var(name: impl Into<String>) -> Self {
    Directive::UnsetVar { name: name.into() }
  }

  pub fn run(command: impl Into<String>) -> Self {
    Directive::Run {
      command: command.into(),
    }
  }
}

impl fmt::Display for Directive {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Directive::SetAlias { name, value } => write!(f, "set alias {} = {:?}", name, value),
      Directive::UnsetAlias { name } => write!(f, "unset alias {}", name),
      Directive::SetVar { name, value } => write!(f, "set var {} = {:?}", name, value),
      Directive::UnsetVar { name } => write!(f, "unset var {}", name),
      Directive::Run { command } => write!(f, "run {:?}", command),
    }
  }
}
