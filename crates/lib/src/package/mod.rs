//! Package definitions.
//!
//! A package is an INI-style `.use` file describing the aliases, variables,
//! path entries and commands to apply when it is activated. This module turns
//! one into a [`PackageDef`]; it does not decide what to do with it.

mod parse;
mod registry;
mod types;
mod vars;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::Settings;

pub use parse::parse_package;
pub use registry::{PackageRegistry, resolve_package};
pub use types::*;
pub use vars::BuiltinVars;

/// Read and parse the package file at `path`.
pub fn load_package(name: &str, path: &Path, settings: &Settings) -> Result<PackageDef, PackageError> {
  let text = fs::read_to_string(path).map_err(|source| PackageError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let vars = BuiltinVars::from_package_path(path, settings.auto_version_offset);
  let def = parse_package(&text, name, path.to_path_buf(), &vars).map_err(|issue| PackageError::Malformed {
    path: path.to_path_buf(),
    issue,
  })?;

  info!(
    package = %def.name,
    branch = %def.branch,
    aliases = def.aliases.len(),
    env_vars = def.env_vars.len(),
    path_vars = def.path_vars.len(),
    "loaded package"
  );

  Ok(def)
}

/// Resolve a command-line argument to a package and load it.
pub fn open_package(arg: &str, settings: &Settings) -> Result<PackageDef, PackageError> {
  let (name, path) = resolve_package(arg, &settings.packages)?;
  load_package(&name, &path, settings)
}
