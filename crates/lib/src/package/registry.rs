//! Name → file lookup for packages.
//!
//! An external setup step scans the package search paths and exports the
//! result as `USE_PKG_PACKAGES=name@path:name@path:...`. This module only reads
//! that list; it never walks the filesystem itself.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::PackageError;
use crate::consts::{PACKAGE_EXTENSION, PATH_LIST_SEPARATOR};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRegistry {
  entries: BTreeMap<String, PathBuf>,
}

impl PackageRegistry {
  /// Parse a `name@path` list. Malformed items are skipped; the first
  /// occurrence of a name wins.
  pub fn parse(raw: &str) -> Self {
    let mut entries = BTreeMap::new();

    for item in raw.split(PATH_LIST_SEPARATOR).filter(|item| !item.is_empty()) {
      match item.split_once('@') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
          entries.entry(name.to_string()).or_insert_with(|| PathBuf::from(path));
        }
        _ => warn!(item, "skipping malformed package registry entry"),
      }
    }

    Self { entries }
  }

  pub fn get(&self, name: &str) -> Option<&Path> {
    self.entries.get(name).map(PathBuf::as_path)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Turn a command-line argument into a package `(name, path)`.
///
/// An argument naming an existing file is used directly and named after its
/// stem; anything else is looked up in the registry.
pub fn resolve_package(arg: &str, registry: &PackageRegistry) -> Result<(String, PathBuf), PackageError> {
  let candidate = Path::new(arg);
  if candidate.is_file() {
    let path = dunce::canonicalize(candidate).map_err(|source| PackageError::Read {
      path: candidate.to_path_buf(),
      source,
    })?;
    let name = package_name_from_path(&path);
    debug!(name = %name, path = %path.display(), "resolved package from file");
    return Ok((name, path));
  }

  match registry.get(arg) {
    Some(path) => {
      debug!(name = arg, path = %path.display(), "resolved package from registry");
      Ok((arg.to_string(), path.to_path_buf()))
    }
    None => Err(PackageError::NotFound(arg.to_string())),
  }
}

fn package_name_from_path(path: &Path) -> String {
  let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
  if path.extension().is_some_and(|ext| ext == PACKAGE_EXTENSION) {
    stem
  } else {
    path
      .file_name()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or(stem)
  }
}
