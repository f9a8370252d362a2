//! Settings read from the environment.
//!
//! There is no config file: every knob is an environment variable so that a
//! site can set it once in a login profile.

use std::env;

use thiserror::Error;
use tracing::debug;

use crate::consts::{AUTO_VERSION_OFFSET_VAR, DEFAULT_AUTO_VERSION_OFFSET, PACKAGES_VAR};
use crate::package::PackageRegistry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{var} must be a non-zero integer, got '{value}'")]
  InvalidOffset { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  /// Number of parent directories between a package file and its version
  /// directory. Always positive; a negative value in the environment is
  /// treated by its absolute value.
  pub auto_version_offset: usize,

  /// Packages the `use` command can resolve by name.
  pub packages: PackageRegistry,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      auto_version_offset: DEFAULT_AUTO_VERSION_OFFSET,
      packages: PackageRegistry::default(),
    }
  }
}

impl Settings {
  pub fn from_env() -> Result<Self, ConfigError> {
    let auto_version_offset = match env::var(AUTO_VERSION_OFFSET_VAR) {
      Ok(raw) => parse_offset(&raw)?,
      Err(_) => DEFAULT_AUTO_VERSION_OFFSET,
    };

    let packages = env::var(PACKAGES_VAR)
      .map(|raw| PackageRegistry::parse(&raw))
      .unwrap_or_default();

    debug!(
      auto_version_offset,
      registered_packages = packages.len(),
      "loaded settings from environment"
    );

    Ok(Self {
      auto_version_offset,
      packages,
    })
  }
}

fn parse_offset(raw: &str) -> Result<usize, ConfigError> {
  let invalid = || ConfigError::InvalidOffset {
    var: AUTO_VERSION_OFFSET_VAR,
    value: raw.to_string(),
  };

  let offset: i64 = raw.trim().parse().map_err(|_| invalid())?;
  match usize::try_from(offset.unsigned_abs()) {
    Ok(0) | Err(_) => Err(invalid()),
    Ok(n) => Ok(n),
  }
}
