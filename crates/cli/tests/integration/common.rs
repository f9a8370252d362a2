//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated package tree.
///
/// Packages are installed the way a studio lays them out,
/// `<app>/<version>/wrapper/<app>.use`, so `$VERSION` and friends resolve.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Root of the package tree, canonicalized.
  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Copy a fixture into the tree and return the package file path.
  pub fn install(&self, fixture: &str, version: &str) -> PathBuf {
    let app = fixture.trim_end_matches(".use");
    let dir = self.root().join(app).join(version).join("wrapper");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(fixture);
    std::fs::write(&path, fixture_content(fixture)).unwrap();
    path
  }

  /// Value for `USE_PKG_PACKAGES` registering the given packages.
  pub fn registry(&self, entries: &[(&str, &PathBuf)]) -> String {
    entries
      .iter()
      .map(|(name, path)| format!("{}@{}", name, path.display()))
      .collect::<Vec<_>>()
      .join(":")
  }

  /// Get a pre-configured Command for the usepkg binary, emitting bash.
  pub fn usepkg_cmd(&self) -> Command {
    self.usepkg_cmd_for("bash")
  }

  /// Get a pre-configured Command for the usepkg binary.
  ///
  /// Clears any ledger or settings inherited from the test runner's shell and
  /// pins the output dialect to `shell`.
  pub fn usepkg_cmd_for(&self, shell: &str) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("usepkg");
    for (name, _) in std::env::vars() {
      if name.starts_with("USE_") {
        cmd.env_remove(&name);
      }
    }
    cmd.env_remove("TOOLPATH");
    cmd.args(["--shell", shell]);
    cmd
  }
}
