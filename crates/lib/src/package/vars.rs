//! Built-in variables available inside package files.
//!
//! A package at `/opt/apps/clarisse/4.0sp2/wrapper/clarisse.use` with the
//! default offset of 2 sees:
//!
//! | Variable            | Value                                  |
//! |---------------------|----------------------------------------|
//! | `$USE_PKG_PATH`     | `/opt/apps/clarisse/4.0sp2/wrapper`    |
//! | `$VERSION_PATH`     | `/opt/apps/clarisse/4.0sp2`            |
//! | `$VERSION`          | `4.0sp2`                               |
//! | `$PRE_VERSION_PATH` | `/opt/apps/clarisse`                   |

use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinVars {
  pub use_pkg_path: String,
  pub version_path: String,
  pub version: String,
  pub pre_version_path: String,
}

impl BuiltinVars {
  pub fn from_package_path(path: &Path, offset: usize) -> Self {
    let mut version_path = path;
    for _ in 0..offset {
      version_path = version_path.parent().unwrap_or(version_path);
    }

    let display = |p: Option<&Path>| p.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();

    Self {
      use_pkg_path: display(path.parent()),
      version_path: version_path.to_string_lossy().into_owned(),
      version: display(version_path.file_name().map(Path::new)),
      pre_version_path: display(version_path.parent()),
    }
  }

  /// `(name, value)` pairs ordered longest name first, so `$VERSION` can never
  /// match the front of `$VERSION_PATH`.
  fn by_longest_name(&self) -> Vec<(&'static str, &str)> {
    let mut pairs = vec![
      ("VERSION", self.version.as_str()),
      ("USE_PKG_PATH", self.use_pkg_path.as_str()),
      ("VERSION_PATH", self.version_path.as_str()),
      ("PRE_VERSION_PATH", self.pre_version_path.as_str()),
    ];
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    pairs
  }

  pub fn substitute(&self, input: &str) -> String {
    if !input.contains('$') {
      return input.to_string();
    }
    let mut out = input.to_string();
    for (name, value) in self.by_longest_name() {
      out = out.replace(&format!("${}", name), value);
    }
    out
  }
}
