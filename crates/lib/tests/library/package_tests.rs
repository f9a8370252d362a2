use serial_test::serial;
use usepkg_lib::config::Settings;
use usepkg_lib::consts::{AUTO_VERSION_OFFSET_VAR, PACKAGES_VAR};
use usepkg_lib::package::{PackageError, open_package};

use super::common::PackageTree;

const CLARISSE: &str = r#"
[branch]
clarisse

[alias]
clarisse=$VERSION_PATH/bin/clarisse

[env]
CLARISSE_HOME=$PRE_VERSION_PATH
CLARISSE_WRAPPER=$USE_PKG_PATH

[path-prepend-PATH]
$VERSION_PATH/bin
"#;

#[test]
#[serial]
fn opens_package_registered_by_name() {
  let tree = PackageTree::new();
  let path = tree.write("clarisse", "4.0sp2", CLARISSE);
  let registry = format!("clarisse-4.0sp2@{}", path.display());

  temp_env::with_vars(
    [(PACKAGES_VAR, Some(registry.as_str())), (AUTO_VERSION_OFFSET_VAR, None)],
    || {
      let settings = Settings::from_env().unwrap();
      let def = open_package("clarisse-4.0sp2", &settings).unwrap();

      let version_path = tree.root().join("clarisse").join("4.0sp2");
      assert_eq!(def.name, "clarisse-4.0sp2");
      assert_eq!(def.branch, "clarisse");
      assert_eq!(
        def.aliases["clarisse"],
        format!("{}/bin/clarisse", version_path.display())
      );
      assert_eq!(
        def.env_vars["CLARISSE_HOME"],
        tree.root().join("clarisse").display().to_string()
      );
      assert_eq!(
        def.env_vars["CLARISSE_WRAPPER"],
        version_path.join("wrapper").display().to_string()
      );
    },
  );
}

#[test]
#[serial]
fn offset_from_environment_moves_version_path() {
  let tree = PackageTree::new();
  let path = tree.write("clarisse", "4.0sp2", CLARISSE);

  temp_env::with_vars(
    [(AUTO_VERSION_OFFSET_VAR, Some("-1")), (PACKAGES_VAR, None)],
    || {
      let settings = Settings::from_env().unwrap();
      let def = open_package(path.to_str().unwrap(), &settings).unwrap();

      // one level up from the file is the wrapper directory itself
      assert_eq!(def.name, "clarisse");
      assert!(def.aliases["clarisse"].ends_with("/4.0sp2/wrapper/bin/clarisse"));
    },
  );
}

#[test]
#[serial]
fn unknown_package_is_not_found() {
  temp_env::with_var(PACKAGES_VAR, None::<&str>, || {
    let settings = Settings::from_env().unwrap();
    let err = open_package("no-such-package-9.9", &settings).unwrap_err();
    assert!(matches!(err, PackageError::NotFound(ref name) if name == "no-such-package-9.9"));
  });
}

#[test]
fn malformed_package_reports_line() {
  let tree = PackageTree::new();
  let path = tree.write("broken", "1", "[branch]\nbroken\n[env]\nNO_EQUALS_SIGN\n");

  let err = open_package(path.to_str().unwrap(), &Settings::default()).unwrap_err();
  match err {
    PackageError::Malformed { issue, .. } => assert_eq!(issue.line(), Some(4)),
    other => panic!("expected malformed package, got {:?}", other),
  }
}
