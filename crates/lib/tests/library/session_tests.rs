use usepkg_lib::consts::BRANCHES_VAR;
use usepkg_lib::directive::Directive;
use usepkg_lib::ledger::LedgerError;
use usepkg_lib::plan::Reactivation;
use usepkg_lib::state::ShellState;

use super::common::{PackageTree, Session, path_package};

#[test]
fn path_entries_stack_and_unwind_in_any_order() {
  let tree = PackageTree::new();
  let a = path_package(&tree, "A", "/opt/A/bin");
  let b = path_package(&tree, "B", "/opt/B/bin");
  let mut session = Session::with_path("/usr/bin");

  session.use_pkg(&a).unwrap();
  assert_eq!(session.var("PATH"), Some("/opt/A/bin:/usr/bin"));

  session.use_pkg(&b).unwrap();
  assert_eq!(session.var("PATH"), Some("/opt/B/bin:/opt/A/bin:/usr/bin"));

  session.unuse("A").unwrap();
  assert_eq!(session.var("PATH"), Some("/opt/B/bin:/usr/bin"));

  session.unuse("B").unwrap();
  assert_eq!(session.var("PATH"), Some("/usr/bin"));
}

#[test]
fn use_then_unuse_restores_everything() {
  let tree = PackageTree::new();
  let pkg = tree.load(
    "maya",
    "2024",
    r#"
[branch]
maya

[alias]
maya=$VERSION_PATH/bin/maya
ll=ls -l

[env]
MAYA_VERSION=$VERSION
EDITOR=nano

[path-prepend-PATH]
$VERSION_PATH/bin

[path-postpend-PYTHONPATH]
$VERSION_PATH/python

[unuse-shell-cmds]
echo bye
"#,
  );

  let mut session = Session::new(
    ShellState::new()
      .with_var("PATH", "/usr/bin:/bin")
      .with_var("EDITOR", "vi")
      .with_alias("ll", "ls -la"),
  );
  let before = session.state.clone();

  session.use_pkg(&pkg).unwrap();
  assert_eq!(session.var("MAYA_VERSION"), Some("2024"));
  assert_eq!(session.var("EDITOR"), Some("nano"));
  assert_eq!(session.alias("ll"), Some("ls -l"));
  assert!(session.var(BRANCHES_VAR).is_some());

  session.unuse("maya").unwrap();
  assert_eq!(session.state, before);
}

#[test]
fn unuse_leaves_manual_edits_alone() {
  let tree = PackageTree::new();
  let pkg = tree.load("nuke", "15.0", "[branch]\nnuke\n[alias]\nnuke=/opt/nuke/bin/nuke\n[env]\nNUKE_PATH=/opt/nuke/plugins\n");
  let mut session = Session::with_path("/usr/bin");

  session.use_pkg(&pkg).unwrap();
  session.state.apply(&Directive::set_var("NUKE_PATH", "/home/me/plugins"));

  session.unuse("nuke").unwrap();
  assert_eq!(session.var("NUKE_PATH"), Some("/home/me/plugins"));
  assert_eq!(session.alias("nuke"), None);
}

#[test]
fn later_activation_keeps_its_claims() {
  let tree = PackageTree::new();
  let first = tree.load("studio", "1", "[branch]\nstudio\n[env]\nSTUDIO_ROOT=/studio\n[alias]\nrender=/studio/render\n");
  let second = tree.load("shot", "1", "[branch]\nshot\n[env]\nSTUDIO_ROOT=/studio\n[alias]\nrender=/shot/render\n");
  let mut session = Session::with_path("/usr/bin");

  session.use_pkg(&first).unwrap();
  session.use_pkg(&second).unwrap();
  session.unuse("studio").unwrap();

  // same value claimed later: kept; different value: already overwritten
  assert_eq!(session.var("STUDIO_ROOT"), Some("/studio"));
  assert_eq!(session.alias("render"), Some("/shot/render"));

  // each deactivation restores its own snapshot, taken while studio was active
  session.unuse("shot").unwrap();
  assert_eq!(session.var("STUDIO_ROOT"), Some("/studio"));
  assert_eq!(session.alias("render"), Some("/studio/render"));
  assert!(session.ledger().is_empty());
}

#[test]
fn later_alias_with_same_value_survives_first_unuse() {
  let tree = PackageTree::new();
  let a = tree.load("a", "1", "[branch]\na\n[alias]\nrender=/x\n");
  let b = tree.load("b", "1", "[branch]\nb\n[alias]\nrender=/x\n");
  let mut session = Session::new(
    ShellState::new()
      .with_var("PATH", "/usr/bin")
      .with_alias("render", "/usr/bin/render"),
  );

  session.use_pkg(&a).unwrap();
  session.use_pkg(&b).unwrap();
  session.unuse("a").unwrap();
  assert_eq!(session.alias("render"), Some("/x"));

  // b's snapshot was taken while a was active
  session.unuse("b").unwrap();
  assert_eq!(session.alias("render"), Some("/x"));
  assert!(session.ledger().is_empty());
}

#[test]
fn shared_path_entry_survives_first_unuse() {
  let tree = PackageTree::new();
  let a = tree.load("a", "1", "[branch]\na\n[path-prepend-PATH]\n/opt/shared/bin\n/opt/a/bin\n");
  let b = tree.load("b", "1", "[branch]\nb\n[path-postpend-PATH]\n/opt/shared/bin\n");
  let mut session = Session::with_path("/usr/bin");

  session.use_pkg(&a).unwrap();
  session.use_pkg(&b).unwrap();
  assert_eq!(session.var("PATH"), Some("/opt/a/bin:/usr/bin:/opt/shared/bin"));

  session.unuse("a").unwrap();
  assert_eq!(session.var("PATH"), Some("/usr/bin:/opt/shared/bin"));

  // b found the entry already present, so it is not b's to remove
  session.unuse("b").unwrap();
  assert_eq!(session.var("PATH"), Some("/usr/bin:/opt/shared/bin"));
}

#[test]
fn reactivation_leaves_one_record() {
  let tree = PackageTree::new();
  let v1 = tree.load("houdini", "19.5", "[branch]\nhoudini\n[path-prepend-PATH]\n$VERSION_PATH/bin\n");
  let v2 = tree.load("houdini", "20.0", "[branch]\nhoudini\n[path-prepend-PATH]\n$VERSION_PATH/bin\n");
  let mut session = Session::with_path("/usr/bin");

  session.use_pkg(&v1).unwrap();
  session.use_pkg(&v2).unwrap();

  let ledger = session.ledger();
  assert_eq!(ledger.len(), 1);
  assert_eq!(ledger.find("houdini").map(|r| r.package_name.as_str()), Some("houdini-20.0"));

  let path = session.var("PATH").unwrap().to_string();
  assert!(path.ends_with("/houdini/20.0/bin:/usr/bin"), "{}", path);
  assert!(!path.contains("19.5"));

  session.unuse("houdini").unwrap();
  assert_eq!(session.var("PATH"), Some("/usr/bin"));
  assert!(session.ledger().is_empty());
}

#[test]
fn reject_policy_leaves_session_untouched() {
  let tree = PackageTree::new();
  let pkg = path_package(&tree, "A", "/opt/A/bin");
  let mut session = Session::with_path("/usr/bin");

  session.use_pkg(&pkg).unwrap();
  let before = session.state.clone();

  let err = session.use_pkg_with(&pkg, Reactivation::Reject).unwrap_err();
  assert_eq!(err, LedgerError::DuplicateBranch("A".to_string()));
  assert_eq!(session.state, before);
}

#[test]
fn unknown_branch_leaves_session_untouched() {
  let mut session = Session::with_path("/usr/bin");
  let before = session.state.clone();

  assert!(matches!(session.unuse("ghost"), Err(LedgerError::UnknownBranch(_))));
  assert_eq!(session.state, before);
}

#[test]
fn damaged_record_does_not_block_other_branches() {
  let tree = PackageTree::new();
  let a = path_package(&tree, "A", "/opt/A/bin");
  let b = path_package(&tree, "B", "/opt/B/bin");
  let mut session = Session::with_path("/usr/bin");

  session.use_pkg(&a).unwrap();
  session.use_pkg(&b).unwrap();
  session.state.apply(&Directive::set_var("USE_A_NEW_PATH_PREPENDS", "{broken"));

  assert!(matches!(session.unuse("A"), Err(LedgerError::Serialization { .. })));

  session.unuse("B").unwrap();
  assert_eq!(session.var("PATH"), Some("/opt/A/bin:/usr/bin"));
  assert!(session.ledger().find_damaged("A").is_some());
}

#[test]
fn ledger_updates_follow_state_changes() {
  let tree = PackageTree::new();
  let pkg = tree.load("a", "1", "[branch]\na\n[env]\nA=1\n[use-shell-cmds]\necho ready\n");
  let mut session = Session::with_path("/usr/bin");

  let tx = session.use_pkg(&pkg).unwrap();
  let rendered: Vec<String> = tx.directives().map(|d| d.to_string()).collect();

  let run_at = rendered.iter().position(|d| d.contains("echo ready")).unwrap();
  let index_at = rendered.iter().position(|d| d.contains(BRANCHES_VAR)).unwrap();
  assert!(run_at < index_at);
  assert_eq!(index_at, rendered.len() - 1);
}
