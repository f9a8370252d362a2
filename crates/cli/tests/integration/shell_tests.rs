//! End-to-end tests that let a real shell evaluate the emitted scripts.

#![cfg(unix)]

use std::process::Command;

use serial_test::serial;

use super::common::TestEnv;

/// Run a bash script with the usepkg wrappers installed and no inherited ledger.
fn run_bash(env: &TestEnv, script: &str, vars: &[(&str, String)]) -> String {
  let mut cmd = Command::new("bash");
  cmd.arg("-c").arg(script);
  for (name, _) in std::env::vars() {
    if name.starts_with("USE_") {
      cmd.env_remove(&name);
    }
  }
  cmd.env("USEPKG", env!("CARGO_BIN_EXE_usepkg"));
  cmd.current_dir(env.root());
  for (name, value) in vars {
    cmd.env(name, value);
  }

  let output = cmd.output().unwrap();
  assert!(
    output.status.success(),
    "bash failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  String::from_utf8(output.stdout).unwrap()
}

fn value<'a>(stdout: &'a str, key: &str) -> &'a str {
  let prefix = format!("{}=", key);
  stdout
    .lines()
    .find_map(|line| line.strip_prefix(prefix.as_str()))
    .unwrap_or_else(|| panic!("no {} in output:\n{}", key, stdout))
}

#[test]
#[serial]
fn path_entries_unwind_out_of_order() {
  let env = TestEnv::new();
  let a = env.install("tool_a.use", "1.0");
  let b = env.install("tool_b.use", "1.0");
  let a_bin = env.root().join("tool_a").join("1.0").join("bin");
  let b_bin = env.root().join("tool_b").join("1.0").join("bin");

  let stdout = run_bash(
    &env,
    r#"
eval "$("$USEPKG" init --shell bash)"
export TOOLPATH=/usr/local/tool
use "$PKG_A"
use "$PKG_B"
echo "stacked=$TOOLPATH"
echo "version=$TOOL_A_VERSION"
echo "alias=$(alias toola)"
unuse tool_a
echo "after_a=$TOOLPATH"
unuse tool_b
echo "final=$TOOLPATH"
echo "branches=${USE_BRANCHES-unset}"
echo "leftover=$(alias toola 2>/dev/null || echo none)"
"#,
    &[
      ("PKG_A", a.display().to_string()),
      ("PKG_B", b.display().to_string()),
    ],
  );

  assert_eq!(
    value(&stdout, "stacked"),
    format!("{}:{}:/usr/local/tool", b_bin.display(), a_bin.display())
  );
  assert_eq!(value(&stdout, "version"), "1.0");
  assert_eq!(
    value(&stdout, "alias"),
    format!("alias toola='{}/toola'", a_bin.display())
  );
  assert_eq!(value(&stdout, "after_a"), format!("{}:/usr/local/tool", b_bin.display()));
  assert_eq!(value(&stdout, "final"), "/usr/local/tool");
  assert_eq!(value(&stdout, "branches"), "unset");
  assert_eq!(value(&stdout, "leftover"), "none");
}

#[test]
#[serial]
fn unuse_restores_shadowed_alias() {
  let env = TestEnv::new();
  let a = env.install("tool_a.use", "1.0");

  let stdout = run_bash(
    &env,
    r#"
eval "$("$USEPKG" init --shell bash)"
alias toola="echo it's mine"
use "$PKG_A"
unuse tool_a
echo "alias=$(alias toola)"
echo "version=${TOOL_A_VERSION-unset}"
"#,
    &[("PKG_A", a.display().to_string())],
  );

  assert_eq!(value(&stdout, "alias"), r#"alias toola='echo it'\''s mine'"#);
  assert_eq!(value(&stdout, "version"), "unset");
}

#[test]
#[serial]
fn failed_use_leaves_shell_untouched() {
  let env = TestEnv::new();
  let broken = env.install("broken.use", "1.0");

  let stdout = run_bash(
    &env,
    r#"
eval "$("$USEPKG" init --shell bash)"
use "$PKG" 2>/dev/null
echo "use_status=$?"
echo "branches=${USE_BRANCHES-unset}"
unuse ghost 2>/dev/null
echo "unuse_status=$?"
"#,
    &[("PKG", broken.display().to_string())],
  );

  assert_eq!(value(&stdout, "use_status"), "1");
  assert_eq!(value(&stdout, "branches"), "unset");
  assert_eq!(value(&stdout, "unuse_status"), "1");
}

#[test]
#[serial]
fn successful_use_reports_zero_status() {
  let env = TestEnv::new();
  let a = env.install("tool_a.use", "1.0");

  let stdout = run_bash(
    &env,
    r#"
eval "$("$USEPKG" init --shell bash)"
use "$PKG_A" 2>/dev/null
echo "use_status=$?"
unuse tool_a 2>/dev/null
echo "unuse_status=$?"
"#,
    &[("PKG_A", a.display().to_string())],
  );

  assert_eq!(value(&stdout, "use_status"), "0");
  assert_eq!(value(&stdout, "unuse_status"), "0");
}
