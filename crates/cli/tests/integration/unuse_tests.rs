use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

#[test]
#[serial]
fn unuse_restores_and_clears_ledger() {
  let env = TestEnv::new();

  env
    .usepkg_cmd()
    .env("USE_BRANCHES", "tool_a,tool_a-1.0,/opt/tool_a.use")
    .env("USE_TOOL_A_NEW_ENV_VARS", r#"{"TOOL_A_VERSION":"1.0","EDITOR":"nano"}"#)
    .env("USE_TOOL_A_ORIGINAL_ENV_VARS", r#"{"EDITOR":"vi"}"#)
    .env("USE_TOOL_A_UNUSE_SHELL_CMDS", r#"["echo bye"]"#)
    .env("TOOL_A_VERSION", "1.0")
    .env("EDITOR", "nano")
    .args(["unuse", "tool_a"])
    .assert()
    .success()
    .stdout(predicate::str::contains("export EDITOR='vi'\nunset TOOL_A_VERSION\necho bye\n"))
    .stdout(predicate::str::contains("unset USE_TOOL_A_NEW_ENV_VARS"))
    .stdout(predicate::str::ends_with("unset USE_BRANCHES\n"))
    .stderr(predicate::str::contains("Stopped using tool_a-1.0"));
}

#[test]
#[serial]
fn unuse_by_package_name() {
  let env = TestEnv::new();

  env
    .usepkg_cmd()
    .env("USE_BRANCHES", "tool_a,tool_a-1.0,/opt/tool_a.use")
    .args(["unuse", "tool_a-1.0"])
    .assert()
    .success()
    .stdout(predicate::str::contains("unset USE_BRANCHES"));
}

#[test]
#[serial]
fn unuse_by_package_file() {
  let env = TestEnv::new();
  let path = env.install("tool_b.use", "3.0");

  env
    .usepkg_cmd()
    .env("USE_BRANCHES", "tool_b,tool_b-2.0,/elsewhere/tool_b.use")
    .args(["unuse", path.to_str().unwrap()])
    .assert()
    .success()
    .stderr(predicate::str::contains("Stopped using tool_b-2.0"));
}

#[test]
#[serial]
fn unuse_damaged_record_needs_forget() {
  let env = TestEnv::new();

  env
    .usepkg_cmd()
    .env("USE_BRANCHES", "tool_a,tool_a-1.0,/opt/tool_a.use")
    .env("USE_TOOL_A_NEW_ALIASES", "[not json")
    .args(["unuse", "tool_a"])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("--forget"));
}

#[test]
#[serial]
fn forget_drops_damaged_record() {
  let env = TestEnv::new();

  env
    .usepkg_cmd()
    .env("USE_BRANCHES", "tool_a,tool_a-1.0,/opt/tool_a.use")
    .env("USE_TOOL_A_NEW_ALIASES", "[not json")
    .args(["unuse", "--forget", "tool_a"])
    .assert()
    .success()
    .stdout(predicate::str::contains("unset USE_TOOL_A_NEW_ALIASES"))
    .stdout(predicate::str::ends_with("unset USE_BRANCHES\n"))
    .stderr(predicate::str::contains("Forgot branch tool_a"));
}

#[test]
#[serial]
fn unuse_emits_fish_syntax() {
  let env = TestEnv::new();

  env
    .usepkg_cmd_for("fish")
    .env("USE_BRANCHES", "tool_a,tool_a-1.0,/opt/tool_a.use")
    .env("USE_TOOL_A_NEW_ALIASES", r#"{"toola":"/opt/bin/toola"}"#)
    .write_stdin("alias toola '/opt/bin/toola'\n")
    .args(["unuse", "tool_a"])
    .assert()
    .success()
    .stdout(predicate::str::contains("functions -e toola"))
    .stdout(predicate::str::contains("set -e USE_BRANCHES"));
}
