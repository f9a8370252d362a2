//! Implementation of the `usepkg init` command.
//!
//! Prints wrapper functions for the chosen shell. Aliases are not inherited by
//! child processes, so the wrappers pipe the shell's alias listing into
//! `usepkg` and evaluate what it prints. Typical setup in `~/.bashrc`:
//!
//! ```sh
//! eval "$(usepkg init --shell bash)"
//! ```

use anyhow::Result;
use tracing::warn;

use usepkg_lib::consts::APP_NAME;
use usepkg_lib::shell::Shell;

use crate::output::print_script;

/// Execute the init command.
pub fn cmd_init(shell: Shell) -> Result<()> {
  // Fall back to whatever `usepkg` is on PATH when our own location is unknown.
  let program = match std::env::current_exe() {
    Ok(exe) => dunce::canonicalize(&exe).unwrap_or(exe).to_string_lossy().into_owned(),
    Err(err) => {
      warn!(error = %err, "cannot locate own executable");
      APP_NAME.to_string()
    }
  };

  print_script(&shell.init_script(&program))
}
