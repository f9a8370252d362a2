use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use tracing::debug;
use usepkg_lib::shell::Shell;
use usepkg_lib::state::ShellState;

/// Read the alias listing the shell wrapper pipes in.
///
/// An interactive stdin means nothing was piped, so there are no aliases to
/// learn about.
pub fn read_alias_listing() -> Result<String> {
  let stdin = io::stdin();
  if stdin.is_terminal() {
    debug!("stdin is a terminal; assuming no aliases");
    return Ok(String::new());
  }

  let mut listing = String::new();
  stdin
    .lock()
    .read_to_string(&mut listing)
    .context("Failed to read alias listing from stdin")?;
  Ok(listing)
}

/// Sample the calling shell's aliases and variables.
pub fn sample_shell(shell: Shell) -> Result<ShellState> {
  let listing = read_alias_listing()?;
  let state = ShellState::from_process(&listing, shell);
  debug!(
    shell = %shell,
    aliases = state.aliases().len(),
    vars = state.vars().len(),
    "sampled shell state"
  );
  Ok(state)
}
