//! CLI output formatting utilities.
//!
//! stdout of `use` and `unuse` is evaluated by the calling shell, so every
//! human-facing message goes to stderr. Only `used`, `init` and the script
//! itself write to stdout.

use std::io::{self, Write};

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};
use usepkg_lib::directive::Directive;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const REMOVE: &str = "-";
}

pub fn print_success(message: &str) {
  eprintln!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stderr, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  eprintln!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stderr, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "    {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Write a script for the shell to evaluate in a single write.
pub fn print_script(script: &str) -> anyhow::Result<()> {
  let mut stdout = io::stdout().lock();
  stdout
    .write_all(script.as_bytes())
    .and_then(|_| stdout.flush())
    .context("Failed to write shell script")
}

/// Symbol and short description of one directive, for `--verbose` summaries.
pub fn describe_directive(directive: &Directive) -> (&'static str, String) {
  match directive {
    Directive::SetAlias { name, .. } => (symbols::ADD, format!("alias {}", name)),
    Directive::UnsetAlias { name } => (symbols::REMOVE, format!("alias {}", name)),
    Directive::SetVar { name, .. } => (symbols::MODIFY, name.clone()),
    Directive::UnsetVar { name } => (symbols::REMOVE, name.clone()),
    Directive::Run { command } => (symbols::ARROW, command.clone()),
  }
}

pub fn print_directives(directives: &[Directive]) {
  for directive in directives {
    let (symbol, text) = describe_directive(directive);
    let symbol = match symbol {
      symbols::ADD => symbol.if_supports_color(Stream::Stderr, |s| s.green()).to_string(),
      symbols::REMOVE => symbol.if_supports_color(Stream::Stderr, |s| s.red()).to_string(),
      symbols::MODIFY => symbol.if_supports_color(Stream::Stderr, |s| s.yellow()).to_string(),
      _ => symbol.if_supports_color(Stream::Stderr, |s| s.dimmed()).to_string(),
    };
    eprintln!("  {} {}", symbol, text);
  }
}
