//! Shell detection, directive emission, and alias-listing parsing.
//!
//! Everything dialect-specific lives here. The rest of the crate speaks in
//! [`Directive`]s and only turns them into text at the very end.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::directive::Directive;

/// Supported shell types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
  Bash,
  Zsh,
  Sh,
  Fish,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shell: {0} (supported: bash, zsh, sh, fish)")]
pub struct UnknownShell(pub String);

impl Shell {
  /// Detect the current shell from `$SHELL`, falling back to POSIX `sh`.
  pub fn detect() -> Self {
    let Ok(shell) = env::var("SHELL") else {
      return Shell::Sh;
    };

    let shell_name = PathBuf::from(&shell)
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or("")
      .to_lowercase();

    match shell_name.as_str() {
      "zsh" => Shell::Zsh,
      "bash" => Shell::Bash,
      "fish" => Shell::Fish,
      "sh" => Shell::Sh,
      _ => {
        if shell_name.contains("zsh") {
          Shell::Zsh
        } else if shell_name.contains("bash") {
          Shell::Bash
        } else if shell_name.contains("fish") {
          Shell::Fish
        } else {
          Shell::Sh
        }
      }
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Shell::Bash => "bash",
      Shell::Zsh => "zsh",
      Shell::Sh => "sh",
      Shell::Fish => "fish",
    }
  }

  fn is_posix(&self) -> bool {
    !matches!(self, Shell::Fish)
  }

  /// Quote a value so the shell reads it back verbatim.
  pub fn quote(&self, value: &str) -> String {
    if self.is_posix() {
      format!("'{}'", value.replace('\'', r"'\''"))
    } else {
      format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
    }
  }

  /// Spell a single directive in this shell's syntax.
  pub fn render(&self, directive: &Directive) -> String {
    match directive {
      Directive::SetAlias { name, value } => match self {
        Shell::Fish => format!("alias {} {}", name, self.quote(value)),
        _ => format!("alias {}={}", name, self.quote(value)),
      },
      Directive::UnsetAlias { name } => match self {
        Shell::Fish => format!("functions -e {}", name),
        _ => format!("unalias {}", name),
      },
      Directive::SetVar { name, value } => match self {
        Shell::Fish => format!("set -gx {} {}", name, self.quote(value)),
        _ => format!("export {}={}", name, self.quote(value)),
      },
      Directive::UnsetVar { name } => match self {
        Shell::Fish => format!("set -e {}", name),
        _ => format!("unset {}", name),
      },
      Directive::Run { command } => command.clone(),
    }
  }

  /// Render a directive list as a script for the shell to evaluate.
  pub fn render_script(&self, directives: &[Directive]) -> String {
    let mut script = String::new();
    for directive in directives {
      script.push_str(&self.render(directive));
      script.push('\n');
    }
    script
  }

  /// Parse the output of this shell's `alias` builtin into a name→value map.
  ///
  /// Lines that do not look like alias definitions are skipped.
  pub fn parse_aliases(&self, listing: &str) -> BTreeMap<String, String> {
    let mut aliases = BTreeMap::new();

    for line in listing.lines() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }

      let body = line.strip_prefix("alias ").map(str::trim_start).unwrap_or(line);

      let parsed = if self.is_posix() {
        split_posix_alias(body)
      } else {
        split_fish_alias(body)
      };

      if let Some((name, value)) = parsed {
        aliases.insert(name, value);
      }
    }

    aliases
  }

  /// Wrapper functions that connect an interactive shell to the binary.
  ///
  /// `program` is the path of the executable to call. Each wrapper returns the
  /// binary's exit status, and evaluates nothing when it fails.
  pub fn init_script(&self, program: &str) -> String {
    let program = self.quote(program);
    match self {
      Shell::Fish => format!(
        "function use\n  alias | {prog} --shell fish use $argv | source\n  return $pipestatus[2]\nend\n\
         function unuse\n  alias | {prog} --shell fish unuse $argv | source\n  return $pipestatus[2]\nend\n\
         function used\n  {prog} --shell fish used $argv\nend\n",
        prog = program
      ),
      _ => format!(
        "use() {{ local _usepkg_script; _usepkg_script=\"$(alias | {prog} --shell {shell} use \"$@\")\" || return; eval \"$_usepkg_script\"; }}\n\
         unuse() {{ local _usepkg_script; _usepkg_script=\"$(alias | {prog} --shell {shell} unuse \"$@\")\" || return; eval \"$_usepkg_script\"; }}\n\
         used() {{ {prog} --shell {shell} used \"$@\"; }}\n",
        prog = program,
        shell = self.as_str()
      ),
    }
  }
}

impl fmt::Display for Shell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Shell {
  type Err = UnknownShell;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "bash" => Ok(Shell::Bash),
      "zsh" => Ok(Shell::Zsh),
      "sh" | "dash" => Ok(Shell::Sh),
      "fish" => Ok(Shell::Fish),
      other => Err(UnknownShell(other.to_string())),
    }
  }
}

/// `name=value` with POSIX quoting on the value (bash, zsh, dash).
fn split_posix_alias(body: &str) -> Option<(String, String)> {
  let (name, raw) = body.split_once('=')?;
  let name = unquote_posix(name.trim());
  if name.is_empty() || name.contains(char::is_whitespace) {
    return None;
  }
  Some((name, unquote_posix(raw)))
}

/// `name 'value'` as printed by fish. Some fish versions print the POSIX
/// form, so fall back to it when the name carries an `=`.
fn split_fish_alias(body: &str) -> Option<(String, String)> {
  let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
  if body[..name_end].contains('=') {
    return split_posix_alias(body);
  }
  let name = &body[..name_end];
  let raw = body[name_end..].trim_start();
  if name.is_empty() || raw.is_empty() {
    return None;
  }
  Some((name.to_string(), unquote_fish(raw)))
}

fn unquote_posix(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();

  while let Some(ch) = chars.next() {
    match ch {
      '\'' => {
        for c in chars.by_ref() {
          if c == '\'' {
            break;
          }
          out.push(c);
        }
      }
      '"' => {
        while let Some(c) = chars.next() {
          match c {
            '"' => break,
            '\\' => match chars.next() {
              Some(next @ ('"' | '\\' | '$' | '`')) => out.push(next),
              Some(next) => {
                out.push('\\');
                out.push(next);
              }
              None => out.push('\\'),
            },
            _ => out.push(c),
          }
        }
      }
      '\\' => {
        if let Some(next) = chars.next() {
          out.push(next);
        }
      }
      _ => out.push(ch),
    }
  }

  out
}

fn unquote_fish(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();

  while let Some(ch) = chars.next() {
    match ch {
      quote @ ('\'' | '"') => {
        while let Some(c) = chars.next() {
          if c == quote {
            break;
          }
          if c == '\\' {
            match chars.next() {
              Some(next) if next == quote || next == '\\' || (quote == '"' && next == '$') => out.push(next),
              Some(next) => {
                out.push('\\');
                out.push(next);
              }
              None => out.push('\\'),
            }
          } else {
            out.push(c);
          }
        }
      }
      '\\' => {
        if let Some(next) = chars.next() {
          out.push(next);
        }
      }
      _ => out.push(ch),
    }
  }

  out
}
