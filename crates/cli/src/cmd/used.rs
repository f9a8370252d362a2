//! Implementation of the `usepkg used` command.
//!
//! Lists the packages active in the calling shell, oldest first.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use usepkg_lib::ledger::{BranchRecord, LedgerEntry, load_ledger};
use usepkg_lib::shell::Shell;
use usepkg_lib::state::ShellState;

use crate::output::{print_json, print_stat, symbols};

#[derive(Serialize)]
struct UsedEntry<'a> {
  branch: &'a str,
  package: &'a str,
  path: &'a str,
  timestamp: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  record: Option<&'a BranchRecord>,
}

impl<'a> UsedEntry<'a> {
  fn new(entry: LedgerEntry<'a>, verbose: bool) -> Self {
    let (error, record) = match entry {
      LedgerEntry::Intact(record) => (None, verbose.then_some(record)),
      LedgerEntry::Damaged(damaged) => (Some(damaged.error.as_str()), None),
    };
    Self {
      branch: entry.branch(),
      package: entry.package_name(),
      path: entry.package_path(),
      timestamp: entry.timestamp(),
      error,
      record,
    }
  }
}

/// Execute the used command.
///
/// Only variables are needed here, so no alias listing is read.
pub fn cmd_used(verbose: bool, json: bool) -> Result<()> {
  let live = ShellState::from_process("", Shell::detect());
  let ledger = load_ledger(&live);

  if json {
    let entries: Vec<UsedEntry<'_>> = ledger.entries().into_iter().map(|e| UsedEntry::new(e, verbose)).collect();
    return print_json(&entries);
  }

  if ledger.is_empty() {
    println!("No packages in use.");
    return Ok(());
  }

  for entry in ledger.entries() {
    match entry {
      LedgerEntry::Intact(record) => {
        println!(
          "  {} {} {} {}",
          symbols::INFO.if_supports_color(Stream::Stdout, |s| s.cyan()),
          record.package_name,
          symbols::ARROW,
          record.branch
        );
        if verbose {
          print_record(record);
        }
      }
      LedgerEntry::Damaged(damaged) => {
        println!(
          "  {} {} {} {} {}",
          symbols::WARNING.if_supports_color(Stream::Stdout, |s| s.yellow()),
          damaged.package_name,
          symbols::ARROW,
          damaged.branch,
          "(record damaged)".if_supports_color(Stream::Stdout, |s| s.yellow())
        );
        if verbose {
          print_stat("Error", &damaged.error);
        }
      }
    }
  }

  Ok(())
}

fn print_record(record: &BranchRecord) {
  print_stat("Path", &record.package_path);
  if !record.new_aliases.is_empty() {
    print_stat("Aliases", &join_keys(record.new_aliases.keys()));
  }
  if !record.new_env_vars.is_empty() {
    print_stat("Variables", &join_keys(record.new_env_vars.keys()));
  }
  let path_vars = record.path_vars();
  if !path_vars.is_empty() {
    print_stat("Path variables", &path_vars.join(", "));
  }
  for command in &record.on_deactivate_commands {
    print_stat("On unuse", command);
  }
}

fn join_keys<'a>(keys: impl Iterator<Item = &'a String>) -> String {
  keys.map(String::as_str).collect::<Vec<_>>().join(", ")
}
