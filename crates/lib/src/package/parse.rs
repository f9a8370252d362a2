//! Parser for `.use` package files.
//!
//! ```text
//! [branch]
//! clarisse
//!
//! [alias]
//! clarisse=$VERSION_PATH/bin/clarisse
//!
//! [env]
//! CLARISSE_VERSION=$VERSION
//!
//! [path-prepend-PATH]
//! $VERSION_PATH/bin
//!
//! [use-shell-cmds]
//! echo "clarisse $VERSION ready"
//! ```
//!
//! `alias` and `env` hold `key=value` pairs split at the first `=`. Every other
//! section is a list with one item per line, taken verbatim after trimming.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use super::types::{PackageDef, PathEdits, ParseIssue};
use super::vars::BuiltinVars;
use crate::consts::BRANCHES_VAR;

const PREPEND_PREFIX: &str = "path-prepend-";
const POSTPEND_PREFIX: &str = "path-postpend-";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
  Branch,
  Alias,
  Env,
  Prepend(String),
  Postpend(String),
  UseCmds,
  UnuseCmds,
}

impl Section {
  fn classify(header: &str) -> Result<Self, String> {
    let var_name = |rest: &str| {
      if rest.is_empty() {
        Err(format!("section '{}' does not name a variable", header))
      } else {
        Ok(rest.to_string())
      }
    };

    match header {
      "branch" => Ok(Section::Branch),
      "alias" => Ok(Section::Alias),
      "env" => Ok(Section::Env),
      "use-shell-cmds" => Ok(Section::UseCmds),
      "unuse-shell-cmds" => Ok(Section::UnuseCmds),
      _ => {
        if let Some(rest) = header.strip_prefix(PREPEND_PREFIX) {
          var_name(rest).map(Section::Prepend)
        } else if let Some(rest) = header.strip_prefix(POSTPEND_PREFIX) {
          var_name(rest).map(Section::Postpend)
        } else {
          Err(format!("unknown section '{}'", header))
        }
      }
    }
  }
}

/// Parse package text into a [`PackageDef`].
///
/// `name` and `path` identify the package; `vars` supplies the values for
/// `$VERSION` and friends.
pub fn parse_package(text: &str, name: &str, path: PathBuf, vars: &BuiltinVars) -> Result<PackageDef, ParseIssue> {
  let mut seen_sections = HashSet::new();
  let mut current: Option<Section> = None;

  let mut branches: Vec<(usize, String)> = Vec::new();
  let mut aliases = BTreeMap::new();
  let mut env_vars = BTreeMap::new();
  let mut path_vars: BTreeMap<String, PathEdits> = BTreeMap::new();
  let mut use_cmds = Vec::new();
  let mut unuse_cmds = Vec::new();

  for (idx, raw) in text.lines().enumerate() {
    let line_no = idx + 1;
    let line = raw.trim();

    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
      continue;
    }

    if let Some(rest) = line.strip_prefix('[') {
      let header = rest
        .strip_suffix(']')
        .ok_or_else(|| ParseIssue::at(line_no, "unterminated section header"))?
        .trim();
      let section = Section::classify(header).map_err(|msg| ParseIssue::at(line_no, msg))?;
      if !seen_sections.insert(header.to_string()) {
        return Err(ParseIssue::at(line_no, format!("duplicate section '{}'", header)));
      }
      current = Some(section);
      continue;
    }

    let Some(section) = &current else {
      return Err(ParseIssue::at(line_no, "content before the first section"));
    };

    match section {
      Section::Branch => branches.push((line_no, vars.substitute(line))),
      Section::Alias => insert_pair(&mut aliases, line, line_no, "alias", vars)?,
      Section::Env => insert_pair(&mut env_vars, line, line_no, "env", vars)?,
      Section::Prepend(var) => path_vars.entry(var.clone()).or_default().prepend.push(vars.substitute(line)),
      Section::Postpend(var) => path_vars.entry(var.clone()).or_default().postpend.push(vars.substitute(line)),
      Section::UseCmds => use_cmds.push(vars.substitute(line)),
      Section::UnuseCmds => unuse_cmds.push(vars.substitute(line)),
    }
  }

  let branch = match branches.as_slice() {
    [] => return Err(ParseIssue::whole("missing [branch] section or value")),
    [(line_no, branch)] => {
      if !is_valid_branch(branch) {
        return Err(ParseIssue::at(
          *line_no,
          format!("branch '{}' may only contain letters, digits and '_'", branch),
        ));
      }
      branch.clone()
    }
    [_, (line_no, _), ..] => return Err(ParseIssue::at(*line_no, "[branch] must hold exactly one value")),
  };

  path_vars.retain(|_, edits| !edits.is_empty());

  if let Some(var) = env_vars.keys().find(|var| path_vars.contains_key(*var)) {
    return Err(ParseIssue::whole(format!(
      "'{}' is declared both in [env] and as a path variable",
      var
    )));
  }

  if env_vars.contains_key(BRANCHES_VAR) || path_vars.contains_key(BRANCHES_VAR) {
    return Err(ParseIssue::whole(format!("'{}' is reserved", BRANCHES_VAR)));
  }

  Ok(PackageDef {
    name: name.to_string(),
    path,
    branch,
    aliases,
    env_vars,
    path_vars,
    use_cmds,
    unuse_cmds,
  })
}

fn insert_pair(
  map: &mut BTreeMap<String, String>,
  line: &str,
  line_no: usize,
  section: &str,
  vars: &BuiltinVars,
) -> Result<(), ParseIssue> {
  let (key, value) = line
    .split_once('=')
    .ok_or_else(|| ParseIssue::at(line_no, format!("expected key=value in [{}]", section)))?;

  let key = key.trim();
  if key.is_empty() {
    return Err(ParseIssue::at(line_no, format!("empty key in [{}]", section)));
  }
  if map.contains_key(key) {
    return Err(ParseIssue::at(line_no, format!("duplicate key '{}' in [{}]", key, section)));
  }

  map.insert(key.to_string(), vars.substitute(value.trim()));
  Ok(())
}

fn is_valid_branch(branch: &str) -> bool {
  !branch.is_empty() && branch.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
