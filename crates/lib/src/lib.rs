//! usepkg-lib: Core types and logic for usepkg
//!
//! This crate computes what a shell must evaluate to activate or deactivate
//! a software package in the current session:
//! - `package`: parses `.use` package definitions
//! - `ledger`: the per-session record of active branches, kept in the environment
//! - `plan`: activation planning
//! - `reconcile`: deactivation that undoes only what is still ours to undo
//! - `shell`: renders directives for bash, zsh, sh and fish

pub mod config;
pub mod consts;
pub mod directive;
pub mod ledger;
pub mod package;
pub mod plan;
pub mod reconcile;
pub mod shell;
pub mod state;
pub mod transaction;
