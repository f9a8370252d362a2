//! The per-session ledger of active branches.
//!
//! Each activation leaves a [`BranchRecord`] behind. Deactivation reads it to
//! work out what to put back.

mod codec;
mod store;
mod types;

pub use codec::{RecordField, field_var, ledger_directives, load_ledger};
pub use store::{LedgerEntry, LedgerStore};
pub use types::{BranchRecord, DamagedBranch, LedgerError};
