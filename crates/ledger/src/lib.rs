//! Split ledger (shared expenses, equal-share allocation).
//!
//! The ledger owns participants and expenses for the active session, derives
//! per-participant totals on demand and writes the full state through a
//! [`PersistenceAdapter`] after every change.

pub mod expense;
pub mod export;
pub mod ledger;
pub mod participant;
pub mod persistence;
pub mod split;
pub mod state;

pub use expense::{Expense, ExpenseInput, ExpensePatch};
pub use export::{
    ExportDocument, ExportError, ExportOutcome, ExportSink, JsonFileSink, export_file_name,
};
pub use ledger::Ledger;
pub use participant::Participant;
pub use persistence::{DEFAULT_SLOT_KEY, MemorySlot, PersistenceAdapter, SnapshotSlot};
pub use split::{SplitItem, SplitResult, round_to_cents};
pub use state::LedgerState;
