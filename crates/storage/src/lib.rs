//! `splitledger-storage`
//!
//! **Responsibility:** durable snapshot storage for the ledger.
//!
//! - [`SqliteSlot`]: a [`splitledger_ledger::SnapshotSlot`] backed by a local
//!   SQLite database
//! - [`StorageConfig`]: where that database lives, read from the environment

pub mod config;
pub mod sqlite;

pub use config::StorageConfig;
pub use sqlite::SqliteSlot;
