//! `splitledger-core`: identifiers and error primitives shared by the ledger.
//!
//! This crate contains **pure domain** primitives (no storage, no IO).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult};
pub use id::{ExpenseId, ParticipantId, SessionId};
