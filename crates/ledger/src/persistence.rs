//! Snapshot persistence for the ledger.
//!
//! A [`SnapshotSlot`] stores one serialized document under one key; the
//! [`PersistenceAdapter`] turns [`LedgerState`] into that document and back.
//! Failures never reach the ledger: loading degrades to "no snapshot" and
//! saving logs and carries on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::state::LedgerState;

/// Logical key the ledger snapshot is stored under.
pub const DEFAULT_SLOT_KEY: &str = "splitcat-data";

/// Durable storage for a single serialized snapshot.
///
/// Writes overwrite the whole slot; there are no partial updates.
pub trait SnapshotSlot {
    /// Key the snapshot lives under.
    fn key(&self) -> &str;

    /// Read the stored document, `Ok(None)` if nothing was ever written.
    fn read(&self) -> anyhow::Result<Option<String>>;

    /// Replace the stored document.
    fn write(&self, data: &str) -> anyhow::Result<()>;
}

/// In-memory slot, the stand-in for browser storage in tests and demos.
///
/// Clones share the same underlying slot, so a second ledger opened on a
/// clone sees what the first one saved.
#[derive(Debug, Clone)]
pub struct MemorySlot {
    key: String,
    data: Arc<Mutex<Option<String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_SLOT_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data: Arc::new(Mutex::new(None)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Slot pre-filled with `data`, e.g. a snapshot from an older build.
    pub fn with_data(data: impl Into<String>) -> Self {
        let slot = Self::new();
        if let Ok(mut guard) = slot.data.lock() {
            *guard = Some(data.into());
        }
        slot
    }

    /// Current raw contents.
    pub fn contents(&self) -> Option<String> {
        self.data.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemorySlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSlot for MemorySlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> anyhow::Result<Option<String>> {
        let guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("memory slot `{}` lock poisoned", self.key))?;
        Ok(guard.clone())
    }

    fn write(&self, data: &str) -> anyhow::Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("memory slot `{}` lock poisoned", self.key))?;
        *guard = Some(data.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Serializes [`LedgerState`] into a [`SnapshotSlot`].
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    slot: S,
}

impl<S: SnapshotSlot> PersistenceAdapter<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Last saved state, or `None` when the slot is empty, unreadable or
    /// holds something that is not a snapshot.
    pub fn load(&self) -> Option<LedgerState> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = self.slot.key(), "no stored snapshot");
                return None;
            }
            Err(err) => {
                tracing::warn!(key = self.slot.key(), "failed to read snapshot: {err:?}");
                return None;
            }
        };

        match serde_json::from_str::<LedgerState>(&raw) {
            Ok(state) => Some(state),
            Err(err) => {
                tracing::warn!(key = self.slot.key(), "ignoring malformed snapshot: {err}");
                None
            }
        }
    }

    /// Overwrite the slot with `state`. Errors are logged, never returned.
    pub fn save(&self, state: &LedgerState) {
        let payload = match serde_json::to_string(state) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(key = self.slot.key(), "failed to serialize snapshot: {err}");
                return;
            }
        };

        if let Err(err) = self.slot.write(&payload) {
            tracing::error!(key = self.slot.key(), "failed to write snapshot: {err:?}");
        }
    }
}
