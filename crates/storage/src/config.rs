//! Storage configuration from environment variables.

use std::path::PathBuf;

use anyhow::Context;

use splitledger_ledger::DEFAULT_SLOT_KEY;

pub const DB_PATH_VAR: &str = "SPLITLEDGER_DB_PATH";
pub const SLOT_KEY_VAR: &str = "SPLITLEDGER_SLOT_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    pub slot_key: String,
}

impl StorageConfig {
    /// Read `SPLITLEDGER_DB_PATH` and `SPLITLEDGER_SLOT_KEY`, falling back to
    /// the per-user data directory and the default slot key.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_path = match lookup(DB_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => {
                let path = default_db_path()?;
                tracing::info!(path = ?path, "{DB_PATH_VAR} not set; using default location");
                path
            }
        };

        let slot_key = lookup(SLOT_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SLOT_KEY.to_owned());

        Ok(Self { db_path, slot_key })
    }
}

/// `{app_data_dir}/splitledger/ledger.db`
fn default_db_path() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory (tried data_dir and ~/.local/share)")?;

    dir.push("splitledger");
    dir.push("ledger.db");
    Ok(dir)
}
