use std::path::PathBuf;

use splitledger_storage::StorageConfig;

pub const EXPORT_DIR_VAR: &str = "SPLITLEDGER_EXPORT_DIR";
pub const SEED_DEMO_VAR: &str = "SPLITLEDGER_SEED_DEMO";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub export_dir: PathBuf,
    /// Fill an empty ledger with a sample trip.
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = StorageConfig::from_env()?;

        let export_dir = std::env::var(EXPORT_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let seed_demo = std::env::var(SEED_DEMO_VAR)
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            storage,
            export_dir,
            seed_demo,
        })
    }
}
