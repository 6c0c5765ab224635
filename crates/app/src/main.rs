//! `splitledger`: open the stored ledger, log the split and export it.

mod config;
mod demo;

use anyhow::Context;
use splitledger_ledger::{ExportOutcome, JsonFileSink, Ledger, SnapshotSlot};
use splitledger_storage::SqliteSlot;

use crate::config::AppConfig;

fn main() -> anyhow::Result<()> {
    splitledger_observability::init();

    let config = AppConfig::from_env()?;
    let slot = SqliteSlot::from_config(&config.storage)
        .context("failed to open snapshot storage")?;
    tracing::info!(path = ?slot.path(), key = slot.key(), "using snapshot storage");

    let mut ledger = Ledger::from_slot(slot);

    if config.seed_demo && ledger.state().is_empty() {
        demo::seed(&mut ledger)?;
    }

    report(&ledger);

    let sink = JsonFileSink::new(&config.export_dir);
    match ledger
        .export_results(&sink)
        .context("failed to export split results")?
    {
        ExportOutcome::Skipped => tracing::info!("no participants yet; nothing exported"),
        ExportOutcome::Delivered { file_name } => {
            tracing::info!(dir = ?sink.dir(), file_name = %file_name, "split results written");
        }
    }

    Ok(())
}

fn report<S: SnapshotSlot>(ledger: &Ledger<S>) {
    tracing::info!(
        session_id = ledger.current_session_id().map(|s| s.as_str()).unwrap_or(""),
        participants = ledger.participants().len(),
        expenses = ledger.expenses().len(),
        total = ledger.total_amount(),
        "ledger summary"
    );

    let unassigned = ledger.unassigned_amount();
    if unassigned > 0.0 {
        tracing::warn!(amount = unassigned, "expenses without participants are not split");
    }

    for result in ledger.split_results() {
        tracing::info!(
            participant = %result.name,
            owes = result.total_amount,
            items = result.items.len(),
            "split result"
        );
    }
}
