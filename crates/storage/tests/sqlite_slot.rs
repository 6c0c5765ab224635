use std::path::{Path, PathBuf};

use splitledger_core::ParticipantId;
use splitledger_ledger::{ExpensePatch, Ledger, PersistenceAdapter, SnapshotSlot};
use splitledger_storage::{SqliteSlot, StorageConfig};

fn temp_db_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("splitledger-test-{}", uuid::Uuid::now_v7()))
        .join("ledger.db")
}

fn cleanup(path: &Path) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn empty_database_reads_nothing() {
    let path = temp_db_path();
    let slot = SqliteSlot::open(&path, "splitcat-data").unwrap();

    assert_eq!(slot.read().unwrap(), None);
    assert_eq!(slot.saved_at().unwrap(), None);
    assert!(path.exists());

    drop(slot);
    cleanup(&path);
}

#[test]
fn write_overwrites_previous_snapshot() {
    let path = temp_db_path();
    let slot = SqliteSlot::open(&path, "splitcat-data").unwrap();

    slot.write("{\"first\":true}").unwrap();
    slot.write("{\"second\":true}").unwrap();

    assert_eq!(slot.read().unwrap().as_deref(), Some("{\"second\":true}"));
    assert!(slot.saved_at().unwrap().is_some());

    slot.clear().unwrap();
    assert_eq!(slot.read().unwrap(), None);

    drop(slot);
    cleanup(&path);
}

#[test]
fn keys_are_isolated() {
    let path = temp_db_path();
    let trip = SqliteSlot::open(&path, "trip").unwrap();
    trip.write("{}").unwrap();
    drop(trip);

    let flat = SqliteSlot::open(&path, "flat").unwrap();
    assert_eq!(flat.read().unwrap(), None);

    drop(flat);
    cleanup(&path);
}

#[test]
fn ledger_state_survives_reopening_the_database() {
    let path = temp_db_path();
    let config = StorageConfig {
        db_path: path.clone(),
        slot_key: "splitcat-data".to_string(),
    };

    let (state, results) = {
        let mut ledger = Ledger::from_slot(SqliteSlot::from_config(&config).unwrap());
        ledger.start_new_session();
        let a = ledger.add_participant("A");
        let b = ledger.add_participant("B");
        let hotel = ledger.add_expense("Hotel", 100.0, &[]);
        ledger.add_expense("Taxi", 30.0, &[a]);
        ledger.update_expense(&hotel, ExpensePatch::new().payer(Some(b)));
        (ledger.state().clone(), ledger.split_results())
    };

    let reopened = Ledger::open(PersistenceAdapter::new(
        SqliteSlot::from_config(&config).unwrap(),
    ));
    assert_eq!(reopened.state(), &state);
    assert_eq!(reopened.split_results(), results);
    assert_eq!(reopened.total_amount(), 130.0);

    let a_total = reopened
        .split_results()
        .into_iter()
        .find(|r| r.name == "A")
        .map(|r| r.total_amount);
    assert_eq!(a_total, Some(80.0));
    assert!(reopened.participant(&ParticipantId::from("missing")).is_none());

    drop(reopened);
    cleanup(&path);
}

#[test]
fn corrupt_row_opens_an_empty_ledger() {
    let path = temp_db_path();
    let slot = SqliteSlot::open(&path, "splitcat-data").unwrap();
    slot.write("definitely not json").unwrap();

    let ledger = Ledger::from_slot(slot);
    assert!(ledger.state().is_empty());
    assert_eq!(ledger.current_session_id(), None);

    drop(ledger);
    cleanup(&path);
}

#[test]
fn dropping_inside_an_async_context_keeps_the_data() {
    let path = temp_db_path();
    let slot = SqliteSlot::open(&path, "splitcat-data").unwrap();
    slot.write("{\"kept\":true}").unwrap();

    let outer = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    outer.block_on(async move { drop(slot) });

    let reopened = SqliteSlot::open(&path, "splitcat-data").unwrap();
    assert_eq!(reopened.read().unwrap().as_deref(), Some("{\"kept\":true}"));

    drop(reopened);
    cleanup(&path);
}
