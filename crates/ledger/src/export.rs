//! Export of computed split results.
//!
//! The ledger builds an [`ExportDocument`]; where it ends up is up to an
//! [`ExportSink`]. [`JsonFileSink`] writes it to a directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::expense::Expense;
use crate::split::{self, SplitResult};
use crate::state::LedgerState;

pub const EXPORT_TITLE: &str = "Split Results";

/// Snapshot of the computed results plus the raw expenses behind them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub title: String,
    /// Human-readable local date, e.g. `2025/8/4`.
    pub date: String,
    pub total_amount: f64,
    pub participant_count: usize,
    pub expense_count: usize,
    pub results: Vec<SplitResult>,
    pub expenses: Vec<Expense>,
}

impl ExportDocument {
    /// `None` when there are no results to export.
    pub fn build(state: &LedgerState, now: DateTime<Utc>) -> Option<Self> {
        let results = split::split_results(&state.participants, &state.expenses);
        if results.is_empty() {
            return None;
        }

        Some(Self {
            title: EXPORT_TITLE.to_owned(),
            date: now.with_timezone(&Local).format("%Y/%-m/%-d").to_string(),
            total_amount: split::total_amount(&state.expenses),
            participant_count: state.participants.len(),
            expense_count: state.expenses.len(),
            results,
            expenses: state.expenses.clone(),
        })
    }
}

/// `split-results_YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("split-results_{}.json", date.format("%Y-%m-%d"))
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write export file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What [`crate::Ledger::export_results`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing to export; the sink was not called.
    Skipped,
    Delivered { file_name: String },
}

/// Receives a finished export document.
pub trait ExportSink {
    fn deliver(&self, file_name: &str, document: &ExportDocument) -> Result<(), ExportError>;
}

/// Writes export documents as pretty-printed JSON files into `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for JsonFileSink {
    fn deliver(&self, file_name: &str, document: &ExportDocument) -> Result<(), ExportError> {
        let payload = serde_json::to_string_pretty(document)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(file_name);
        std::fs::write(&path, payload).map_err(|source| ExportError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Participant;
    use chrono::TimeZone;
    use splitledger_core::{ExpenseId, ParticipantId};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 4, 12, 0, 0).unwrap()
    }

    fn test_state() -> LedgerState {
        LedgerState {
            participants: vec![
                Participant::new(ParticipantId::from("1"), "A"),
                Participant::new(ParticipantId::from("2"), "B"),
            ],
            expenses: vec![Expense {
                id: ExpenseId::from("e1"),
                name: "Hotel".to_string(),
                amount: 100.0,
                participants: vec![ParticipantId::from("1"), ParticipantId::from("2")],
                payer_id: None,
                category: None,
                date: None,
            }],
            current_session_id: None,
        }
    }

    #[test]
    fn file_name_embeds_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        assert_eq!(export_file_name(date), "split-results_2025-08-04.json");
    }

    #[test]
    fn build_returns_none_without_participants() {
        let mut state = test_state();
        state.participants.clear();
        assert_eq!(ExportDocument::build(&state, test_time()), None);
    }

    #[test]
    fn document_has_expected_shape() {
        let document = ExportDocument::build(&test_state(), test_time()).unwrap();
        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(json["title"], EXPORT_TITLE);
        assert_eq!(json["totalAmount"], 100.0);
        assert_eq!(json["participantCount"], 2);
        assert_eq!(json["expenseCount"], 1);
        assert_eq!(json["results"][1]["totalAmount"], 50.0);
        assert_eq!(json["expenses"][0]["id"], "e1");
        assert!(json["date"].as_str().is_some_and(|d| d.starts_with("2025/8/")));
    }

    #[test]
    fn json_file_sink_writes_pretty_document() {
        let dir = std::env::temp_dir().join(format!("splitledger-export-{}", uuid::Uuid::now_v7()));
        let sink = JsonFileSink::new(&dir);
        let document = ExportDocument::build(&test_state(), test_time()).unwrap();

        sink.deliver("out.json", &document).unwrap();

        let written = std::fs::read_to_string(dir.join("out.json")).unwrap();
        assert!(written.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["expenseCount"], 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn json_file_sink_reports_the_failing_path() {
        let blocker =
            std::env::temp_dir().join(format!("splitledger-export-{}", uuid::Uuid::now_v7()));
        std::fs::write(&blocker, "not a directory").unwrap();
        let sink = JsonFileSink::new(&blocker);
        let document = ExportDocument::build(&test_state(), test_time()).unwrap();

        let err = sink.deliver("out.json", &document).unwrap_err();
        assert!(matches!(&err, ExportError::Io { path, .. } if path == &blocker));

        std::fs::remove_file(&blocker).unwrap();
    }
}
