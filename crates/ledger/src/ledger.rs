use chrono::{DateTime, Utc};

use splitledger_core::{ExpenseId, ParticipantId, SessionId, position_of};

use crate::expense::{Expense, ExpensePatch};
use crate::export::{ExportDocument, ExportError, ExportOutcome, ExportSink, export_file_name};
use crate::participant::Participant;
use crate::persistence::{PersistenceAdapter, SnapshotSlot};
use crate::split::{self, SplitResult};
use crate::state::LedgerState;

/// The single owner of the active session's participants and expenses.
///
/// Every mutation that changes state ends by writing the full snapshot
/// through the [`PersistenceAdapter`]. Unknown ids are silent no-ops and do
/// not write. Totals and split results are recomputed on every read.
#[derive(Debug)]
pub struct Ledger<S: SnapshotSlot> {
    state: LedgerState,
    persistence: PersistenceAdapter<S>,
}

impl<S: SnapshotSlot> Ledger<S> {
    /// Load the last snapshot (or start empty) and take ownership of it.
    pub fn open(persistence: PersistenceAdapter<S>) -> Self {
        let mut state = persistence.load().unwrap_or_default();
        if state.normalize() {
            tracing::info!("dropped dangling participant references from stored snapshot");
        }

        tracing::debug!(
            participants = state.participants.len(),
            expenses = state.expenses.len(),
            "ledger opened"
        );

        Self { state, persistence }
    }

    pub fn from_slot(slot: S) -> Self {
        Self::open(PersistenceAdapter::new(slot))
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn participants(&self) -> &[Participant] {
        &self.state.participants
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.state.expenses
    }

    pub fn current_session_id(&self) -> Option<&SessionId> {
        self.state.current_session_id.as_ref()
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.state.participants.iter().find(|p| &p.id == id)
    }

    pub fn expense(&self, id: &ExpenseId) -> Option<&Expense> {
        self.state.expenses.iter().find(|e| &e.id == id)
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn total_amount(&self) -> f64 {
        split::total_amount(&self.state.expenses)
    }

    pub fn split_results(&self) -> Vec<SplitResult> {
        split::split_results(&self.state.participants, &self.state.expenses)
    }

    /// Money in expenses nobody currently shares.
    pub fn unassigned_amount(&self) -> f64 {
        split::unassigned_amount(&self.state.expenses)
    }

    pub fn add_participant(&mut self, name: impl Into<String>) -> ParticipantId {
        let id = self.fresh_participant_id();
        self.state
            .participants
            .push(Participant::new(id.clone(), name));

        tracing::debug!(participant_id = %id, "participant added");
        self.persist();
        id
    }

    /// Removes the participant and every reference to them. Their expenses
    /// stay, possibly with no participants left.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> bool {
        let Some(index) = position_of(&self.state.participants, id) else {
            return false;
        };
        self.state.participants.remove(index);

        for expense in &mut self.state.expenses {
            expense.participants.retain(|p| p != id);
            if expense.payer_id.as_ref() == Some(id) {
                expense.payer_id = None;
            }
        }

        tracing::debug!(participant_id = %id, "participant removed");
        self.persist();
        true
    }

    /// Record an expense dated today (UTC).
    ///
    /// An empty `participant_ids` means everyone currently in the ledger;
    /// people added later are not included. Ids that do not name a current
    /// participant are dropped.
    pub fn add_expense(
        &mut self,
        name: impl Into<String>,
        amount: f64,
        participant_ids: &[ParticipantId],
    ) -> ExpenseId {
        let participants = if participant_ids.is_empty() {
            self.state.participants.iter().map(|p| p.id.clone()).collect()
        } else {
            self.state.known_participants(participant_ids)
        };

        let id = self.fresh_expense_id();
        self.state.expenses.push(Expense {
            id: id.clone(),
            name: name.into(),
            amount,
            participants,
            payer_id: None,
            category: None,
            date: Some(Utc::now().date_naive()),
        });

        tracing::debug!(expense_id = %id, amount, "expense added");
        self.persist();
        id
    }

    pub fn remove_expense(&mut self, id: &ExpenseId) -> bool {
        let Some(index) = position_of(&self.state.expenses, id) else {
            return false;
        };
        self.state.expenses.remove(index);

        tracing::debug!(expense_id = %id, "expense removed");
        self.persist();
        true
    }

    /// Apply the fields present in `patch`.
    ///
    /// A replacement participant list is filtered like in
    /// [`Ledger::add_expense`]; a payer that is not a current participant is
    /// ignored.
    pub fn update_expense(&mut self, id: &ExpenseId, mut patch: ExpensePatch) -> bool {
        let Some(index) = position_of(&self.state.expenses, id) else {
            return false;
        };

        if let Some(ids) = patch.participants.take() {
            patch.participants = Some(self.state.known_participants(&ids));
        }
        if let Some(Some(payer)) = &patch.payer_id {
            if !self.state.has_participant(payer) {
                tracing::debug!(expense_id = %id, payer_id = %payer, "ignoring unknown payer");
                patch.payer_id = None;
            }
        }

        self.state.expenses[index].apply(patch);

        tracing::debug!(expense_id = %id, "expense updated");
        self.persist();
        true
    }

    /// Drop everything, including the session id.
    pub fn clear_all(&mut self) {
        self.state = LedgerState::default();

        tracing::debug!("ledger cleared");
        self.persist();
    }

    pub fn start_new_session(&mut self) -> SessionId {
        self.clear_all();

        let session_id = SessionId::new();
        self.state.current_session_id = Some(session_id.clone());

        tracing::info!(session_id = %session_id, "new session started");
        self.persist();
        session_id
    }

    /// The export document for `now`, or `None` with nothing to export.
    pub fn build_export(&self, now: DateTime<Utc>) -> Option<ExportDocument> {
        ExportDocument::build(&self.state, now)
    }

    pub fn export_results(&self, sink: &impl ExportSink) -> Result<ExportOutcome, ExportError> {
        self.export_results_at(sink, Utc::now())
    }

    pub fn export_results_at(
        &self,
        sink: &impl ExportSink,
        now: DateTime<Utc>,
    ) -> Result<ExportOutcome, ExportError> {
        let Some(document) = self.build_export(now) else {
            tracing::debug!("no split results; export skipped");
            return Ok(ExportOutcome::Skipped);
        };

        let file_name = export_file_name(now.date_naive());
        sink.deliver(&file_name, &document)?;

        tracing::info!(file_name = %file_name, "split results exported");
        Ok(ExportOutcome::Delivered { file_name })
    }

    fn persist(&self) {
        self.persistence.save(&self.state);
    }

    fn fresh_participant_id(&self) -> ParticipantId {
        loop {
            let id = ParticipantId::new();
            if !self.state.has_participant(&id) {
                return id;
            }
        }
    }

    fn fresh_expense_id(&self) -> ExpenseId {
        loop {
            let id = ExpenseId::new();
            if self.expense(&id).is_none() {
                return id;
            }
        }
    }
}
