//! The persisted aggregate: everything a snapshot contains.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use splitledger_core::{ParticipantId, SessionId};

use crate::expense::Expense;
use crate::participant::Participant;

/// Participants, expenses and the active session id.
///
/// Derived values (totals, split results) are never stored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Stored as a string; the empty string means no session.
    #[serde(default, with = "session_id_or_empty")]
    pub current_session_id: Option<SessionId>,
}

impl LedgerState {
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.expenses.is_empty()
    }

    pub fn has_participant(&self, id: &ParticipantId) -> bool {
        self.participants.iter().any(|p| &p.id == id)
    }

    /// Keeps ids that name a current participant, first occurrence only.
    pub fn known_participants<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ParticipantId>,
    ) -> Vec<ParticipantId> {
        let known: HashSet<&ParticipantId> = self.participants.iter().map(|p| &p.id).collect();
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| known.contains(*id) && seen.insert(*id))
            .cloned()
            .collect()
    }

    /// Repair a snapshot loaded from storage.
    ///
    /// Drops duplicate participants (first wins) and every expense reference
    /// to a participant that does not exist. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut seen = HashSet::new();
        let before = self.participants.len();
        self.participants.retain(|p| seen.insert(p.id.clone()));
        let mut changed = self.participants.len() != before;

        let known: HashSet<ParticipantId> =
            self.participants.iter().map(|p| p.id.clone()).collect();
        for expense in &mut self.expenses {
            let mut listed = HashSet::new();
            let before = expense.participants.len();
            expense
                .participants
                .retain(|id| known.contains(id) && listed.insert(id.clone()));
            changed |= expense.participants.len() != before;

            if expense.payer_id.as_ref().is_some_and(|p| !known.contains(p)) {
                expense.payer_id = None;
                changed = true;
            }
        }

        changed
    }
}

mod session_id_or_empty {
    use serde::{Deserialize, Deserializer, Serializer};
    use splitledger_core::SessionId;

    pub fn serialize<S: Serializer>(value: &Option<SessionId>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_ref().map(SessionId::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SessionId>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw
            .filter(|s| !s.trim().is_empty())
            .map(SessionId::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitledger_core::ExpenseId;

    fn test_participant(id: &str) -> Participant {
        Participant::new(ParticipantId::from(id), id.to_uppercase())
    }

    fn test_expense(participants: &[&str], payer: Option<&str>) -> Expense {
        Expense {
            id: ExpenseId::from("e1"),
            name: "Groceries".to_string(),
            amount: 60.0,
            participants: participants.iter().map(|p| ParticipantId::from(*p)).collect(),
            payer_id: payer.map(ParticipantId::from),
            category: None,
            date: None,
        }
    }

    #[test]
    fn snapshot_uses_original_wire_shape() {
        let state = LedgerState {
            participants: vec![test_participant("1")],
            expenses: vec![test_expense(&["1"], None)],
            current_session_id: None,
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentSessionId"], "");
        assert_eq!(json["participants"][0]["id"], "1");
        assert!(json["participants"][0].get("avatar").is_none());
        assert_eq!(json["expenses"][0]["amount"], 60.0);
    }

    #[test]
    fn partial_snapshot_loads_with_defaults() {
        let state: LedgerState =
            serde_json::from_str(r#"{"participants":[{"id":"1","name":"A"}]}"#).unwrap();
        assert_eq!(state.participants.len(), 1);
        assert!(state.expenses.is_empty());
        assert_eq!(state.current_session_id, None);

        let state: LedgerState = serde_json::from_str(r#"{"currentSessionId":null}"#).unwrap();
        assert_eq!(state.current_session_id, None);

        let state: LedgerState = serde_json::from_str(r#"{"currentSessionId":"abc"}"#).unwrap();
        assert_eq!(state.current_session_id, Some(SessionId::from("abc")));
    }

    #[test]
    fn known_participants_filters_and_dedupes() {
        let state = LedgerState {
            participants: vec![test_participant("1"), test_participant("2")],
            ..LedgerState::default()
        };
        let ids = [
            ParticipantId::from("2"),
            ParticipantId::from("x"),
            ParticipantId::from("1"),
            ParticipantId::from("2"),
        ];

        assert_eq!(
            state.known_participants(&ids),
            vec![ParticipantId::from("2"), ParticipantId::from("1")]
        );
    }

    #[test]
    fn normalize_drops_dangling_references() {
        let mut state = LedgerState {
            participants: vec![test_participant("1"), test_participant("1"), test_participant("2")],
            expenses: vec![test_expense(&["1", "ghost", "1", "2"], Some("ghost"))],
            current_session_id: None,
        };

        assert!(state.normalize());
        assert_eq!(state.participants.len(), 2);
        assert_eq!(
            state.expenses[0].participants,
            vec![ParticipantId::from("1"), ParticipantId::from("2")]
        );
        assert_eq!(state.expenses[0].payer_id, None);

        assert!(!state.normalize());
    }
}
