use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use splitledger_core::{DomainError, DomainResult, Entity, ExpenseId, ParticipantId};

/// One shared cost, split equally among `participants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub name: String,
    #[serde(deserialize_with = "amount_or_nan")]
    pub amount: f64,
    /// Ordered and duplicate-free.
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
    /// Who paid. Informational only; the split ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Expense {
    /// Whether `participant` shares this expense.
    pub fn includes(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }

    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn apply(&mut self, patch: ExpensePatch) {
        let ExpensePatch {
            name,
            amount,
            participants,
            payer_id,
            category,
            date,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(amount) = amount {
            self.amount = amount;
        }
        if let Some(participants) = participants {
            self.participants = participants;
        }
        if let Some(payer_id) = payer_id {
            self.payer_id = payer_id;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(date) = date {
            self.date = date;
        }
    }
}

/// Non-finite amounts serialize as `null`; read them back as NaN so one bad
/// expense does not invalidate the whole snapshot.
fn amount_or_nan<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update for an [`Expense`].
///
/// `None` keeps the existing value. For the optional fields the inner option
/// sets (`Some(Some(v))`) or clears (`Some(None)`) the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub participants: Option<Vec<ParticipantId>>,
    pub payer_id: Option<Option<ParticipantId>>,
    pub category: Option<Option<String>>,
    pub date: Option<Option<NaiveDate>>,
}

impl ExpensePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn participants(mut self, participants: Vec<ParticipantId>) -> Self {
        self.participants = Some(participants);
        self
    }

    pub fn payer(mut self, payer_id: Option<ParticipantId>) -> Self {
        self.payer_id = Some(payer_id);
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// User-entered expense, validated before it reaches the ledger.
///
/// The ledger stores whatever amount it is given; this is the check a form
/// runs first.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    pub name: String,
    pub amount: f64,
    pub participants: Vec<ParticipantId>,
}

impl ExpenseInput {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            participants: Vec::new(),
        }
    }

    pub fn with_participants(mut self, participants: Vec<ParticipantId>) -> Self {
        self.participants = participants;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("expense name must not be empty"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(DomainError::validation("amount must be a positive number"));
        }
        Ok(())
    }
}
