//! Equal-share allocation of expenses to participants.
//!
//! Pure functions over the current participants and expenses. Nothing here is
//! cached: callers recompute on every read.

use serde::{Deserialize, Serialize};

use splitledger_core::ParticipantId;

use crate::expense::Expense;
use crate::participant::Participant;

/// One expense's contribution to a participant's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitItem {
    pub item_name: String,
    /// Unrounded share.
    pub amount: f64,
}

/// What one participant owes across all expenses they share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResult {
    pub participant_id: ParticipantId,
    pub name: String,
    /// Sum of `items`, rounded to cents.
    pub total_amount: f64,
    pub items: Vec<SplitItem>,
}

/// Round to two decimals, halves away from zero.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of every expense amount, including expenses nobody shares.
pub fn total_amount(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Per-participant share of `expense`, or `None` when it has no participants.
pub fn share_of(expense: &Expense) -> Option<f64> {
    match expense.participants.len() {
        0 => None,
        n => Some(expense.amount / n as f64),
    }
}

/// Total of the expenses that currently list no participants.
///
/// This money is part of [`total_amount`] but appears in no [`SplitResult`].
pub fn unassigned_amount(expenses: &[Expense]) -> f64 {
    expenses
        .iter()
        .filter(|e| e.participants.is_empty())
        .map(|e| e.amount)
        .sum()
}

/// One result per participant, in participant order.
///
/// Items follow expense insertion order. Each total is rounded on its own, so
/// the totals may drift from [`total_amount`] by sub-cent amounts.
pub fn split_results(participants: &[Participant], expenses: &[Expense]) -> Vec<SplitResult> {
    participants
        .iter()
        .map(|participant| split_for(participant, expenses))
        .collect()
}

fn split_for(participant: &Participant, expenses: &[Expense]) -> SplitResult {
    let items: Vec<SplitItem> = expenses
        .iter()
        .filter(|e| e.includes(&participant.id))
        .filter_map(|e| {
            share_of(e).map(|amount| SplitItem {
                item_name: e.name.clone(),
                amount,
            })
        })
        .collect();

    let total: f64 = items.iter().map(|i| i.amount).sum();

    SplitResult {
        participant_id: participant.id.clone(),
        name: participant.name.clone(),
        total_amount: round_to_cents(total),
        items,
    }
}
