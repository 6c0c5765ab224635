//! Sample data for trying the binary on an empty ledger.

use splitledger_core::ParticipantId;
use splitledger_ledger::{ExpenseInput, ExpensePatch, Ledger, SnapshotSlot};

pub fn seed<S: SnapshotSlot>(ledger: &mut Ledger<S>) -> anyhow::Result<()> {
    ledger.start_new_session();

    let alice = ledger.add_participant("Alice");
    let bob = ledger.add_participant("Bob");
    let carol = ledger.add_participant("Carol");

    let inputs = [
        ExpenseInput::new("Cabin rental", 450.0),
        ExpenseInput::new("Groceries", 87.3).with_participants(vec![alice.clone(), bob.clone()]),
        ExpenseInput::new("Fuel", 64.0).with_participants(vec![bob.clone(), carol.clone()]),
        ExpenseInput::new("Museum tickets", 36.0).with_participants(vec![carol]),
    ];

    for input in inputs {
        input.validate()?;
        let id = ledger.add_expense(&input.name, input.amount, &input.participants);
        let payer: &ParticipantId = if input.participants.is_empty() { &alice } else { &bob };
        ledger.update_expense(&id, ExpensePatch::new().payer(Some(payer.clone())));
    }

    tracing::info!(expenses = ledger.expenses().len(), "seeded demo ledger");
    Ok(())
}
