//! Text for floating slot labels and the resource HUD.

use std::fmt::Write;

use crate::{ProcessSlot, ResourceLedger, SlimeSlotState};

pub fn slot_state_label(state: SlimeSlotState) -> &'static str {
    match state {
        SlimeSlotState::Empty => "Empty",
        SlimeSlotState::New => "New",
        SlimeSlotState::Ready => "Ready",
        SlimeSlotState::Running => "In progress",
        SlimeSlotState::Waiting => "Paused",
        SlimeSlotState::Finished => "Finished",
    }
}

/// What the slot's next evolution costs against what `ledger` holds.
pub fn slot_cost_text(slot: &ProcessSlot, ledger: &ResourceLedger) -> String {
    let Some(process) = slot.process() else {
        return "No process".to_string();
    };
    if slot.state() == SlimeSlotState::Empty {
        return "No process".to_string();
    }
    if process.is_final() || slot.state() == SlimeSlotState::Finished {
        return "Completed".to_string();
    }
    let cost = process.current_cost();
    if cost.is_empty() {
        return "No cost defined".to_string();
    }
    let mut text = String::from("Next evolution:\n");
    for entry in cost {
        let _ = writeln!(
            text,
            "{}: {}/{}",
            entry.kind,
            ledger.amount_of(entry.kind),
            entry.amount
        );
    }
    text
}

/// Resource panel that re-renders only when the ledger reports a change.
#[derive(Debug, Clone, Default)]
pub struct ResourceHud {
    seen_revision: Option<u64>,
    lines: Vec<String>,
}

impl ResourceHud {
    /// Returns true when the lines were rebuilt.
    pub fn refresh(&mut self, ledger: &ResourceLedger) -> bool {
        if self.seen_revision == Some(ledger.revision()) {
            return false;
        }
        self.seen_revision = Some(ledger.revision());
        self.lines = ledger
            .iter()
            .map(|(kind, amount)| format!("{kind}: {amount}"))
            .collect();
        true
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
