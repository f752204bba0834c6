//! Check performed history against the rule set.

use serde::Serialize;

use crate::{Move, RuleSet, Slot, WINDOW};

/// Outcome for one rule slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// No rule in this slot.
    Unconstrained,
    Satisfied,
    Unsatisfied,
}

/// Display data for one rule slot.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct SlotReport {
    pub slot: Slot,
    pub status: SlotStatus,
    /// Trailing positions the rule's constraint admits, indexed by recency.
    pub indicators: [bool; 3],
    pub label: String,
    /// Recency of the history entry that satisfied the rule.
    pub matched: Option<usize>,
}

impl SlotReport {
    fn unconstrained(slot: Slot) -> SlotReport {
        SlotReport {
            slot,
            status: SlotStatus::Unconstrained,
            indicators: [false; 3],
            label: String::new(),
            matched: None,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.status == SlotStatus::Satisfied
    }
}

/// Result of [`validate`].
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Validation {
    /// All defined rules are satisfied (true when no rule is defined).
    pub valid: bool,
    /// Indexed by slot.
    pub slots: [SlotReport; 3],
}

/// Match each defined rule against a distinct entry among the last three
/// performed moves.
///
/// Rules are matched most constrained first (pinned, then not-last, then
/// any), slot order breaking ties. Each rule takes the most recent
/// unclaimed entry of its class whose position it admits.
pub fn validate(history: &[Move], rules: &RuleSet) -> Validation {
    let recent: Vec<Move> = history.iter().rev().take(WINDOW).copied().collect();

    let mut slots = Slot::ALL.map(SlotReport::unconstrained);
    let mut claimed = [false; WINDOW];

    let mut order: Vec<_> = rules.iter().collect();
    order.sort_by_key(|(slot, rule)| (rule.constraint.rank(), slot.index()));

    let mut valid = true;
    for (slot, rule) in order {
        let matched = recent.iter().enumerate().position(|(recency, &mov)| {
            !claimed[recency] && rule.class.matches(mov) && rule.constraint.admits(recency)
        });
        if let Some(recency) = matched {
            claimed[recency] = true;
        } else {
            valid = false;
        }
        slots[slot.index()] = SlotReport {
            slot,
            status: if matched.is_some() {
                SlotStatus::Satisfied
            } else {
                SlotStatus::Unsatisfied
            },
            indicators: rule.constraint.indicators(),
            label: rule.label(),
            matched,
        };
    }

    Validation { valid, slots }
}
