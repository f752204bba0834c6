//! Mutable planner state: positions, rules, performed history and the
//! current hint stack.
//!
//! Every mutation recomputes validation and hints from scratch, except
//! performing the move on top of the hint stack, which just pops it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnvilError;
use crate::planner::{plan, HintStack};
use crate::screenshot::Extracted;
use crate::validate::{validate, Validation};
use crate::{clamp_progress, in_range, Move, RuleSet, Slot, WINDOW};

/// The part of a session worth saving as a recipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub rules: RuleSet,
    pub start_progress: i32,
    pub target_progress: i32,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, AnvilError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and range-check a snapshot.
    pub fn from_json(json: &str) -> Result<Snapshot, AnvilError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.check()?;
        Ok(snapshot)
    }

    fn check(&self) -> Result<(), AnvilError> {
        for p in [self.start_progress, self.target_progress] {
            if !in_range(p) {
                return Err(AnvilError::ProgressOutOfRange(p));
            }
        }
        Ok(())
    }
}

/// One planning session.
#[derive(Clone, Debug)]
pub struct Session {
    start: i32,
    target: i32,
    rules: RuleSet,
    history: Vec<Move>,
    validation: Validation,
    hints: Option<HintStack>,
}

impl Session {
    /// Empty session with both positions at zero and no rules.
    pub fn new() -> Session {
        Session::with(0, 0, RuleSet::new())
    }

    /// Session with the given positions (clamped) and rules.
    pub fn with(start: i32, target: i32, rules: RuleSet) -> Session {
        let mut session = Session {
            start: clamp_progress(start),
            target: clamp_progress(target),
            rules,
            history: Vec::new(),
            validation: validate(&[], &rules),
            hints: None,
        };
        session.refresh();
        session
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Full performed history, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The last three performed moves, oldest first.
    pub fn recent(&self) -> &[Move] {
        let skip = self.history.len().saturating_sub(WINDOW);
        &self.history[skip..]
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Current hints: `None` when no plan exists, empty when done.
    pub fn hints(&self) -> Option<&HintStack> {
        self.hints.as_ref()
    }

    /// Check if the start sits on the target with every rule satisfied.
    pub fn is_done(&self) -> bool {
        self.start == self.target && self.validation.valid
    }

    fn refresh(&mut self) {
        self.validation = validate(&self.history, &self.rules);
        self.hints = if self.is_done() {
            Some(HintStack::default())
        } else {
            plan(self.start, self.target, &self.rules, self.validation.valid)
        };
        debug!(
            start = self.start,
            target = self.target,
            valid = self.validation.valid,
            hints = self.hints.as_ref().map(HintStack::len),
            "session refreshed"
        );
    }

    /// Perform a move. Returns false, and clears the history, when the move
    /// would leave the legal range. The generic hit cannot be performed.
    ///
    /// Performing the hinted move pops it off the hint stack; any other move
    /// replans.
    pub fn perform(&mut self, mov: Move) -> bool {
        if mov == Move::Hit {
            return false;
        }
        let next = self.start + mov.delta();
        if !in_range(next) {
            info!(start = self.start, ?mov, "move leaves range; history cleared");
            self.history.clear();
            self.refresh();
            return false;
        }

        self.start = next;
        self.history.push(mov);

        let followed = self.hints.as_ref().and_then(HintStack::next) == Some(mov);
        if !followed {
            self.refresh();
            return true;
        }
        self.validation = validate(&self.history, &self.rules);
        if let Some(hints) = self.hints.as_mut() {
            hints.pop();
            if hints.is_empty() && !self.is_done() {
                self.refresh();
            }
        }
        true
    }

    /// Perform a move by identifier.
    pub fn perform_named(&mut self, name: &str) -> Result<bool, AnvilError> {
        match Move::from_name(name) {
            Some(mov) if mov != Move::Hit => Ok(self.perform(mov)),
            _ => Err(AnvilError::UnknownMove(name.to_string())),
        }
    }

    pub fn set_start(&mut self, progress: i32) {
        self.start = clamp_progress(progress);
        self.refresh();
    }

    pub fn set_target(&mut self, progress: i32) {
        self.target = clamp_progress(progress);
        self.refresh();
    }

    /// Adopt positions read from a screenshot.
    pub fn apply_extracted(&mut self, extracted: Extracted) {
        self.start = clamp_progress(extracted.start);
        self.target = clamp_progress(extracted.target);
        self.refresh();
    }

    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
        self.refresh();
    }

    pub fn cycle_rule_class(&mut self, slot: Slot) {
        self.rules.cycle_class(slot);
        self.refresh();
    }

    pub fn cycle_rule_constraint(&mut self, slot: Slot) {
        self.rules.cycle_constraint(slot);
        self.refresh();
    }

    pub fn clear_rule(&mut self, slot: Slot) {
        self.rules.clear(slot);
        self.refresh();
    }

    /// Forget performed history; positions and rules are kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.refresh();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rules: self.rules,
            start_progress: self.start,
            target_progress: self.target,
        }
    }

    /// Load a snapshot. History is cleared.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), AnvilError> {
        snapshot.check()?;
        self.rules = snapshot.rules;
        self.start = snapshot.start_progress;
        self.target = snapshot.target_progress;
        self.history.clear();
        self.refresh();
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a slot index from an outer layer.
pub fn slot_from_index(index: usize) -> Result<Slot, AnvilError> {
    Slot::from_index(index).ok_or(AnvilError::InvalidSlot(index))
}
