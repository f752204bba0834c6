//! Pick the shortest range-safe sequence that reaches the target and ends
//! with a rule-satisfying tail.

use tracing::debug;

use crate::assemble::assemblies;
use crate::endings::enumerate_endings;
use crate::reach::{solve, SolveMode};
use crate::{is_range_safe, Delta, Move, RuleSet};

/// Moves still to perform. The top of the stack is the next move.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct HintStack {
    /// Reverse application order: `last()` is performed first.
    stack: Vec<Move>,
}

impl HintStack {
    /// Build from moves in application order.
    pub fn from_plan(mut plan: Vec<Move>) -> HintStack {
        plan.reverse();
        HintStack { stack: plan }
    }

    /// The next move to perform.
    pub fn next(&self) -> Option<Move> {
        self.stack.last().copied()
    }

    /// Remove and return the next move.
    pub fn pop(&mut self) -> Option<Move> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Moves in application order.
    pub fn plan(&self) -> Vec<Move> {
        self.stack.iter().rev().copied().collect()
    }

    /// Deltas in application order.
    pub fn deltas(&self) -> Vec<Delta> {
        self.stack.iter().rev().map(|m| m.delta()).collect()
    }
}

/// Solve mode for a planning request.
///
/// Standing on the target with unsatisfied rules forces at least one move.
pub fn solve_mode(start: i32, target: i32, history_valid: bool) -> SolveMode {
    if start == target && !history_valid {
        SolveMode::MandatoryFirst
    } else {
        SolveMode::Normal
    }
}

/// Shortest range-safe delta sequence from `start` to `target` whose tail
/// satisfies `rules`, or `None` when no candidate survives.
///
/// Ties go to the first candidate found: endings in enumeration order,
/// then assemblies in preference order.
pub fn plan_deltas(start: i32, target: i32, rules: &RuleSet, history_valid: bool) -> Option<Vec<Delta>> {
    let mode = solve_mode(start, target, history_valid);
    let palette: Vec<Delta> = Move::PALETTE.iter().map(|m| m.delta()).collect();
    let table = solve(&palette, start, mode);
    let endings = enumerate_endings(rules);
    debug!(start, target, ?mode, endings = endings.len(), "planning");

    let mut best: Option<Vec<Delta>> = None;
    let mut rejected = 0usize;
    for ending in &endings {
        for candidate in assemblies(&table, target, ending) {
            if !is_range_safe(start, &candidate) {
                rejected += 1;
                continue;
            }
            if best.as_ref().map_or(true, |b| candidate.len() < b.len()) {
                best = Some(candidate);
            }
        }
    }

    match &best {
        Some(seq) => debug!(moves = seq.len(), rejected, "plan found"),
        None => debug!(rejected, "no plan"),
    }
    best
}

/// Plan as a hint stack.
pub fn plan(start: i32, target: i32, rules: &RuleSet, history_valid: bool) -> Option<HintStack> {
    let deltas = plan_deltas(start, target, rules, history_valid)?;
    Move::sequence_from_deltas(&deltas).map(HintStack::from_plan)
}
