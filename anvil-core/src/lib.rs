//! Anvil step planner.
//!
//! Drives a bounded progress value from a start position to a target
//! position with a fixed palette of signed moves, while the last three
//! moves satisfy up to three positional rules.
//!
//! # Move Table
//!
//! ```text
//! Move        Delta   Name
//! Draw         -15    draw
//! HardHit       -9    hard_hit
//! MediumHit     -6    medium_hit
//! LightHit      -3    light_hit
//! Punch         +2    punch
//! Bend          +7    bend
//! Upset        +13    upset
//! Shrink       +16    shrink
//! Hit            0    hit        (synthetic, rule matching only)
//! ```
//!
//! # Rule Window
//!
//! ```text
//! recency:        2            1             0
//! slot:      Third Last   Second Last      Last      <- most recent move
//! window idx:     0            1             2       (chronological)
//! ```
//!
//! Pipeline: [`validate`] checks performed history, [`plan`] builds a
//! [`ReachTable`], enumerates rule-satisfying [`endings`], assembles a
//! full sequence per ending and keeps the shortest range-safe one.

use serde::{Deserialize, Serialize};

pub mod assemble;
pub mod endings;
pub mod error;
pub mod planner;
pub mod reach;
pub mod screenshot;
pub mod session;
pub mod validate;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use assemble::{assemble, assemblies};
pub use endings::enumerate_endings;
pub use error::AnvilError;
pub use planner::{plan, HintStack};
pub use reach::{solve, ReachTable, SolveMode};
pub use screenshot::{extract, Extracted};
pub use session::{Session, Snapshot};
pub use validate::{validate, SlotReport, SlotStatus, Validation};

/// Signed effect of a move on progress.
pub type Delta = i32;

/// Lowest legal progress value.
pub const MIN_PROGRESS: i32 = 0;

/// Highest legal progress value.
pub const MAX_PROGRESS: i32 = 150;

/// Number of trailing moves rules can refer to.
pub const WINDOW: usize = 3;

/// Check if a progress value lies in `[MIN_PROGRESS, MAX_PROGRESS]`.
#[inline]
pub fn in_range(progress: i32) -> bool {
    (MIN_PROGRESS..=MAX_PROGRESS).contains(&progress)
}

/// Clamp a progress value into the legal range.
#[inline]
pub fn clamp_progress(progress: i32) -> i32 {
    progress.clamp(MIN_PROGRESS, MAX_PROGRESS)
}

// ============================================================================
// MOVE TABLE
// ============================================================================

/// A move the player can perform on the anvil.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Draw,
    HardHit,
    MediumHit,
    LightHit,
    Punch,
    Bend,
    Upset,
    Shrink,
    /// Any hit strength. Never performed, only used to match rules.
    Hit,
}

impl Move {
    /// The concrete moves, in the fixed order the solver iterates them.
    pub const PALETTE: [Move; 8] = [
        Move::Draw,
        Move::HardHit,
        Move::MediumHit,
        Move::LightHit,
        Move::Punch,
        Move::Bend,
        Move::Upset,
        Move::Shrink,
    ];

    /// The three hit strengths a generic hit stands for.
    pub const HITS: [Move; 3] = [Move::HardHit, Move::MediumHit, Move::LightHit];

    /// Effect on progress.
    #[inline]
    pub const fn delta(self) -> Delta {
        match self {
            Move::Draw => -15,
            Move::HardHit => -9,
            Move::MediumHit => -6,
            Move::LightHit => -3,
            Move::Punch => 2,
            Move::Bend => 7,
            Move::Upset => 13,
            Move::Shrink => 16,
            Move::Hit => 0,
        }
    }

    /// Stable identifier, matches the serde representation.
    pub const fn name(self) -> &'static str {
        match self {
            Move::Draw => "draw",
            Move::HardHit => "hard_hit",
            Move::MediumHit => "medium_hit",
            Move::LightHit => "light_hit",
            Move::Punch => "punch",
            Move::Bend => "bend",
            Move::Upset => "upset",
            Move::Shrink => "shrink",
            Move::Hit => "hit",
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Move::Draw => "Draw",
            Move::HardHit => "Hard Hit",
            Move::MediumHit => "Medium Hit",
            Move::LightHit => "Light Hit",
            Move::Punch => "Punch",
            Move::Bend => "Bend",
            Move::Upset => "Upset",
            Move::Shrink => "Shrink",
            Move::Hit => "Hit",
        }
    }

    /// Look up a concrete move by delta. Deltas in the palette are unique.
    pub fn from_delta(delta: Delta) -> Option<Move> {
        Move::PALETTE.into_iter().find(|m| m.delta() == delta)
    }

    /// Look up a move by its identifier.
    pub fn from_name(name: &str) -> Option<Move> {
        Move::PALETTE
            .into_iter()
            .chain([Move::Hit])
            .find(|m| m.name() == name)
    }

    /// Check if this is a hit of any strength (including the generic hit).
    #[inline]
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            Move::HardHit | Move::MediumHit | Move::LightHit | Move::Hit
        )
    }

    /// Convert a delta sequence back to moves, failing on unknown deltas.
    pub fn sequence_from_deltas(deltas: &[Delta]) -> Option<Vec<Move>> {
        deltas.iter().map(|&d| Move::from_delta(d)).collect()
    }
}

// ============================================================================
// RULES
// ============================================================================

/// One of the three trailing positions, counted back from the most recent move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Last = 0,
    SecondLast = 1,
    ThirdLast = 2,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Last, Slot::SecondLast, Slot::ThirdLast];

    /// Recency index (0 = most recent).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Convert from recency index (0, 1, 2).
    #[inline]
    pub fn from_index(idx: usize) -> Option<Slot> {
        match idx {
            0 => Some(Slot::Last),
            1 => Some(Slot::SecondLast),
            2 => Some(Slot::ThirdLast),
            _ => None,
        }
    }

    /// Index in a chronological window (0 = oldest, 2 = most recent).
    #[inline]
    pub fn window_index(self) -> usize {
        WINDOW - 1 - self.index()
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Last => "Last",
            Slot::SecondLast => "Second Last",
            Slot::ThirdLast => "Third Last",
        }
    }
}

/// The move class a rule asks for.
///
/// Hit strengths share one class: a rule can only ask
/// for "some hit".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleClass {
    Hit,
    Draw,
    Punch,
    Bend,
    Upset,
    Shrink,
}

impl RuleClass {
    /// The move this class stands for; `Hit` maps to the generic hit.
    pub fn as_move(self) -> Move {
        match self {
            RuleClass::Hit => Move::Hit,
            RuleClass::Draw => Move::Draw,
            RuleClass::Punch => Move::Punch,
            RuleClass::Bend => Move::Bend,
            RuleClass::Upset => Move::Upset,
            RuleClass::Shrink => Move::Shrink,
        }
    }

    #[inline]
    pub fn delta(self) -> Delta {
        self.as_move().delta()
    }

    /// Check if a performed move belongs to this class.
    pub fn matches(self, mov: Move) -> bool {
        match self {
            RuleClass::Hit => mov.is_hit(),
            _ => self.as_move() == mov,
        }
    }

    /// Next class in the UI cycle.
    pub fn next(self) -> RuleClass {
        match self {
            RuleClass::Hit => RuleClass::Draw,
            RuleClass::Draw => RuleClass::Punch,
            RuleClass::Punch => RuleClass::Bend,
            RuleClass::Bend => RuleClass::Upset,
            RuleClass::Upset => RuleClass::Shrink,
            RuleClass::Shrink => RuleClass::Hit,
        }
    }
}

/// Where in the trailing window a rule's move must appear.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    AtSlot(Slot),
    NotLast,
    Any,
}

impl Constraint {
    /// Next constraint in the UI cycle:
    /// Last -> Second Last -> Third Last -> Not Last -> Any -> Last.
    pub fn next(self) -> Constraint {
        match self {
            Constraint::AtSlot(Slot::Last) => Constraint::AtSlot(Slot::SecondLast),
            Constraint::AtSlot(Slot::SecondLast) => Constraint::AtSlot(Slot::ThirdLast),
            Constraint::AtSlot(Slot::ThirdLast) => Constraint::NotLast,
            Constraint::NotLast => Constraint::Any,
            Constraint::Any => Constraint::AtSlot(Slot::Last),
        }
    }

    /// Check if the move `recency` steps back (0 = most recent) satisfies this constraint.
    #[inline]
    pub fn admits(self, recency: usize) -> bool {
        match self {
            Constraint::AtSlot(slot) => slot.index() == recency,
            Constraint::NotLast => recency != 0 && recency < WINDOW,
            Constraint::Any => recency < WINDOW,
        }
    }

    /// Active-position triple, indexed by recency.
    pub fn indicators(self) -> [bool; 3] {
        [self.admits(0), self.admits(1), self.admits(2)]
    }

    /// Sort key: pinned constraints before looser ones.
    #[inline]
    pub(crate) fn rank(self) -> u8 {
        match self {
            Constraint::AtSlot(_) => 0,
            Constraint::NotLast => 1,
            Constraint::Any => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Constraint::AtSlot(slot) => slot.label(),
            Constraint::NotLast => "Not Last",
            Constraint::Any => "Any",
        }
    }
}

/// A rule: a move class at a constrained trailing position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub class: RuleClass,
    pub constraint: Constraint,
}

impl Rule {
    pub fn new(class: RuleClass, constraint: Constraint) -> Rule {
        Rule { class, constraint }
    }

    /// Default rule created when a user first touches an empty slot.
    pub fn new_for(slot: Slot) -> Rule {
        Rule::new(RuleClass::Hit, Constraint::AtSlot(slot))
    }

    /// Display text, e.g. "Bend Second Last".
    pub fn label(&self) -> String {
        format!("{} {}", self.class.as_move().label(), self.constraint.label())
    }
}

/// Up to three rules, indexed by slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(pub [Option<Rule>; 3]);

impl RuleSet {
    pub fn new() -> RuleSet {
        RuleSet::default()
    }

    /// Build from `(slot, rule)` pairs; later pairs overwrite earlier ones.
    pub fn from_rules(rules: impl IntoIterator<Item = (Slot, Rule)>) -> RuleSet {
        let mut set = RuleSet::new();
        for (slot, rule) in rules {
            set.set(slot, Some(rule));
        }
        set
    }

    #[inline]
    pub fn get(&self, slot: Slot) -> Option<Rule> {
        self.0[slot.index()]
    }

    #[inline]
    pub fn set(&mut self, slot: Slot, rule: Option<Rule>) {
        self.0[slot.index()] = rule;
    }

    pub fn clear(&mut self, slot: Slot) {
        self.set(slot, None);
    }

    /// Cycle the move class of a slot, creating a default rule if empty.
    pub fn cycle_class(&mut self, slot: Slot) {
        let rule = match self.get(slot) {
            Some(rule) => Rule::new(rule.class.next(), rule.constraint),
            None => Rule::new_for(slot),
        };
        self.set(slot, Some(rule));
    }

    /// Cycle the position constraint of a slot, creating a default rule if empty.
    pub fn cycle_constraint(&mut self, slot: Slot) {
        let rule = match self.get(slot) {
            Some(rule) => Rule::new(rule.class, rule.constraint.next()),
            None => Rule::new_for(slot),
        };
        self.set(slot, Some(rule));
    }

    /// Check if no slot holds a rule.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Iterate defined rules with their slots.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Rule)> + '_ {
        Slot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|rule| (slot, rule)))
    }
}

/// Apply `deltas` from `start` and check every partial sum stays in range.
pub fn is_range_safe(start: i32, deltas: &[Delta]) -> bool {
    if !in_range(start) {
        return false;
    }
    let mut pos = start;
    deltas.iter().all(|&d| {
        pos += d;
        in_range(pos)
    })
}
