//! Enumerate concrete trailing move sequences that satisfy a rule set.
//!
//! The three rule slots form a chronological window (index 0 = third last,
//! index 2 = last, see [`Slot::window_index`](crate::Slot::window_index)).
//! Every ordering of that window is tested against the rules' position
//! constraints; each surviving ordering is translated to tokens, leading
//! wildcards are dropped, and remaining wildcards and generic hits are
//! expanded into concrete deltas.
//!
//! Output order is deterministic: orderings in lexicographic permutation
//! order, then breadth-first expansion with alternatives in palette order.
//! Duplicates keep their first position.

use std::collections::{HashSet, VecDeque};

use tracing::warn;

use crate::{Constraint, Delta, Move, Rule, RuleSet, Slot, WINDOW};

/// Upper bound on worklist steps for one enumeration.
const MAX_EXPANSION_STEPS: usize = 1 << 14;

/// All orderings of a 3-element window, lexicographic.
const PERMUTATIONS: [[usize; WINDOW]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// A window position before expansion.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Token {
    /// No rule: any concrete move.
    Wild,
    /// Generic hit: one of the three hit strengths.
    Hit,
    Exact(Delta),
}

impl Token {
    fn from_rule(rule: Option<Rule>) -> Token {
        match rule {
            None => Token::Wild,
            Some(rule) => match rule.class.as_move() {
                Move::Hit => Token::Hit,
                m => Token::Exact(m.delta()),
            },
        }
    }

    fn alternatives(self) -> &'static [Move] {
        match self {
            Token::Wild => &Move::PALETTE,
            Token::Hit => &Move::HITS,
            Token::Exact(_) => &[],
        }
    }
}

/// Chronological window of rules: index 0 = third last, index 2 = last.
fn window(rules: &RuleSet) -> [Option<Rule>; WINDOW] {
    let mut window = [None; WINDOW];
    for slot in Slot::ALL {
        window[slot.window_index()] = rules.get(slot);
    }
    window
}

/// Check if placing `window[perm[i]]` at chronological index `i` respects
/// every pinned and not-last constraint.
fn ordering_admissible(window: &[Option<Rule>; WINDOW], perm: &[usize; WINDOW]) -> bool {
    perm.iter().enumerate().all(|(pos, &src)| match window[src] {
        None => true,
        Some(rule) => match rule.constraint {
            Constraint::AtSlot(slot) => pos == slot.window_index(),
            Constraint::NotLast => pos != WINDOW - 1,
            Constraint::Any => true,
        },
    })
}

/// Every concrete delta sequence (length 0 to 3) whose arrangement as the
/// trailing moves satisfies `rules`.
///
/// An empty rule set yields a single empty ending. Contradictory rules
/// (for example two rules pinned to the same slot) yield no endings.
pub fn enumerate_endings(rules: &RuleSet) -> Vec<Vec<Delta>> {
    let window = window(rules);

    let mut pending: VecDeque<Vec<Token>> = VecDeque::new();
    for perm in PERMUTATIONS.iter() {
        if !ordering_admissible(&window, perm) {
            continue;
        }
        let tokens: Vec<Token> = perm
            .iter()
            .map(|&src| Token::from_rule(window[src]))
            .skip_while(|&t| t == Token::Wild)
            .collect();
        if !pending.contains(&tokens) {
            pending.push_back(tokens);
        }
    }

    let mut endings = Vec::new();
    let mut seen: HashSet<Vec<Delta>> = HashSet::new();
    let mut steps = 0;

    while let Some(tokens) = pending.pop_front() {
        steps += 1;
        if steps > MAX_EXPANSION_STEPS {
            warn!(steps, "ending expansion exceeded step limit; truncating");
            break;
        }
        let concrete: Option<Vec<Delta>> = tokens
            .iter()
            .map(|t| match t {
                Token::Exact(d) => Some(*d),
                _ => None,
            })
            .collect();
        match concrete {
            Some(ending) => {
                if seen.insert(ending.clone()) {
                    endings.push(ending);
                }
            }
            None => {
                let Some(i) = tokens.iter().position(|t| !matches!(t, Token::Exact(_))) else {
                    continue;
                };
                for alt in tokens[i].alternatives() {
                    let mut next = tokens.clone();
                    next[i] = Token::Exact(alt.delta());
                    pending.push_back(next);
                }
            }
        }
    }

    endings
}
