//! Randomised property checks for the planner.
//!
//! - Reachability entries land on their position, stay in range, and are
//!   as short as a plain BFS says they can be.
//! - Plans are range safe, deterministic and satisfy the rules.
//! - Without rules, plans are as short as the BFS distance.

use std::collections::VecDeque;

use rand::prelude::*;

use anvil_core::reach::solve_in;
use anvil_core::{
    is_range_safe, plan, solve, validate, Constraint, Delta, Move, Rule, RuleClass, RuleSet,
    Session, Slot, SolveMode, MAX_PROGRESS, MIN_PROGRESS,
};

const ITERATIONS: usize = 200;

fn palette() -> Vec<Delta> {
    Move::PALETTE.iter().map(|m| m.delta()).collect()
}

/// Unweighted shortest-path distances by breadth-first search.
fn bfs(moves: &[Delta], start: i32, mode: SolveMode, min: i32, max: i32) -> Vec<Option<usize>> {
    let span = (max - min + 1) as usize;
    let mut dist = vec![None; span];
    let mut queue = VecDeque::new();
    match mode {
        SolveMode::Normal => {
            dist[(start - min) as usize] = Some(0);
            queue.push_back(start);
        }
        SolveMode::MandatoryFirst => {
            for &v in moves {
                let p = start + v;
                if (min..=max).contains(&p) && dist[(p - min) as usize].is_none() {
                    dist[(p - min) as usize] = Some(1);
                    queue.push_back(p);
                }
            }
        }
    }
    while let Some(p) = queue.pop_front() {
        let d = dist[(p - min) as usize].unwrap();
        for &v in moves {
            let q = p + v;
            if (min..=max).contains(&q) && dist[(q - min) as usize].is_none() {
                dist[(q - min) as usize] = Some(d + 1);
                queue.push_back(q);
            }
        }
    }
    dist
}

fn random_rules<R: Rng>(rng: &mut R) -> RuleSet {
    const CLASSES: [RuleClass; 6] = [
        RuleClass::Hit,
        RuleClass::Draw,
        RuleClass::Punch,
        RuleClass::Bend,
        RuleClass::Upset,
        RuleClass::Shrink,
    ];
    const CONSTRAINTS: [Constraint; 5] = [
        Constraint::AtSlot(Slot::Last),
        Constraint::AtSlot(Slot::SecondLast),
        Constraint::AtSlot(Slot::ThirdLast),
        Constraint::NotLast,
        Constraint::Any,
    ];
    let mut rules = RuleSet::new();
    for slot in Slot::ALL {
        if rng.random_bool(0.5) {
            let class = CLASSES[rng.random_range(0..CLASSES.len())];
            let constraint = CONSTRAINTS[rng.random_range(0..CONSTRAINTS.len())];
            rules.set(slot, Some(Rule::new(class, constraint)));
        }
    }
    rules
}

fn random_history<R: Rng>(rng: &mut R) -> Vec<Move> {
    let len = rng.random_range(0..5);
    (0..len)
        .map(|_| Move::PALETTE[rng.random_range(0..Move::PALETTE.len())])
        .collect()
}

#[test]
fn test_reach_matches_bfs_small_ranges() {
    let mut rng = rand::rng();
    for _ in 0..ITERATIONS {
        let max = rng.random_range(5..40);
        let count = rng.random_range(1..4);
        let moves: Vec<Delta> = (0..count)
            .map(|_| {
                let m = rng.random_range(1..8);
                if rng.random_bool(0.5) { m } else { -m }
            })
            .collect();
        let start = rng.random_range(0..=max);
        for mode in [SolveMode::Normal, SolveMode::MandatoryFirst] {
            let table = solve_in(&moves, start, mode, 0, max);
            let expected = bfs(&moves, start, mode, 0, max);
            for pos in 0..=max {
                let got = table.get(pos);
                assert_eq!(
                    got.map(<[Delta]>::len),
                    expected[pos as usize],
                    "moves={:?} start={} pos={} mode={:?}",
                    moves,
                    start,
                    pos,
                    mode
                );
                if let Some(seq) = got {
                    assert_eq!(start + seq.iter().sum::<i32>(), pos);
                    assert!(is_range_safe(start, seq));
                }
            }
        }
    }
}

#[test]
fn test_reach_matches_bfs_full_palette() {
    let moves = palette();
    for start in (MIN_PROGRESS..=MAX_PROGRESS).step_by(7) {
        let table = solve(&moves, start, SolveMode::Normal);
        let expected = bfs(&moves, start, SolveMode::Normal, MIN_PROGRESS, MAX_PROGRESS);
        for pos in MIN_PROGRESS..=MAX_PROGRESS {
            assert_eq!(table.distance(pos), expected[pos as usize], "start={} pos={}", start, pos);
        }
    }
}

#[test]
fn test_plans_are_safe_and_satisfy_rules() {
    let mut rng = rand::rng();
    let mut planned = 0;
    for _ in 0..ITERATIONS {
        let rules = random_rules(&mut rng);
        let history = random_history(&mut rng);
        let start = rng.random_range(MIN_PROGRESS..=MAX_PROGRESS);
        let target = if rng.random_bool(0.2) {
            start
        } else {
            rng.random_range(MIN_PROGRESS..=MAX_PROGRESS)
        };
        let valid = validate(&history, &rules).valid;

        let first = plan(start, target, &rules, valid);
        let second = plan(start, target, &rules, valid);
        assert_eq!(first, second, "planner not deterministic");

        let Some(hints) = first else { continue };
        planned += 1;
        let deltas = hints.deltas();
        assert!(is_range_safe(start, &deltas), "{:?} from {}", deltas, start);
        assert_eq!(start + deltas.iter().sum::<i32>(), target);

        let mut performed = history.clone();
        performed.extend(hints.plan());
        assert!(
            validate(&performed, &rules).valid,
            "rules {:?} not satisfied by {:?}",
            rules,
            performed
        );
    }
    assert!(planned > 0);
}

#[test]
fn test_unconstrained_plans_are_minimal() {
    let mut rng = rand::rng();
    let moves = palette();
    for _ in 0..ITERATIONS {
        let start = rng.random_range(MIN_PROGRESS..=MAX_PROGRESS);
        let target = rng.random_range(MIN_PROGRESS..=MAX_PROGRESS);
        let expected = bfs(&moves, start, SolveMode::Normal, MIN_PROGRESS, MAX_PROGRESS);
        let hints = plan(start, target, &RuleSet::new(), true).expect("every position reachable");
        assert_eq!(Some(hints.len()), expected[target as usize]);
    }
}

#[test]
fn test_following_hints_reaches_target() {
    let mut rng = rand::rng();
    for _ in 0..ITERATIONS {
        let rules = random_rules(&mut rng);
        let start = rng.random_range(MIN_PROGRESS..=MAX_PROGRESS);
        let target = rng.random_range(MIN_PROGRESS..=MAX_PROGRESS);
        let mut session = Session::with(start, target, rules);
        let Some(hints) = session.hints().cloned() else { continue };
        for mov in hints.plan() {
            assert_eq!(session.hints().and_then(|h| h.next()), Some(mov));
            assert!(session.perform(mov));
        }
        assert!(session.is_done(), "start={} target={} rules={:?}", start, target, rules);
    }
}
