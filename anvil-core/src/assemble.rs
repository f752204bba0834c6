//! Splice a required ending onto a reachability path.
//!
//! The table path to the target is accepted when its last `k` deltas are a
//! rearrangement of the `k`-long ending; the tail is then replaced by the
//! ending in order. Otherwise the ending's last delta is peeled off, the
//! target moves back by that delta, and the shorter ending is retried
//! there, with the peeled deltas appended after. Once only one delta is
//! left and it still does not match, the attempt fails, except in
//! mandatory-first mode: there the last delta is peeled too and the whole
//! ending is appended to the table path before it.

use crate::reach::{ReachTable, SolveMode};
use crate::{Delta, WINDOW};

/// Check if `tail` and `ending` hold the same deltas, ignoring order.
fn same_multiset(tail: &[Delta], ending: &[Delta]) -> bool {
    if tail.len() != ending.len() {
        return false;
    }
    let mut a = tail.to_vec();
    let mut b = ending.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

fn concat(parts: &[&[Delta]]) -> Vec<Delta> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

fn peel(
    table: &ReachTable,
    target: i32,
    ending: &[Delta],
    tail: &[Delta],
    depth: usize,
    out: &mut Vec<Vec<Delta>>,
) {
    if depth >= WINDOW {
        return;
    }
    let (Some(path), Some((&last, rest))) = (table.get(target), ending.split_last()) else {
        return;
    };

    if path.len() >= ending.len() {
        let (prefix, window) = path.split_at(path.len() - ending.len());
        if same_multiset(window, ending) {
            out.push(concat(&[prefix, ending, tail]));
        }
    }

    let tail = concat(&[&[last], tail]);
    if !rest.is_empty() {
        peel(table, target - last, rest, &tail, depth + 1, out);
    } else if table.mode() == SolveMode::MandatoryFirst {
        // The ending itself supplies the mandatory move.
        let before = target - last;
        let path = if before == table.start() {
            Some(&[][..])
        } else {
            table.get(before)
        };
        if let Some(path) = path {
            out.push(concat(&[path, &tail]));
        }
    }
}

/// Every assembly of `ending` onto a path to `target`, in preference
/// order: direct suffix match first, then by increasing peel depth.
///
/// Each result reaches `target` from the table's start and ends with
/// `ending` in order. Range safety of the reordered tail is not checked.
pub fn assemblies(table: &ReachTable, target: i32, ending: &[Delta]) -> Vec<Vec<Delta>> {
    if ending.is_empty() {
        return table.get(target).map(<[Delta]>::to_vec).into_iter().collect();
    }
    let mut out = Vec::new();
    peel(table, target, ending, &[], 0, &mut out);
    out
}

/// The preferred assembly of `ending` onto a path to `target`.
pub fn assemble(table: &ReachTable, target: i32, ending: &[Delta]) -> Option<Vec<Delta>> {
    assemblies(table, target, ending).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reach::{solve, solve_in, SolveMode};
    use crate::Move;

    fn palette() -> Vec<Delta> {
        Move::PALETTE.iter().map(|m| m.delta()).collect()
    }

    #[test]
    fn test_empty_ending_is_table_path() {
        let table = solve(&palette(), 0, SolveMode::Normal);
        assert_eq!(assemble(&table, 1, &[]), table.get(1).map(<[Delta]>::to_vec));
    }

    #[test]
    fn test_direct_match_reorders_tail() {
        let table = solve(&palette(), 0, SolveMode::Normal);
        // Table path to 1 is shrink then draw; require draw last, then shrink last.
        assert_eq!(assemble(&table, 1, &[16, -15]), Some(vec![16, -15]));
        assert_eq!(assemble(&table, 1, &[-15, 16]), Some(vec![-15, 16]));
    }

    #[test]
    fn test_direct_match_on_partial_tail() {
        let table = solve_in(&[2, 7], 0, SolveMode::Normal, 0, 30);
        assert_eq!(table.get(11), Some(&[2, 2, 7][..]));
        assert_eq!(assemble(&table, 11, &[7, 2]), Some(vec![2, 7, 2]));
    }

    #[test]
    fn test_peel_when_tail_differs() {
        // Path to 16 is punch, bend, bend. A trailing punch is peeled, the
        // bend is found at the end of the path to 14, and punch appended.
        let table = solve_in(&[2, 7], 0, SolveMode::Normal, 0, 30);
        assert_eq!(table.get(16), Some(&[2, 7, 7][..]));
        assert_eq!(table.get(14), Some(&[7, 7][..]));
        assert_eq!(assemble(&table, 16, &[7, 2]), Some(vec![7, 7, 2]));
    }

    #[test]
    fn test_single_delta_never_peels() {
        let table = solve_in(&[2, 7], 0, SolveMode::Normal, 0, 30);
        assert_eq!(assemble(&table, 11, &[2]), None);
    }

    #[test]
    fn test_mandatory_first_peels_to_empty_ending() {
        // The cycle back to 50 does not end with a hard hit, so the hard
        // hit is appended to the path to 59.
        let table = solve(&palette(), 50, SolveMode::MandatoryFirst);
        assert_ne!(table.get(50).and_then(|c| c.last()), Some(&-9));
        let seq = assemble(&table, 50, &[-9]).expect("cycle ending in a hard hit");
        assert_eq!(seq.last(), Some(&-9));
        assert_eq!(seq.iter().sum::<i32>(), 0);
        assert_eq!(&seq[..seq.len() - 1], table.get(59).unwrap());
    }

    #[test]
    fn test_mandatory_first_ending_that_returns_to_start() {
        let table = solve(&palette(), 50, SolveMode::MandatoryFirst);
        let ending = [7, 2, -9];
        assert!(assemblies(&table, 50, &ending).contains(&ending.to_vec()));
    }

    #[test]
    fn test_unreachable_target() {
        let table = solve_in(&[2], 0, SolveMode::Normal, 0, 10);
        assert_eq!(assemble(&table, 5, &[]), None);
        assert_eq!(assemble(&table, 5, &[2]), None);
    }

    #[test]
    fn test_shrink_last_near_top_fails() {
        let table = solve(&palette(), 148, SolveMode::Normal);
        assert_eq!(table.get(150), Some(&[2][..]));
        assert_eq!(assemble(&table, 150, &[16]), None);
    }

    #[test]
    fn test_assemblies_all_end_with_ending() {
        let table = solve(&palette(), 60, SolveMode::Normal);
        let ending = [7, 16];
        let mut found = 0;
        for target in 0..=150 {
            for seq in assemblies(&table, target, &ending) {
                assert!(seq.ends_with(&ending), "{:?}", seq);
                assert_eq!(60 + seq.iter().sum::<i32>(), target);
                found += 1;
            }
        }
        assert!(found > 0);
    }

    #[test]
    fn test_same_multiset() {
        assert!(same_multiset(&[1, 2, 2], &[2, 1, 2]));
        assert!(!same_multiset(&[1, 2], &[2, 2]));
        assert!(!same_multiset(&[1], &[1, 1]));
    }
}
