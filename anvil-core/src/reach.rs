//! Reachability table: minimal move sequences from a fixed start.
//!
//! Positions are nodes, moves are unit-weight edges. The table is built by
//! relaxing every `(move, position)` pair until a full pass changes nothing.
//! Moves are visited in the order given and positions in ascending order;
//! an entry is only replaced by a strictly shorter sequence, so among equal
//! length sequences the first one found is kept.

use crate::{Delta, MAX_PROGRESS, MIN_PROGRESS};

/// How the start position is seeded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveMode {
    /// The start is reachable with zero moves.
    Normal,
    /// At least one move must be taken; the start is only reachable by
    /// leaving it and coming back.
    MandatoryFirst,
}

/// Minimal delta sequence to every position of a bounded range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachTable {
    start: i32,
    mode: SolveMode,
    min: i32,
    max: i32,
    paths: Vec<Option<Vec<Delta>>>,
}

impl ReachTable {
    #[inline]
    fn slot(&self, pos: i32) -> Option<usize> {
        if pos < self.min || pos > self.max {
            None
        } else {
            Some((pos - self.min) as usize)
        }
    }

    /// Sequence of deltas (application order) reaching `pos`, if reachable.
    pub fn get(&self, pos: i32) -> Option<&[Delta]> {
        self.slot(pos)
            .and_then(|i| self.paths[i].as_deref())
    }

    /// Minimal move count to `pos`.
    pub fn distance(&self, pos: i32) -> Option<usize> {
        self.get(pos).map(<[Delta]>::len)
    }

    pub fn is_reachable(&self, pos: i32) -> bool {
        self.get(pos).is_some()
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn mode(&self) -> SolveMode {
        self.mode
    }

    /// Inclusive range covered by the table.
    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// Iterate `(position, sequence)` for every reachable position.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[Delta])> + '_ {
        self.paths
            .iter()
            .enumerate()
            .filter_map(move |(i, p)| p.as_deref().map(|seq| (self.min + i as i32, seq)))
    }
}

/// Solve over the legal progress range.
pub fn solve(moves: &[Delta], start: i32, mode: SolveMode) -> ReachTable {
    solve_in(moves, start, mode, MIN_PROGRESS, MAX_PROGRESS)
}

/// Solve over `[min, max]`.
pub fn solve_in(moves: &[Delta], start: i32, mode: SolveMode, min: i32, max: i32) -> ReachTable {
    debug_assert!(min <= max);
    let span = (max - min) as usize + 1;
    let mut table = ReachTable {
        start,
        mode,
        min,
        max,
        paths: vec![None; span],
    };

    let Some(origin) = table.slot(start) else {
        return table;
    };

    match mode {
        SolveMode::Normal => table.paths[origin] = Some(Vec::new()),
        SolveMode::MandatoryFirst => {
            for &v in moves {
                if let Some(i) = table.slot(start + v) {
                    if table.paths[i].is_none() {
                        table.paths[i] = Some(vec![v]);
                    }
                }
            }
        }
    }

    // Unit weights: converges in at most `span` passes.
    for _ in 0..span {
        let mut changed = false;
        for &v in moves {
            for j in min..=max {
                let (Some(from), Some(to)) = (table.slot(j - v), table.slot(j)) else {
                    continue;
                };
                let relaxed = match (&table.paths[from], &table.paths[to]) {
                    (Some(via), Some(best)) if via.len() + 1 < best.len() => via,
                    (Some(via), None) => via,
                    _ => continue,
                };
                let mut seq = Vec::with_capacity(relaxed.len() + 1);
                seq.extend_from_slice(relaxed);
                seq.push(v);
                table.paths[to] = Some(seq);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    table
}
