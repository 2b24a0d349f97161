//! The search driver (spec §4.5): classify a grid as solved, unsolvable, or
//! needing a branch, and recurse on deep copies under a budgeted node count.

use std::time::Instant;

use log::{debug, info, trace};

use crate::cell::{Cell, CellState, Pos, SegmentId};
use crate::grid::Grid;
use crate::place;
use crate::propagate;
use crate::views::{self, available_count, empty_count, star_count};

/// Node-expansion ceiling named in spec §4.5.
pub const DEFAULT_BUDGET: usize = 50_000;

/// The request-scoped, explicitly-threaded node counter described in spec
/// §9: replaces a process-wide static with a value the caller owns, so two
/// solves never interfere with each other's budgets.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext {
    pub expansions: usize,
    pub budget: usize,
}

impl SearchContext {
    #[must_use]
    pub const fn new(budget: usize) -> Self {
        Self {
            expansions: 0,
            budget,
        }
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Solved,
    Unsolvable,
    Branch,
}

/// Solves `grid`, using a fresh [`SearchContext`] with the default budget.
#[must_use]
pub fn solve(grid: &Grid) -> (Grid, bool) {
    let mut ctx = SearchContext::default();
    solve_with(grid, &mut ctx)
}

/// Solves `grid`, threading an explicit [`SearchContext`] so the caller
/// controls (and can inspect) the node-expansion budget.
pub fn solve_with(grid: &Grid, ctx: &mut SearchContext) -> (Grid, bool) {
    let start = Instant::now();
    info!(
        "search starting: {}x{} grid, k={}, budget={}",
        grid.width(),
        grid.height(),
        grid.k(),
        ctx.budget
    );
    let (result, solved) = frame(grid.clone(), ctx);
    info!(
        "search finished: solved={solved} expansions={} elapsed={:?}",
        ctx.expansions,
        start.elapsed()
    );
    (result, solved)
}

/// One frame of the search: `{propagate -> classify -> branch}`.
fn frame(mut grid: Grid, ctx: &mut SearchContext) -> (Grid, bool) {
    if propagate::run(&mut grid).is_contradiction() {
        trace!("frame: propagation found a contradiction");
        return (grid, false);
    }

    match classify(&grid) {
        Classification::Solved => {
            debug!("frame: solved");
            return (grid, true);
        }
        Classification::Unsolvable => {
            debug!("frame: unsolvable");
            return (grid, false);
        }
        Classification::Branch => {}
    }

    for pos in branch_candidates(&grid) {
        if ctx.expansions >= ctx.budget {
            debug!("frame: budget exhausted at {} expansions", ctx.expansions);
            return (grid, false);
        }
        ctx.expansions += 1;
        trace!("frame: branching on {pos}");

        let mut placed = grid.clone();
        if place::place_star(&mut placed, pos).is_ok() {
            let (result, solved) = frame(placed, ctx);
            if solved {
                return (result, true);
            }
        }

        let mut eliminated = grid.clone();
        if eliminated.set_state(pos, CellState::Eliminated).is_ok() {
            let (result, solved) = frame(eliminated, ctx);
            if solved {
                return (result, true);
            }
        }
    }

    (grid, false)
}

/// *Solved*: every row, column, and segment has exactly `k` stars and no two
/// starred cells are king-adjacent (`I3`).
/// *Unsolvable*: any group has more than `k` stars, any group has fewer than
/// `k` available cells (`I4`), or any two starred cells are king-adjacent.
fn classify(grid: &Grid) -> Classification {
    let k = grid.k();
    let mut saturated = true;

    for row in 0..grid.height() {
        if !check_group(&views::row(grid, row), k, &mut saturated) {
            return Classification::Unsolvable;
        }
    }
    for col in 0..grid.width() {
        if !check_group(&views::column(grid, col), k, &mut saturated) {
            return Classification::Unsolvable;
        }
    }
    for seg in views::segment_ids(grid) {
        if !check_group(&views::segment(grid, seg), k, &mut saturated) {
            return Classification::Unsolvable;
        }
    }

    if has_adjacent_stars(grid) {
        return Classification::Unsolvable;
    }

    if saturated {
        Classification::Solved
    } else {
        Classification::Branch
    }
}

/// Returns `false` on an outright contradiction (`stars > k` or `I4`
/// violated); otherwise clears `*saturated` when this group still has work
/// left and returns `true`.
fn check_group(cells: &[Cell], k: usize, saturated: &mut bool) -> bool {
    let stars = star_count(cells);
    let avail = available_count(cells);
    if stars > k || avail < k {
        return false;
    }
    if stars != k {
        *saturated = false;
    }
    true
}

fn has_adjacent_stars(grid: &Grid) -> bool {
    let starred: Vec<Pos> = grid
        .cells()
        .filter(|c| c.state == CellState::Starred)
        .map(|c| c.pos)
        .collect();
    for (i, &a) in starred.iter().enumerate() {
        for &b in &starred[i + 1..] {
            if a.is_king_adjacent(b) {
                return true;
            }
        }
    }
    false
}

/// The variable-ordering heuristic of spec §4.5: segments ascending by
/// `empty(seg)` (ties broken by segment size), and within each segment,
/// Empty cells ascending by their count of available king-neighbors.
fn branch_candidates(grid: &Grid) -> Vec<Pos> {
    let mut segments: Vec<(SegmentId, usize, usize)> = views::segment_ids(grid)
        .into_iter()
        .map(|seg| {
            let cells = views::segment(grid, seg);
            (seg, empty_count(&cells), cells.len())
        })
        .filter(|&(_, empty, _)| empty > 0)
        .collect();
    segments.sort_by_key(|&(_, empty, size)| (empty, size));

    let mut candidates = Vec::new();
    for (seg, _, _) in segments {
        let mut empties: Vec<Cell> = views::segment(grid, seg)
            .into_iter()
            .filter(|c| c.state == CellState::Empty)
            .collect();
        empties.sort_by_key(|c| available_king_neighbor_count(grid, c.pos));
        candidates.extend(empties.into_iter().map(|c| c.pos));
    }
    candidates
}

fn available_king_neighbor_count(grid: &Grid, pos: Pos) -> usize {
    pos.king_neighbors(grid.height(), grid.width())
        .filter(|&n| grid.get(n).is_ok_and(|c| c.state.is_available()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::SegmentId;

    fn s(c: char) -> SegmentId {
        SegmentId::new(c)
    }

    #[test]
    fn trivial_one_by_one_solves_with_a_star() {
        // Scenario S2.
        let g = Grid::new(1, 1, 1, &[vec![s('A')]]);
        let (result, solved) = solve(&g);
        assert!(solved);
        assert_eq!(result.get(Pos::new(0, 0)).unwrap().state, CellState::Starred);
    }

    #[test]
    fn five_by_five_easy_has_a_unique_solution() {
        // Scenario S1.
        let g = Grid::new(
            5,
            5,
            1,
            &[
                vec![s('A'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('D'), s('E'), s('E'), s('B')],
                vec![s('D'), s('D'), s('E'), s('E'), s('D')],
                vec![s('D'), s('D'), s('D'), s('D'), s('D')],
            ],
        );
        let (result, solved) = solve(&g);
        assert!(solved);
        let expected_stars = [
            Pos::new(0, 1),
            Pos::new(1, 3),
            Pos::new(2, 0),
            Pos::new(3, 2),
            Pos::new(4, 4),
        ];
        for pos in expected_stars {
            assert_eq!(result.get(pos).unwrap().state, CellState::Starred);
        }
        for row in 0..5 {
            assert_eq!(star_count(&views::row(&result, row)), 1);
        }
        for col in 0..5 {
            assert_eq!(star_count(&views::column(&result, col)), 1);
        }
        // P1's segment clause: every segment has exactly k=1 stars.
        for seg in views::segment_ids(&result) {
            assert_eq!(star_count(&views::segment(&result, seg)), 1);
        }
        // P2: no two starred cells are king-adjacent.
        for (i, &a) in expected_stars.iter().enumerate() {
            for &b in &expected_stars[i + 1..] {
                assert!(!a.is_king_adjacent(b), "stars at {a} and {b} are adjacent");
            }
        }
    }

    #[test]
    fn two_by_two_same_segment_is_unsolvable() {
        // Scenario S3: one segment covering all four cells, k=1 — a star
        // anywhere eliminates the rest of the segment by king-adjacency,
        // leaving the opposite row/column impossible to fill.
        let g = Grid::new(2, 2, 1, &[vec![s('A'), s('A')], vec![s('A'), s('A')]]);
        let (_, solved) = solve(&g);
        assert!(!solved);
    }

    #[test]
    fn already_solved_grid_needs_no_branching() {
        // Scenario S5: pre-place S1's solution and confirm no expansions
        // are spent recognizing it.
        let mut g = Grid::new(
            5,
            5,
            1,
            &[
                vec![s('A'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('D'), s('E'), s('E'), s('B')],
                vec![s('D'), s('D'), s('E'), s('E'), s('D')],
                vec![s('D'), s('D'), s('D'), s('D'), s('D')],
            ],
        );
        for pos in [
            Pos::new(0, 1),
            Pos::new(1, 3),
            Pos::new(2, 0),
            Pos::new(3, 2),
            Pos::new(4, 4),
        ] {
            g.set_state(pos, CellState::Starred).unwrap();
        }
        let mut ctx = SearchContext::default();
        let (result, solved) = solve_with(&g, &mut ctx);
        assert!(solved);
        assert_eq!(ctx.expansions, 0);

        // Propagation still fires on the already-placed stars (eliminating
        // the remaining Empty cells each saturated group leaves behind);
        // what must not happen is any search *branching*.
        let mut expected = g.clone();
        propagate::run(&mut expected);
        assert_eq!(result, expected);
    }

    #[test]
    fn zero_budget_gives_up_without_branching() {
        let g = Grid::new(
            5,
            5,
            1,
            &[
                vec![s('A'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('D'), s('E'), s('E'), s('B')],
                vec![s('D'), s('D'), s('E'), s('E'), s('D')],
                vec![s('D'), s('D'), s('D'), s('D'), s('D')],
            ],
        );
        let mut ctx = SearchContext::new(0);
        let (_, solved) = solve_with(&g, &mut ctx);
        assert!(!solved);
    }
}
