//! The local propagator: rules `R1..R4` of spec §4.3, run to a fixed point.

use log::{debug, trace};

use crate::cell::{Cell, CellState, Pos};
use crate::grid::Grid;
use crate::views::{self, available_count, empty_count, star_count};

/// Result of running the propagator on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationOutcome {
    /// At least one cell's state changed during the run.
    Changed,
    /// A full pass produced no change; the grid is at a fixed point.
    Unchanged,
    /// The grid is provably unsolvable (a group over-saturated, or a group
    /// no longer has enough available cells to reach `k` stars, `I4`).
    Contradiction,
}

impl PropagationOutcome {
    #[must_use]
    pub const fn is_contradiction(self) -> bool {
        matches!(self, PropagationOutcome::Contradiction)
    }
}

/// Runs rules `R1..R4` to a fixed point, in place.
///
/// Determinism (spec §4.3): the rules are monotone, so the order they are
/// applied in within a pass never changes the resulting fixed point — only
/// how many passes it takes to get there.
pub fn run(grid: &mut Grid) -> PropagationOutcome {
    let mut ever_changed = false;
    loop {
        match one_pass(grid) {
            PropagationOutcome::Contradiction => return PropagationOutcome::Contradiction,
            PropagationOutcome::Changed => ever_changed = true,
            PropagationOutcome::Unchanged => {
                debug!("propagation reached a fixed point");
                return if ever_changed {
                    PropagationOutcome::Changed
                } else {
                    PropagationOutcome::Unchanged
                };
            }
        }
    }
}

fn one_pass(grid: &mut Grid) -> PropagationOutcome {
    let mut changed = false;

    for row in 0..grid.height() {
        match apply_group_rules(grid, views::row(grid, row), "row", row) {
            PropagationOutcome::Contradiction => return PropagationOutcome::Contradiction,
            PropagationOutcome::Changed => changed = true,
            PropagationOutcome::Unchanged => {}
        }
    }
    for col in 0..grid.width() {
        match apply_group_rules(grid, views::column(grid, col), "column", col) {
            PropagationOutcome::Contradiction => return PropagationOutcome::Contradiction,
            PropagationOutcome::Changed => changed = true,
            PropagationOutcome::Unchanged => {}
        }
    }
    for seg in views::segment_ids(grid) {
        let cells = views::segment(grid, seg);
        match apply_group_rules(grid, cells, "segment", seg.token() as usize) {
            PropagationOutcome::Contradiction => return PropagationOutcome::Contradiction,
            PropagationOutcome::Changed => changed = true,
            PropagationOutcome::Unchanged => {}
        }
    }

    match apply_adjacency_rule(grid) {
        PropagationOutcome::Contradiction => return PropagationOutcome::Contradiction,
        PropagationOutcome::Changed => changed = true,
        PropagationOutcome::Unchanged => {}
    }

    match apply_intersection_rules(grid) {
        PropagationOutcome::Contradiction => return PropagationOutcome::Contradiction,
        PropagationOutcome::Changed => changed = true,
        PropagationOutcome::Unchanged => {}
    }

    if changed {
        PropagationOutcome::Changed
    } else {
        PropagationOutcome::Unchanged
    }
}

/// `R1` (saturated) and `R2` (forced) for one group, plus the `I4`
/// contradiction check.
fn apply_group_rules(
    grid: &mut Grid,
    cells: Vec<Cell>,
    kind: &str,
    id: usize,
) -> PropagationOutcome {
    let k = grid.k();
    let stars = star_count(&cells);
    let empties = empty_count(&cells);

    if stars > k || available_count(&cells) < k {
        trace!("contradiction in {kind} {id}: stars={stars} available={}", available_count(&cells));
        return PropagationOutcome::Contradiction;
    }

    let mut changed = false;

    if stars == k && empties > 0 {
        // R1: saturated group, eliminate the rest.
        for cell in &cells {
            if cell.state == CellState::Empty {
                set_or_contradict(grid, cell.pos, CellState::Eliminated);
                changed = true;
            }
        }
        trace!("R1 fired on {kind} {id}");
    } else if stars + empties == k && empties > 0 {
        // R2: forced group, star everything left.
        for cell in &cells {
            if cell.state == CellState::Empty {
                set_or_contradict(grid, cell.pos, CellState::Starred);
                changed = true;
            }
        }
        trace!("R2 fired on {kind} {id}");
    }

    if changed {
        PropagationOutcome::Changed
    } else {
        PropagationOutcome::Unchanged
    }
}

/// `R3`: every empty king-neighbor of a starred cell is eliminated.
fn apply_adjacency_rule(grid: &mut Grid) -> PropagationOutcome {
    let starred: Vec<Pos> = grid
        .cells()
        .filter(|c| c.state == CellState::Starred)
        .map(|c| c.pos)
        .collect();

    let mut changed = false;
    for pos in starred {
        for neighbor in pos.king_neighbors(grid.height(), grid.width()) {
            if grid.get(neighbor).unwrap().state == CellState::Empty {
                grid.set_state(neighbor, CellState::Eliminated).unwrap();
                changed = true;
            }
        }
    }
    if changed {
        trace!("R3 fired");
        PropagationOutcome::Changed
    } else {
        PropagationOutcome::Unchanged
    }
}

/// `R4`: row∩segment and column∩segment intersection pruning.
fn apply_intersection_rules(grid: &mut Grid) -> PropagationOutcome {
    let k = grid.k();
    let mut changed = false;

    for row in 0..grid.height() {
        let row_cells = views::row(grid, row);
        for seg in distinct_segments(&row_cells) {
            let outside: usize = star_count(
                &row_cells
                    .iter()
                    .copied()
                    .filter(|c| c.segment != seg)
                    .collect::<Vec<_>>(),
            );
            if outside >= k {
                for cell in row_cells.iter().filter(|c| c.segment == seg) {
                    if cell.state == CellState::Empty {
                        grid.set_state(cell.pos, CellState::Eliminated).unwrap();
                        changed = true;
                    }
                }
            }
        }
    }

    for col in 0..grid.width() {
        let col_cells = views::column(grid, col);
        for seg in distinct_segments(&col_cells) {
            let outside: usize = star_count(
                &col_cells
                    .iter()
                    .copied()
                    .filter(|c| c.segment != seg)
                    .collect::<Vec<_>>(),
            );
            if outside >= k {
                for cell in col_cells.iter().filter(|c| c.segment == seg) {
                    if cell.state == CellState::Empty {
                        grid.set_state(cell.pos, CellState::Eliminated).unwrap();
                        changed = true;
                    }
                }
            }
        }
    }

    if changed {
        trace!("R4 fired");
        PropagationOutcome::Changed
    } else {
        PropagationOutcome::Unchanged
    }
}

fn distinct_segments(cells: &[Cell]) -> Vec<crate::cell::SegmentId> {
    let mut seen = Vec::new();
    for c in cells {
        if !seen.contains(&c.segment) {
            seen.push(c.segment);
        }
    }
    seen
}

/// `set_state` can only fail with `OutOfBounds` (positions here always come
/// from the grid itself) or `InvalidTransition` (attempting to eliminate an
/// already-starred cell, which the caller must treat as a contradiction, not
/// a panic).
fn set_or_contradict(grid: &mut Grid, pos: Pos, state: CellState) {
    // A rule only ever narrows an Empty cell, so this can't collide with an
    // existing terminal state; see `apply_group_rules`'s callers.
    grid.set_state(pos, state).expect("rules only narrow Empty cells");
}
