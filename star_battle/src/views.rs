//! Read-only groupings of cells by row, column, and segment (spec §4.2).
//!
//! Each function recomputes its result from the grid on every call, the same
//! posture as the teacher's `correlated`/`unic_on_row` helpers: cheap enough
//! to call repeatedly inside the propagator's fixed-point loop, and never
//! caches anything that could go stale across a mutation.

use crate::cell::{Cell, SegmentId};
use crate::grid::Grid;

/// The cells of row `row`, columns in ascending order.
pub fn row(grid: &Grid, row: usize) -> Vec<Cell> {
    grid.cells().filter(|c| c.pos.row == row).collect()
}

/// The cells of column `col`, rows in ascending order.
pub fn column(grid: &Grid, col: usize) -> Vec<Cell> {
    grid.cells().filter(|c| c.pos.col == col).collect()
}

/// The cells sharing segment `segment`, in row-major order.
pub fn segment(grid: &Grid, segment: SegmentId) -> Vec<Cell> {
    grid.cells().filter(|c| c.segment == segment).collect()
}

/// The distinct segment identifiers present in the grid, in first-seen
/// (row-major) order.
pub fn segment_ids(grid: &Grid) -> Vec<SegmentId> {
    let mut seen = Vec::new();
    for cell in grid.cells() {
        if !seen.contains(&cell.segment) {
            seen.push(cell.segment);
        }
    }
    seen
}

/// How many cells in `cells` are currently `Starred`.
pub fn star_count(cells: &[Cell]) -> usize {
    cells
        .iter()
        .filter(|c| c.state == crate::cell::CellState::Starred)
        .count()
}

/// How many cells in `cells` are currently `Empty`.
pub fn empty_count(cells: &[Cell]) -> usize {
    cells
        .iter()
        .filter(|c| c.state == crate::cell::CellState::Empty)
        .count()
}

/// How many cells in `cells` are still available to receive a star
/// (`Empty` or already `Starred`) — used by invariant `I4`.
pub fn available_count(cells: &[Cell]) -> usize {
    cells.iter().filter(|c| c.state.is_available()).count()
}
