//! The star placement operator (spec §4.4): the atomic move "place a star at
//! `(r, c)`", its mandated local eliminations, and the propagator.

use log::trace;

use crate::cell::{CellState, Pos};
use crate::error::{Group, PlacementError};
use crate::grid::Grid;
use crate::propagate;
use crate::views::{self, star_count};

/// Places a star at `pos`, applies the consequences mandated by the rules of
/// the game, then runs the propagator to a fixed point.
///
/// Works on an internal scratch copy of `grid` and only commits the result
/// back into `*grid` if every step succeeds (spec §4.4): on any error,
/// `grid` is left exactly as it was passed in.
pub fn place_star(grid: &mut Grid, pos: Pos) -> Result<(), PlacementError> {
    let cell = grid
        .get(pos)
        .map_err(|_| PlacementError::OutOfBounds {
            pos,
            width: grid.width(),
            height: grid.height(),
        })?;

    if cell.state != CellState::Empty {
        return Err(PlacementError::CellNotEmpty { pos });
    }

    let k = grid.k();
    let row_stars = star_count(&views::row(grid, pos.row));
    let col_stars = star_count(&views::column(grid, pos.col));
    let seg_stars = star_count(&views::segment(grid, cell.segment));

    if seg_stars >= k {
        return Err(PlacementError::GroupSaturated {
            group: Group::Segment,
            k,
        });
    }
    if row_stars >= k {
        return Err(PlacementError::GroupSaturated { group: Group::Row, k });
    }
    if col_stars >= k {
        return Err(PlacementError::GroupSaturated {
            group: Group::Column,
            k,
        });
    }

    let mut scratch = grid.deep_copy();
    if apply_consequences(&mut scratch, pos, k).is_err() {
        return Err(PlacementError::ContradictionOnPlacement { pos });
    }
    if propagate::run(&mut scratch).is_contradiction() {
        return Err(PlacementError::ContradictionOnPlacement { pos });
    }

    trace!("placed star at {pos}");
    *grid = scratch;
    Ok(())
}

/// A stray marker type: the only failure mode here is "would have to
/// eliminate an already-starred cell", which the caller reports uniformly as
/// `ContradictionOnPlacement`.
struct WouldEliminateStarred;

fn apply_consequences(grid: &mut Grid, pos: Pos, k: usize) -> Result<(), WouldEliminateStarred> {
    // 1. Set the target cell to Starred.
    grid.set_state(pos, CellState::Starred)
        .map_err(|_| WouldEliminateStarred)?;

    // 2. Eliminate every Empty king-neighbor.
    for neighbor in pos.king_neighbors(grid.height(), grid.width()) {
        eliminate_if_empty(grid, neighbor)?;
    }

    // 3. If the segment now has exactly k stars, eliminate the rest of it.
    let cell = grid.get(pos).expect("pos was just validated");
    let seg_cells = views::segment(grid, cell.segment);
    if star_count(&seg_cells) == k {
        for c in &seg_cells {
            eliminate_if_empty(grid, c.pos)?;
        }
    }

    // 4. Same for the row.
    let row_cells = views::row(grid, pos.row);
    if star_count(&row_cells) == k {
        for c in &row_cells {
            eliminate_if_empty(grid, c.pos)?;
        }
    }

    // 5. Same for the column.
    let col_cells = views::column(grid, pos.col);
    if star_count(&col_cells) == k {
        for c in &col_cells {
            eliminate_if_empty(grid, c.pos)?;
        }
    }

    Ok(())
}

fn eliminate_if_empty(grid: &mut Grid, pos: Pos) -> Result<(), WouldEliminateStarred> {
    let cell = grid.get(pos).expect("pos comes from the grid's own views");
    match cell.state {
        CellState::Empty => {
            grid.set_state(pos, CellState::Eliminated)
                .expect("Empty -> Eliminated is always a legal transition");
            Ok(())
        }
        CellState::Starred => Err(WouldEliminateStarred),
        CellState::Eliminated | CellState::Blocked => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::SegmentId;

    fn s(c: char) -> SegmentId {
        SegmentId::new(c)
    }

    #[test]
    fn rejects_out_of_bounds() {
        let mut g = Grid::new(2, 2, 1, &[vec![s('A'), s('A')], vec![s('A'), s('A')]]);
        assert_eq!(
            place_star(&mut g, Pos::new(5, 5)),
            Err(PlacementError::OutOfBounds {
                pos: Pos::new(5, 5),
                width: 2,
                height: 2,
            })
        );
    }

    #[test]
    fn rejects_non_empty_cell() {
        let mut g = Grid::new(2, 2, 1, &[vec![s('A'), s('A')], vec![s('A'), s('A')]]);
        place_star(&mut g, Pos::new(0, 0)).unwrap();
        // (0,1) is now eliminated by adjacency.
        assert_eq!(
            place_star(&mut g, Pos::new(0, 1)),
            Err(PlacementError::CellNotEmpty { pos: Pos::new(0, 1) })
        );
    }

    #[test]
    fn rejects_saturated_segment() {
        // Segment `A` spans two far-apart, non-adjacent rows so a star in
        // one member doesn't auto-eliminate the rest; we saturate it
        // directly to isolate the placement operator's own precondition
        // check from the propagator's consequences.
        let mut g = Grid::new(
            1,
            4,
            1,
            &[vec![s('A')], vec![s('B')], vec![s('A')], vec![s('C')]],
        );
        g.set_state(Pos::new(0, 0), CellState::Starred).unwrap();
        let err = place_star(&mut g, Pos::new(2, 0)).unwrap_err();
        assert_eq!(
            err,
            PlacementError::GroupSaturated {
                group: Group::Segment,
                k: 1
            }
        );
    }

    #[test]
    fn leaves_grid_untouched_on_failure() {
        let mut g = Grid::new(2, 2, 1, &[vec![s('A'), s('A')], vec![s('A'), s('A')]]);
        let before = g.clone();
        let _ = place_star(&mut g, Pos::new(9, 9));
        assert_eq!(g, before);
    }

    #[test]
    fn star_in_5x5_easy_segment_eliminates_whole_segment() {
        // Scenario S1's segment `D` occupies (1,1) and the full bottom row.
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
        place_star(&mut g, Pos::new(1, 1)).unwrap();
        for pos in [
            Pos::new(3, 0),
            Pos::new(3, 1),
            Pos::new(3, 4),
            Pos::new(4, 0),
            Pos::new(4, 1),
            Pos::new(4, 2),
            Pos::new(4, 3),
            Pos::new(4, 4),
        ] {
            assert_eq!(g.get(pos).unwrap().state, CellState::Eliminated);
        }
    }
}
