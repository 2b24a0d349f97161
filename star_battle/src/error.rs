use thiserror::Error;

use crate::cell::Pos;

/// Failures from parsing a textual puzzle into a [`crate::grid::Grid`] (spec §4.6, §6).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("puzzle text contains no rows")]
    EmptyPuzzle,
    #[error("row {row} has {found} tokens, expected {expected} (matching the first row)")]
    RaggedPuzzle {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("grid width {width} exceeds the supported maximum of 10 columns (A..J)")]
    UnsupportedWidth { width: usize },
}

/// Failures from indexing or mutating a [`crate::grid::Grid`] directly (spec §4.1).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("position {pos} is outside the {height}x{width} grid")]
    OutOfBounds {
        pos: Pos,
        width: usize,
        height: usize,
    },
    #[error("cannot transition cell {pos} from terminal state {from:?} to {to:?}")]
    InvalidTransition {
        pos: Pos,
        from: crate::cell::CellState,
        to: crate::cell::CellState,
    },
}

/// A group that a placement would saturate beyond `k` stars (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Row,
    Column,
    Segment,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Group::Row => "row",
            Group::Column => "column",
            Group::Segment => "segment",
        };
        write!(f, "{name}")
    }
}

/// Failures from the star placement operator (spec §4.4, §6).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("position {pos} is outside the {height}x{width} grid")]
    OutOfBounds {
        pos: Pos,
        width: usize,
        height: usize,
    },
    #[error("cell {pos} is not empty")]
    CellNotEmpty { pos: Pos },
    #[error("{group} already has the maximum of {k} star(s)")]
    GroupSaturated { group: Group, k: usize },
    #[error("placing a star at {pos} would force eliminating an already-starred cell")]
    ContradictionOnPlacement { pos: Pos },
}
