use std::fmt;

use crate::cell::{Cell, CellState, Pos, SegmentId};
use crate::error::GridError;

/// The Star Battle board: a fixed `width × height` shape, a stars-per-area
/// constant `k`, and the mutable state of every cell (spec §3).
///
/// Segment assignment is fixed at construction (`I5`); only [`CellState`]
/// ever changes. Cloning is the sanctioned way to checkpoint a grid before a
/// speculative move (spec §4.1, §9): it is a flat `Vec<Cell>` of small `Copy`
/// values, so `#[derive(Clone)]` is already `O(width × height)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    k: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from an explicit, already-validated cell layout.
    /// Prefer [`crate::parse::parse_puzzle`] for textual input.
    #[must_use]
    pub fn new(width: usize, height: usize, k: usize, segments: &[Vec<SegmentId>]) -> Self {
        assert_eq!(segments.len(), height, "segments must have `height` rows");
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in segments.iter().enumerate() {
            assert_eq!(line.len(), width, "row {row} must have `width` columns");
            for (col, &segment) in line.iter().enumerate() {
                cells.push(Cell::new(segment, Pos::new(row, col)));
            }
        }
        Self {
            width,
            height,
            k,
            cells,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        (pos.row < self.height && pos.col < self.width).then_some(pos.row * self.width + pos.col)
    }

    /// Total on valid indices; `OutOfBounds` otherwise.
    pub fn get(&self, pos: Pos) -> Result<Cell, GridError> {
        self.index(pos)
            .map(|i| self.cells[i])
            .ok_or(GridError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            })
    }

    /// Overwrites the state of the cell at `pos`.
    ///
    /// Fails with `InvalidTransition` if moving between two distinct
    /// terminal states (e.g. `Starred` → `Eliminated`); every other
    /// transition, including a state to itself, is allowed.
    pub fn set_state(&mut self, pos: Pos, state: CellState) -> Result<(), GridError> {
        let i = self.index(pos).ok_or(GridError::OutOfBounds {
            pos,
            width: self.width,
            height: self.height,
        })?;
        let from = self.cells[i].state;
        if from.is_terminal() && state.is_terminal() && from != state {
            return Err(GridError::InvalidTransition { pos, from, to: state });
        }
        self.cells[i].state = state;
        Ok(())
    }

    /// All cells, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// An independent copy: mutating the result never affects `self` (`P6`).
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}

impl fmt::Display for Grid {
    /// The rendering contract of spec §4.1/§6: a header row of column
    /// letters, then one bar-separated line per row, where an `Empty` cell
    /// shows its segment token and any other cell shows its state glyph.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " |")?;
        for col in 0..self.width {
            write!(f, " {}", Pos::new(0, col).column_label())?;
        }
        writeln!(f)?;
        for row in 0..self.height {
            write!(f, "{row}|")?;
            for col in 0..self.width {
                let cell = self.cells[row * self.width + col];
                match cell.state {
                    CellState::Empty => write!(f, " {}", cell.segment)?,
                    other => write!(f, " {other}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
