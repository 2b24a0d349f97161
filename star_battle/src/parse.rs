//! The textual puzzle parser (spec §4.6, §6).

use crate::cell::SegmentId;
use crate::error::ParseError;
use crate::grid::Grid;

/// Parses `text` into a `Grid` with stars-per-area constant `k`.
///
/// `text` is read line by line; each non-blank line is one row, and its
/// tokens are its non-whitespace characters in order (whitespace is
/// insignificant and exists only to make hand-written puzzles legible — see
/// the rendering contract in [`crate::grid::Grid`]'s `Display` impl, which
/// this is the inverse of). Blank lines are skipped rather than treated as
/// zero-width rows, so a puzzle file may carry a trailing newline without
/// tripping `RaggedPuzzle`.
///
/// Two cells share a segment iff their tokens compare equal; `k` is never
/// read from the text itself.
pub fn parse_puzzle(text: &str, k: usize) -> Result<Grid, ParseError> {
    let rows: Vec<Vec<char>> = text
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
        .filter(|tokens: &Vec<char>| !tokens.is_empty())
        .collect();

    let height = rows.len();
    if height == 0 {
        return Err(ParseError::EmptyPuzzle);
    }

    let width = rows[0].len();
    if width > 10 {
        return Err(ParseError::UnsupportedWidth { width });
    }

    for (row, tokens) in rows.iter().enumerate() {
        if tokens.len() != width {
            return Err(ParseError::RaggedPuzzle {
                row,
                found: tokens.len(),
                expected: width,
            });
        }
    }

    let segments: Vec<Vec<SegmentId>> = rows
        .iter()
        .map(|tokens| tokens.iter().map(|&token| SegmentId::new(token)).collect())
        .collect();

    Ok(Grid::new(width, height, k, &segments))
}
