use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A grid position in (column, row) order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub fn new(col: usize, row: usize) -> Self {
        Cell { col, row }
    }

    /// Manhattan distance, the true cost between two cells on an open grid.
    pub fn manhattan(&self, other: &Cell) -> usize {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// Euclidean (L2) distance.
    pub fn euclidean(&self, other: &Cell) -> f64 {
        let dx = self.col as f64 - other.col as f64;
        let dy = self.row as f64 - other.row as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(usize, usize)> for Cell {
    fn from((col, row): (usize, usize)) -> Self {
        Cell { col, row }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Ordered start-to-end sequence of cells.
pub type Path = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("grid is not rectangular: column {column} has {found} rows, expected {expected}")]
    RaggedGrid {
        column: usize,
        expected: usize,
        found: usize,
    },
    #[error("{which} cell {cell} is outside the {cols}x{rows} grid")]
    OutOfBounds {
        which: &'static str,
        cell: Cell,
        cols: usize,
        rows: usize,
    },
    #[error("{which} cell {cell} is blocked")]
    BlockedEndpoint { which: &'static str, cell: Cell },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("No valid path found")]
    NoPath,
    #[error("Path reconstruction failed")]
    ReconstructionFailed,
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("Search step budget exhausted after {expanded} expansions")]
    BudgetExhausted { expanded: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_distances() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(b.manhattan(&a), 7);
        assert!((a.euclidean(&b) - 5.0).abs() < f64::EPSILON);
        assert!(a.euclidean(&b) <= a.manhattan(&b) as f64);
    }

    #[test]
    fn test_cell_ordering_is_column_major() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 1)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SearchError::NoPath.to_string(), "No valid path found");
        assert_eq!(
            SearchError::ReconstructionFailed.to_string(),
            "Path reconstruction failed"
        );
        let err: SearchError = InvalidInput::BlockedEndpoint {
            which: "start",
            cell: Cell::new(1, 2),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid input: start cell (1, 2) is blocked");
        assert_eq!(
            SearchError::BudgetExhausted { expanded: 3 }.to_string(),
            "Search step budget exhausted after 3 expansions"
        );
    }
}
