//! Boolean occupancy grid that reserves cells for building footprints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Errors raised by [`OccupancyGrid`] accessors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The requested coordinate lies outside the grid.
    #[error("cell ({x}, {y}) lies outside the {width}x{height} grid")]
    InvalidIndex {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Number of columns in the grid.
        width: u32,
        /// Number of rows in the grid.
        height: u32,
    },
}

/// Dense `width × height` lattice of reserved flags.
///
/// Cells are stored column-major so iteration walks every row of a column
/// before moving to the next column. A `true` cell is reserved for a building
/// footprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates a grid with every cell unreserved.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![false; capacity],
        }
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reports whether the grid contains no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether `(x, y)` addresses a cell of the grid.
    #[must_use]
    pub fn is_on_grid(&self, x: i64, y: i64) -> bool {
        x >= 0 && x < i64::from(self.width) && y >= 0 && y < i64::from(self.height)
    }

    /// Returns whether the cell at `(x, y)` is reserved.
    pub fn get(&self, x: i64, y: i64) -> Result<bool, GridError> {
        let index = self.checked_index(x, y)?;
        Ok(self.cells[index])
    }

    /// Reserves the cell at `(x, y)`.
    ///
    /// Returns `true` when the cell was previously free.
    pub fn set(&mut self, x: i64, y: i64) -> Result<bool, GridError> {
        let index = self.checked_index(x, y)?;
        let was_free = !self.cells[index];
        self.cells[index] = true;
        Ok(was_free)
    }

    /// Reports whether an in-bounds cell is reserved. Off-grid cells read as
    /// free.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.get(i64::from(cell.column()), i64::from(cell.row()))
            .unwrap_or(false)
    }

    /// Number of reserved cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    /// Iterates reserved cells column by column.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let height = self.height;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index / height, index % height))
            })
    }

    fn checked_index(&self, x: i64, y: i64) -> Result<usize, GridError> {
        if !self.is_on_grid(x, y) {
            return Err(GridError::InvalidIndex {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        let column = usize::try_from(x).unwrap_or(usize::MAX);
        let row = usize::try_from(y).unwrap_or(usize::MAX);
        let height = usize::try_from(self.height).unwrap_or(usize::MAX);
        Ok(column * height + row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_unreserved() {
        let grid = OccupancyGrid::new(4, 3);
        assert_eq!(grid.dimensions(), (4, 3));
        assert_eq!(grid.occupied_count(), 0);
        for x in 0..4 {
            for y in 0..3 {
                assert_eq!(grid.get(x, y), Ok(false));
            }
        }
    }

    #[test]
    fn is_on_grid_matches_bounds_comparison() {
        let grid = OccupancyGrid::new(5, 2);
        for x in -3..8_i64 {
            for y in -3..6_i64 {
                let expected = (0..5).contains(&x) && (0..2).contains(&y);
                assert_eq!(grid.is_on_grid(x, y), expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn out_of_range_access_reports_invalid_index() {
        let mut grid = OccupancyGrid::new(3, 3);
        let expected = GridError::InvalidIndex {
            x: 3,
            y: 0,
            width: 3,
            height: 3,
        };
        assert_eq!(grid.get(3, 0), Err(expected));
        assert_eq!(grid.set(3, 0), Err(expected));
        assert!(matches!(
            grid.get(-1, 2),
            Err(GridError::InvalidIndex { x: -1, y: 2, .. })
        ));
        assert!(matches!(
            grid.set(0, -4),
            Err(GridError::InvalidIndex { x: 0, y: -4, .. })
        ));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn set_reports_whether_cell_was_free() {
        let mut grid = OccupancyGrid::new(2, 2);
        assert_eq!(grid.set(1, 0), Ok(true));
        assert_eq!(grid.set(1, 0), Ok(false));
        assert_eq!(grid.get(1, 0), Ok(true));
        assert!(grid.is_occupied(CellCoord::new(1, 0)));
        assert!(!grid.is_occupied(CellCoord::new(9, 9)));
    }

    #[test]
    fn occupied_cells_walk_columns_first() {
        let mut grid = OccupancyGrid::new(3, 2);
        for (x, y) in [(2, 0), (0, 1), (1, 1), (0, 0)] {
            let _ = grid.set(x, y).expect("in bounds");
        }

        let cells: Vec<_> = grid.occupied_cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
                CellCoord::new(2, 0),
            ]
        );
    }

    #[test]
    fn zero_sized_grid_has_no_cells() {
        let grid = OccupancyGrid::new(0, 7);
        assert!(grid.is_empty());
        assert!(!grid.is_on_grid(0, 0));
        assert_eq!(grid.occupied_cells().count(), 0);
    }
}
