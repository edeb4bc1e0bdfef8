use smallvec::SmallVec;
use std::convert::From;
use std::fmt;

use crate::units::{ColumnIndex, RowIndex, Width};

/// A cell position on a maze grid, compared and hashed by value.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct GridCoordinate {
    pub row: u32,
    pub col: u32,
}

pub type CoordinateSmallVec = SmallVec<[GridCoordinate; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

/// Directions in the order neighbours are scanned: up, down, left, right.
pub const SCAN_ORDER: [CompassPrimary; 4] = [CompassPrimary::North,
                                             CompassPrimary::South,
                                             CompassPrimary::West,
                                             CompassPrimary::East];

impl GridCoordinate {
    pub fn new(row: u32, col: u32) -> GridCoordinate {
        GridCoordinate { row: row, col: col }
    }

    #[inline]
    pub fn from_row_column_indices(row_index: RowIndex, col_index: ColumnIndex) -> GridCoordinate {
        let (RowIndex(row), ColumnIndex(col)) = (row_index, col_index);
        GridCoordinate::new(row as u32, col as u32)
    }

    #[inline]
    pub fn from_row_major_index(index: usize, width: Width) -> GridCoordinate {
        let Width(w) = width;
        GridCoordinate::new((index / w) as u32, (index % w) as u32)
    }

    /// Creates a new coordinate `distance` cells away in the given direction.
    /// Returns None if the coordinate would have a negative row or column; the
    /// far edges of a grid are checked by the grid itself.
    pub fn offset(&self, dir: CompassPrimary, distance: u32) -> Option<GridCoordinate> {
        let (row, col) = (self.row, self.col);
        match dir {
            CompassPrimary::North => row.checked_sub(distance).map(|r| GridCoordinate::new(r, col)),
            CompassPrimary::South => row.checked_add(distance).map(|r| GridCoordinate::new(r, col)),
            CompassPrimary::East => col.checked_add(distance).map(|c| GridCoordinate::new(row, c)),
            CompassPrimary::West => col.checked_sub(distance).map(|c| GridCoordinate::new(row, c)),
        }
    }

    /// The cell halfway between two cells on the same row or column.
    #[inline]
    pub fn midpoint(&self, other: GridCoordinate) -> GridCoordinate {
        GridCoordinate::new((self.row + other.row) / 2, (self.col + other.col) / 2)
    }

    /// Number of orthogonal unit steps between two cells, ignoring walls.
    #[inline]
    pub fn manhattan_distance(&self, other: GridCoordinate) -> u32 {
        let row_delta = if self.row > other.row { self.row - other.row } else { other.row - self.row };
        let col_delta = if self.col > other.col { self.col - other.col } else { other.col - self.col };
        row_delta + col_delta
    }

    #[inline]
    pub fn is_adjacent(&self, other: GridCoordinate) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl From<(u32, u32)> for GridCoordinate {
    fn from(row_col_pair: (u32, u32)) -> GridCoordinate {
        GridCoordinate::new(row_col_pair.0, row_col_pair.1)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
