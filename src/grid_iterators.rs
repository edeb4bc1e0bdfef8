use std::fmt;

use crate::cells::GridCoordinate;
use crate::units::{ColumnIndex, Height, RowIndex, Width};

/// Row-major iteration over every cell coordinate of a grid.
#[derive(Clone)]
pub struct RectGridCellIter {
    width: Width,
    current_cell_number: usize,
    cells_count: usize,
}

impl RectGridCellIter {
    pub(crate) fn new(width: Width, height: Height) -> RectGridCellIter {
        RectGridCellIter {
            width: width,
            current_cell_number: 0,
            cells_count: width.0 * height.0,
        }
    }
}

impl fmt::Debug for RectGridCellIter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CellIter :: current_cell_number: {:?}, cells_count: {:?}",
               self.current_cell_number,
               self.cells_count)
    }
}

impl ExactSizeIterator for RectGridCellIter {} // default impl using size_hint()
impl Iterator for RectGridCellIter {
    type Item = GridCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = GridCoordinate::from_row_major_index(self.current_cell_number, self.width);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

/// Iterates one row of coordinates at a time, top row first.
#[derive(Debug, Copy, Clone)]
pub struct RectRowIter {
    current_index: usize,
    row_length: Width,
    rows_count: Height,
}

impl RectRowIter {
    pub(crate) fn new(width: Width, height: Height) -> RectRowIter {
        RectRowIter {
            current_index: 0,
            row_length: width,
            rows_count: height,
        }
    }
}

impl ExactSizeIterator for RectRowIter {}
impl Iterator for RectRowIter {
    type Item = Vec<GridCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        let Height(count) = self.rows_count;
        if self.current_index < count {
            let Width(length) = self.row_length;
            let row = RowIndex(self.current_index);
            let coords = (0..length)
                .map(|i: usize| GridCoordinate::from_row_column_indices(row, ColumnIndex(i)))
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.rows_count.0 - self.current_index;
        (lower_bound, Some(lower_bound))
    }
}
