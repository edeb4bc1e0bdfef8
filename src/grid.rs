use bit_set::BitSet;
use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};
use std::error::Error;
use std::fmt;

use crate::cells::{CompassPrimary, CoordinateSmallVec, GridCoordinate, SCAN_ORDER};
use crate::grid_iterators::{RectGridCellIter, RectRowIter};
use crate::units::{EdgesCount, Height, NodesCount, Width};
use crate::utils;

/// Undirected graph of the passages in a maze, one node per passage cell.
pub type PassageGraph = Graph<GridCoordinate, (), Undirected, u32>;

/// A rectangular grid of cells, each either a wall or a passage.
///
/// Every cell starts out as a wall. Only the maze generators carve passages, after which the
/// grid is read only and can be shared by any number of path searches.
pub struct MazeGrid {
    width: Width,
    height: Height,
    // A set bit is a passage, so an empty set is a grid of walls.
    passages: BitSet,
    // Only meaningful while a generator is carving.
    visited: BitSet,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GridError {
    InvalidDimensions { width: usize, height: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GridError::InvalidDimensions { width, height } => {
                write!(f, "invalid grid dimensions {}x{}, both must be at least 1", width, height)
            }
        }
    }
}

impl Error for GridError {}

impl fmt::Debug for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MazeGrid :: width: {:?}, height: {:?}, passages: {:?}",
               self.width, self.height, self.passages_count())
    }
}

impl MazeGrid {
    /// Creates a grid of walls. Fails if either dimension is zero.
    pub fn new(width: Width, height: Height) -> Result<MazeGrid, GridError> {
        let (Width(w), Height(h)) = (width, height);
        if w < 1 || h < 1 {
            return Err(GridError::InvalidDimensions { width: w, height: h });
        }
        let cells_count = w.checked_mul(h)
            .ok_or(GridError::InvalidDimensions { width: w, height: h })?;
        if w > u32::MAX as usize || h > u32::MAX as usize {
            return Err(GridError::InvalidDimensions { width: w, height: h });
        }

        Ok(MazeGrid {
            width: width,
            height: height,
            passages: BitSet::with_capacity(cells_count),
            visited: BitSet::with_capacity(cells_count),
        })
    }

    #[inline]
    pub fn dimensions(&self) -> (Width, Height) {
        (self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.row as usize) < self.height.0 && (coord.col as usize) < self.width.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.row as usize * self.width.0 + coord.col as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_grid_coordinate(&self, index: usize) -> Option<GridCoordinate> {
        if index < self.size() {
            Some(GridCoordinate::from_row_major_index(index, self.width))
        } else {
            None
        }
    }

    /// Panics if the coordinate is outside the grid.
    pub fn is_wall(&self, coord: GridCoordinate) -> bool {
        !self.passages.contains(self.checked_index(coord))
    }

    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn is_passage(&self, coord: GridCoordinate) -> bool {
        !self.is_wall(coord)
    }

    /// The whole wall matrix in row-major order, `true` for a wall.
    pub fn walls_row_major(&self) -> Vec<bool> {
        (0..self.size()).map(|i| !self.passages.contains(i)).collect()
    }

    #[inline]
    pub fn passages_count(&self) -> usize {
        self.passages.len()
    }

    #[inline]
    pub fn iter(&self) -> RectGridCellIter {
        RectGridCellIter::new(self.width, self.height)
    }

    #[inline]
    pub fn iter_row(&self) -> RectRowIter {
        RectRowIter::new(self.width, self.height)
    }

    /// Cells directly North, South, West or East of `coord` that lie on the grid.
    pub fn neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        self.neighbours_at_distance(coord, 1)
    }

    /// Neighbouring cells that are passages, in the same scan order as `neighbours`.
    pub fn passage_neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        self.neighbours(coord)
            .into_iter()
            .filter(|neighbour| self.is_passage(*neighbour))
            .collect()
    }

    /// Cells exactly `distance` cells away in each compass direction, skipping any off the grid.
    pub fn neighbours_at_distance(&self, coord: GridCoordinate, distance: u32) -> CoordinateSmallVec {
        SCAN_ORDER.iter()
            .filter_map(|dir: &CompassPrimary| coord.offset(*dir, distance))
            .filter(|c| self.is_valid_coordinate(*c))
            .collect()
    }

    /// Each pair of orthogonally adjacent passage cells, reported once.
    pub fn iter_links(&self) -> LinksIter {
        LinksIter {
            grid: self,
            cells: self.iter(),
            pending: None,
        }
    }

    #[inline]
    pub fn links_count(&self) -> usize {
        self.iter_links().count()
    }

    /// Exports the passages as a graph, one node per passage cell (row-major order) and one edge
    /// per adjacent passage pair.
    pub fn passage_graph(&self) -> PassageGraph {
        let (NodesCount(nodes), EdgesCount(edges)) = self.graph_size();
        let mut graph = PassageGraph::with_capacity(nodes, edges);
        let mut node_indices = utils::fnv_hashmap::<GridCoordinate, NodeIndex<u32>>(nodes);

        for coord in self.iter().filter(|c| self.is_passage(*c)) {
            let _ = node_indices.insert(coord, graph.add_node(coord));
        }
        for (a, b) in self.iter_links() {
            let _ = graph.add_edge(node_indices[&a], node_indices[&b], ());
        }

        graph
    }

    fn graph_size(&self) -> (NodesCount, EdgesCount) {
        let nodes = self.passages_count();
        // Edge count is a capacity guess, exact for a perfect maze (one fewer edge than nodes)
        (NodesCount(nodes), EdgesCount(nodes.saturating_sub(1)))
    }

    fn checked_index(&self, coord: GridCoordinate) -> usize {
        match self.grid_coordinate_to_index(coord) {
            Some(index) => index,
            None => {
                panic!("coordinate {} out of bounds for a {}x{} grid",
                       coord, self.width.0, self.height.0)
            }
        }
    }

    // Carving, only for use by the generators.

    pub(crate) fn set_passage(&mut self, coord: GridCoordinate) {
        let index = self.checked_index(coord);
        let _ = self.passages.insert(index);
    }

    pub(crate) fn mark_visited(&mut self, coord: GridCoordinate) {
        let index = self.checked_index(coord);
        let _ = self.visited.insert(index);
    }

    pub(crate) fn is_visited(&self, coord: GridCoordinate) -> bool {
        self.visited.contains(self.checked_index(coord))
    }

    /// Back to every cell a wall and unvisited.
    pub(crate) fn fill_walls(&mut self) {
        self.passages.clear();
        self.visited.clear();
    }

    pub(crate) fn retire_visited(&mut self) {
        self.visited = BitSet::new();
    }
}

pub struct LinksIter<'a> {
    grid: &'a MazeGrid,
    cells: RectGridCellIter,
    pending: Option<(GridCoordinate, GridCoordinate)>,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (GridCoordinate, GridCoordinate);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(link) = self.pending.take() {
            return Some(link);
        }

        let grid = self.grid;
        // Looking only East and South of each passage finds every link exactly once.
        while let Some(coord) = self.cells.next() {
            if grid.is_wall(coord) {
                continue;
            }
            let linked_to = |dir: CompassPrimary| {
                coord.offset(dir, 1)
                    .filter(|c| grid.is_valid_coordinate(*c) && grid.is_passage(*c))
            };
            match (linked_to(CompassPrimary::East), linked_to(CompassPrimary::South)) {
                (Some(east), Some(south)) => {
                    self.pending = Some((coord, south));
                    return Some((coord, east));
                }
                (Some(east), None) => return Some((coord, east)),
                (None, Some(south)) => return Some((coord, south)),
                (None, None) => {}
            }
        }
        None
    }
}

impl<'a> fmt::Debug for LinksIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LinksIter :: cells iter : {:?}", self.cells)
    }
}
