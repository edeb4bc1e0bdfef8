//! **mazes** is a maze generation and route finding library.
//!
//! A `MazeGrid` starts as solid walls, `generators::randomized_prim` carves a perfect maze into it
//! from a caller supplied random source, and `pathing::astar` answers shortest route queries
//! against the finished grid.

pub mod cells;
pub mod generators;
pub mod grid;
pub mod grid_iterators;
pub mod pathing;
pub mod units;
pub mod utils;

pub use crate::cells::GridCoordinate;
pub use crate::grid::{GridError, MazeGrid};
pub use crate::pathing::Path;
