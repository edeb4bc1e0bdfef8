use log::debug;
use rand::Rng;

use crate::cells::{CoordinateSmallVec, GridCoordinate};
use crate::grid::MazeGrid;
use crate::units::{Height, Width};

/// Apply a randomized Prim's algorithm to the grid, carving a perfect maze.
///
/// Cells two apart on the same row or column form the lattice that gets connected, and the cell
/// halfway between two lattice cells is the wall knocked through to join them. Carving begins at
/// a random lattice cell (row and column both even), so on a grid with odd dimensions every
/// corner ends up a passage.
///
/// Each step picks a random frontier cell. If it has unvisited lattice neighbours one of them is
/// carved through to and joins the frontier, with the picked cell staying on the frontier for
/// another go later. Otherwise the picked cell is spent and dropped for good. The result is a
/// spanning tree over the lattice: exactly one route between any two passages.
///
/// Any previous carving on the grid is discarded first. Grids narrower or shorter than 3 cells
/// have no pair of lattice cells to join and are left entirely as walls.
///
/// The caller supplies the random source, so a seeded generator gives repeatable mazes.
pub fn randomized_prim<'g, R>(grid: &'g mut MazeGrid, rng: &mut R) -> &'g mut MazeGrid
    where R: Rng + ?Sized
{
    grid.fill_walls();

    let (Width(width), Height(height)) = grid.dimensions();
    if width < 3 || height < 3 {
        debug!("{}x{} grid is too small to carve, leaving it all walls", width, height);
        return grid;
    }

    let start = random_lattice_cell(rng, width, height);
    debug!("carving {}x{} maze from {}", width, height, start);
    grid.mark_visited(start);
    grid.set_passage(start);

    let mut frontier = vec![start];
    while !frontier.is_empty() {

        // Order of the frontier does not matter, so removal can be O(1)
        let picked = rng.gen_range(0..frontier.len());
        let current = frontier.swap_remove(picked);

        let unvisited = grid.neighbours_at_distance(current, 2)
            .into_iter()
            .filter(|lattice_neighbour| !grid.is_visited(*lattice_neighbour))
            .collect::<CoordinateSmallVec>();

        if unvisited.is_empty() {
            continue;
        }
        frontier.push(current);

        let next = unvisited[rng.gen_range(0..unvisited.len())];
        carve(grid, current.midpoint(next));
        carve(grid, next);
        frontier.push(next);
    }

    grid.retire_visited();
    debug!("carved {} passages", grid.passages_count());
    grid
}

/// The lattice cell nearest the bottom right corner of the grid.
///
/// On a carvable grid this is always a passage. On grids with an even width or height the true
/// corner is never carved, because the lattice only covers even rows and columns.
pub fn far_lattice_corner(grid: &MazeGrid) -> GridCoordinate {
    let (Width(width), Height(height)) = (grid.width(), grid.height());
    GridCoordinate::new((2 * ((height - 1) / 2)) as u32, (2 * ((width - 1) / 2)) as u32)
}

fn carve(grid: &mut MazeGrid, coord: GridCoordinate) {
    grid.mark_visited(coord);
    grid.set_passage(coord);
}

fn random_lattice_cell<R: Rng + ?Sized>(rng: &mut R, width: usize, height: usize) -> GridCoordinate {
    let row = 2 * rng.gen_range(0..(height + 1) / 2);
    let col = 2 * rng.gen_range(0..(width + 1) / 2);
    GridCoordinate::new(row as u32, col as u32)
}
