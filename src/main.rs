use docopt::Docopt;
use error_chain::bail;
use itertools::Itertools;
use log::info;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde_derive::Deserialize;
use mazes::{
    generators,
    pathing,
    units::{Height, Width},
    GridCoordinate,
    MazeGrid,
};

const USAGE: &str = "Maze Driver

Carves a random perfect maze and prints the shortest route between two of its cells.

Usage:
    maze_driver -h | --help
    maze_driver [(--grid-size=<n>|[--grid-width=<w> --grid-height=<h>])] [--seed=<s>] [--start-row=<r> --start-col=<c>] [(--furthest-end-point|[--end-row=<e1> --end-col=<e2>])]

Options:
    -h --help              Show this screen.
    --grid-size=<n>        The grid size is n * n.
    --grid-width=<w>       The grid width in a w*h grid [default: 25].
    --grid-height=<h>      The grid height in a w*h grid [default: 25].
    --seed=<s>             Seed for the maze's random source. A random seed is chosen and logged if not given.
    --start-row=<r>        Row of the path start. Defaults to the top row.
    --start-col=<c>        Column of the path start. Defaults to the leftmost column.
    --end-row=<e1>         Row of the path end. Defaults to the bottom row of carved cells.
    --end-col=<e2>         Column of the path end. Defaults to the rightmost column of carved cells.
    --furthest-end-point   End the path at a cell furthest away from the start point.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_grid_size: Option<usize>,
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_seed: Option<u64>,
    flag_start_row: Option<u32>,
    flag_start_col: Option<u32>,
    flag_end_row: Option<u32>,
    flag_end_col: Option<u32>,
    flag_furthest_end_point: bool,
}

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    use error_chain::*;
    error_chain! {

        foreign_links {
            Grid(::mazes::GridError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    logger_builder(env_logger::Env::default()).init();

    let args: MazeArgs = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    let (width, height) = if let Some(square_grid_size) = args.flag_grid_size {
        (square_grid_size, square_grid_size)
    } else {
        (args.flag_grid_width, args.flag_grid_height)
    };

    let mut maze_grid = MazeGrid::new(Width(width), Height(height))?;

    // Log the seed so that an interesting maze can be generated again
    let seed = args.flag_seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("generating a {}x{} maze with seed {}", width, height, seed);
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let _ = generators::randomized_prim(&mut maze_grid, &mut rng);

    println!("{}x{} maze (seed {}): {} passages, {} links",
             width, height, seed, maze_grid.passages_count(), maze_grid.links_count());

    let start = get_start_point(&args, &maze_grid)?;
    let end = get_end_point(&args, &maze_grid, start)?;

    match pathing::astar(&maze_grid, start, end) {
        Some(path) => {
            println!("Shortest path from {} to {}: {} steps", start, end, path.cost());
            println!("{}", path.iter().join(" -> "));
        }
        None => println!("No path from {} to {}", start, end),
    }

    Ok(())
}

// RUST_LOG wins when set, otherwise log at info
fn logger_builder(env: env_logger::Env) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or("info"))
}

fn get_start_point(maze_args: &MazeArgs, maze_grid: &MazeGrid) -> Result<GridCoordinate> {
    let start = GridCoordinate::new(maze_args.flag_start_row.unwrap_or(0),
                                    maze_args.flag_start_col.unwrap_or(0));
    check_on_grid("start", start, maze_grid)?;
    Ok(start)
}

fn get_end_point(maze_args: &MazeArgs,
                 maze_grid: &MazeGrid,
                 start: GridCoordinate)
                 -> Result<GridCoordinate> {

    if maze_args.flag_furthest_end_point {
        let distances = pathing::Distances::for_grid(maze_grid, start)
            .ok_or("The start point is a wall, there is no furthest point from it.")?;
        return Ok(distances.furthest_points_on_grid()[0]);
    }

    // Even sized grids never carve their last row or column
    let corner = generators::far_lattice_corner(maze_grid);
    let end = GridCoordinate::new(maze_args.flag_end_row.unwrap_or(corner.row),
                                  maze_args.flag_end_col.unwrap_or(corner.col));
    check_on_grid("end", end, maze_grid)?;
    Ok(end)
}

fn check_on_grid(name: &str, coord: GridCoordinate, maze_grid: &MazeGrid) -> Result<()> {
    if !maze_grid.is_valid_coordinate(coord) {
        let (Width(width), Height(height)) = maze_grid.dimensions();
        bail!("The {} point {} is outside the {}x{} grid", name, coord, width, height);
    }
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    fn args(argv: &[&str]) -> MazeArgs {
        Docopt::new(USAGE)
            .and_then(|d| d.argv(argv.iter()).deserialize())
            .expect("valid driver arguments")
    }

    fn maze(argv: &[&str]) -> (MazeArgs, MazeGrid) {
        let args = args(argv);
        let mut grid = MazeGrid::new(Width(args.flag_grid_width), Height(args.flag_grid_height))
            .expect("valid grid dimensions");
        let mut rng = XorShiftRng::seed_from_u64(11);
        let _ = generators::randomized_prim(&mut grid, &mut rng);
        (args, grid)
    }

    #[test]
    fn log_level_from_environment_is_kept() {
        std::env::set_var("MAZE_DRIVER_TEST_LOG_SET", "debug");
        let logger = logger_builder(env_logger::Env::new().filter("MAZE_DRIVER_TEST_LOG_SET"))
            .build();
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn log_level_defaults_to_info() {
        std::env::remove_var("MAZE_DRIVER_TEST_LOG_UNSET");
        let logger = logger_builder(env_logger::Env::new().filter("MAZE_DRIVER_TEST_LOG_UNSET"))
            .build();
        assert_eq!(logger.filter(), log::LevelFilter::Info);
    }

    #[test]
    fn default_end_on_even_grid_is_reachable() {
        let (args, grid) = maze(&["maze_driver", "--grid-width=10", "--grid-height=10"]);
        let start = get_start_point(&args, &grid).unwrap();
        let end = get_end_point(&args, &grid, start).unwrap();
        assert_eq!(end, GridCoordinate::new(8, 8));
        assert!(pathing::astar(&grid, start, end).is_some());
    }

    #[test]
    fn default_end_on_odd_grid_is_the_corner() {
        let (args, grid) = maze(&["maze_driver", "--grid-width=9", "--grid-height=7"]);
        let start = get_start_point(&args, &grid).unwrap();
        assert_eq!(get_end_point(&args, &grid, start).unwrap(), GridCoordinate::new(6, 8));
    }

    #[test]
    fn explicit_end_is_used_and_checked() {
        let (args, grid) = maze(&["maze_driver", "--grid-width=10", "--grid-height=10",
                                  "--end-row=9", "--end-col=3"]);
        let start = get_start_point(&args, &grid).unwrap();
        assert_eq!(get_end_point(&args, &grid, start).unwrap(), GridCoordinate::new(9, 3));

        let (args, grid) = maze(&["maze_driver", "--grid-width=10", "--grid-height=10",
                                  "--end-row=10", "--end-col=3"]);
        assert!(get_end_point(&args, &grid, start).is_err());
    }
}
