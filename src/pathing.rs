use log::{debug, trace};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::slice;

use crate::cells::GridCoordinate;
use crate::grid::MazeGrid;
use crate::utils;
use crate::utils::FnvHashMap;

/// A route through the passages of a maze, start and end inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    coordinates: Vec<GridCoordinate>,
    cost: u32,
}

impl Path {
    #[inline]
    pub fn coordinates(&self) -> &[GridCoordinate] {
        &self.coordinates
    }

    /// Steps taken along the path, which is the search cost recorded for the end cell.
    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of cells on the path, always at least one.
    #[inline]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    #[inline]
    pub fn start(&self) -> GridCoordinate {
        self.coordinates[0]
    }

    #[inline]
    pub fn end(&self) -> GridCoordinate {
        self.coordinates[self.coordinates.len() - 1]
    }

    pub fn iter(&self) -> slice::Iter<GridCoordinate> {
        self.coordinates.iter()
    }

    pub fn into_coordinates(self) -> Vec<GridCoordinate> {
        self.coordinates
    }
}

// An open set entry. Entries are never updated in place: a cheaper route to a cell pushes a new
// entry and the old one is skipped when popped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    g: u32,
    // Insertion order, ties on `f` go to whichever was found first.
    sequence: u64,
    coord: GridCoordinate,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, reverse so the lowest `f` pops first
        other.f.cmp(&self.f)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest path between two cells with A* search.
///
/// Moves are one step North, South, East or West between passage cells, each costing 1. The
/// Manhattan distance to the end never overestimates the remaining cost on such a grid, so the
/// first time the end cell is taken off the open set its route is a shortest one.
///
/// Returns None when there is no route: either end is a wall, off the grid, or the two cells are
/// in disconnected parts of the grid. The grid is only read, and all search state lives and dies
/// with the call.
pub fn astar(grid: &MazeGrid, start: GridCoordinate, end: GridCoordinate) -> Option<Path> {

    if !grid.is_valid_coordinate(start) || !grid.is_valid_coordinate(end) {
        debug!("no path from {} to {}: not on the grid", start, end);
        return None;
    }
    if grid.is_wall(start) || grid.is_wall(end) {
        debug!("no path from {} to {}: an end point is a wall", start, end);
        return None;
    }

    let capacity_hint = grid.passages_count();
    let mut came_from: FnvHashMap<GridCoordinate, GridCoordinate> = utils::fnv_hashmap(capacity_hint);
    let mut best_g: FnvHashMap<GridCoordinate, u32> = utils::fnv_hashmap(capacity_hint);
    let mut open = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut expanded = 0usize;

    let _ = best_g.insert(start, 0);
    open.push(OpenNode {
        f: start.manhattan_distance(end),
        g: 0,
        sequence: sequence,
        coord: start,
    });

    while let Some(current) = open.pop() {

        // Stale entry, a cheaper route to this cell was found after it was pushed
        if best_g.get(&current.coord).map_or(false, |&g| current.g > g) {
            continue;
        }

        if current.coord == end {
            let path = reconstruct_path(&came_from, start, end, current.g);
            debug!("path from {} to {} found: cost {}, {} cells expanded",
                   start, end, path.cost(), expanded);
            return Some(path);
        }

        expanded += 1;
        trace!("expanding {} g: {} f: {}", current.coord, current.g, current.f);

        let tentative_g = current.g + 1;
        for neighbour in grid.passage_neighbours(current.coord) {

            let improves = best_g.get(&neighbour).map_or(true, |&g| tentative_g < g);
            if improves {
                let _ = best_g.insert(neighbour, tentative_g);
                let _ = came_from.insert(neighbour, current.coord);
                sequence += 1;
                open.push(OpenNode {
                    f: tentative_g + neighbour.manhattan_distance(end),
                    g: tentative_g,
                    sequence: sequence,
                    coord: neighbour,
                });
            }
        }
    }

    debug!("no path from {} to {}, {} cells expanded", start, end, expanded);
    None
}

fn reconstruct_path(came_from: &FnvHashMap<GridCoordinate, GridCoordinate>,
                    start: GridCoordinate,
                    end: GridCoordinate,
                    cost: u32)
                    -> Path {
    let mut coordinates = Vec::with_capacity(cost as usize + 1);
    coordinates.push(end);
    let mut current = end;
    while current != start {
        current = came_from[&current];
        coordinates.push(current);
    }
    coordinates.reverse();

    Path {
        coordinates: coordinates,
        cost: cost,
    }
}

/// Breadth first flood fill of step counts from one passage cell to every passage reachable from it.
#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: GridCoordinate,
    distances: FnvHashMap<GridCoordinate, u32>,
    max_distance: u32,
}

impl Distances {
    /// Returns None if the start is off the grid or a wall.
    pub fn for_grid(grid: &MazeGrid, start_coordinate: GridCoordinate) -> Option<Distances> {

        if !grid.is_valid_coordinate(start_coordinate) || grid.is_wall(start_coordinate) {
            return None;
        }

        let mut max = 0;
        let mut distances: FnvHashMap<GridCoordinate, u32> = utils::fnv_hashmap(grid.passages_count());
        let _ = distances.insert(start_coordinate, 0);

        // Every step costs the same, so the first distance recorded for a cell is its shortest and
        // the distances map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell = distances[cell_coord];
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for neighbour in grid.passage_neighbours(*cell_coord) {
                    if !distances.contains_key(&neighbour) {
                        let _ = distances.insert(neighbour, distance_to_cell + 1);
                        new_frontier.push(neighbour);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate: start_coordinate,
            distances: distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> GridCoordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: GridCoordinate) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }

    /// Number of cells reachable from the start, the start included.
    #[inline]
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    /// The cells at the maximum distance, in row-major order.
    pub fn furthest_points_on_grid(&self) -> SmallVec<[GridCoordinate; 8]> {
        let furthest_distance = self.max();
        let mut furthest = self.distances
            .iter()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(coord, _)| *coord)
            .collect::<SmallVec<[GridCoordinate; 8]>>();
        furthest.sort();
        furthest
    }
}

/// Walk a flood fill back downhill from `end_point` to its start.
///
/// Returns None if `end_point` was not reached by the flood fill.
pub fn shortest_path_bfs(grid: &MazeGrid,
                         distances_from_start: &Distances,
                         end_point: GridCoordinate)
                         -> Option<Vec<GridCoordinate>> {

    let mut current_distance = distances_from_start.distance_from_start_to(end_point)?;
    let mut path = vec![end_point];
    let mut current_coord = end_point;

    while current_distance > 0 {
        let closer = grid.passage_neighbours(current_coord)
            .into_iter()
            .find(|neighbour| {
                distances_from_start.distance_from_start_to(*neighbour) == Some(current_distance - 1)
            })?;
        current_coord = closer;
        current_distance -= 1;
        path.push(current_coord);
    }

    path.reverse();
    Some(path)
}


#[cfg(test)]
mod tests {

    use petgraph::algo::dijkstra;
    use quickcheck::{quickcheck, TestResult};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::generators;
    use crate::units::{Height, Width};

    fn gc(row: u32, col: u32) -> GridCoordinate {
        GridCoordinate::from((row, col))
    }

    fn generated(width: usize, height: usize, seed: u64) -> MazeGrid {
        let mut g = MazeGrid::new(Width(width), Height(height)).expect("valid grid dimensions");
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let _ = generators::randomized_prim(&mut g, &mut rng);
        g
    }

    // ...#.
    // .#.#.
    // .#...
    // .####
    // .....
    fn first_choice_maze() -> MazeGrid {
        let mut g = MazeGrid::new(Width(5), Height(5)).unwrap();
        let _ = generators::randomized_prim(&mut g, &mut StepRng::new(0, 0));
        g
    }

    fn side(n: u8) -> usize {
        5 + (n as usize % 28)
    }

    fn passage_cells(g: &MazeGrid) -> Vec<GridCoordinate> {
        g.iter().filter(|c| g.is_passage(*c)).collect()
    }

    fn pick(cells: &[GridCoordinate], n: usize) -> GridCoordinate {
        cells[n % cells.len()]
    }

    #[test]
    fn corner_to_corner_on_first_choice_maze() {
        let g = first_choice_maze();
        let path = astar(&g, gc(0, 0), gc(4, 4)).expect("corners are connected");
        assert_eq!(path.coordinates(),
                   &[gc(0, 0), gc(1, 0), gc(2, 0), gc(3, 0), gc(4, 0),
                     gc(4, 1), gc(4, 2), gc(4, 3), gc(4, 4)]);
        assert_eq!(path.cost(), 8);
        assert_eq!(path.start(), gc(0, 0));
        assert_eq!(path.end(), gc(4, 4));
    }

    #[test]
    fn path_around_the_long_way() {
        let g = first_choice_maze();
        // (0,4) and (4,4) share a column but the only route doubles back through the middle row
        let path = astar(&g, gc(0, 4), gc(4, 4)).unwrap();
        assert_eq!(path.into_coordinates(),
                   vec![gc(0, 4), gc(1, 4), gc(2, 4), gc(2, 3), gc(2, 2), gc(1, 2), gc(0, 2),
                        gc(0, 1), gc(0, 0), gc(1, 0), gc(2, 0), gc(3, 0), gc(4, 0), gc(4, 1),
                        gc(4, 2), gc(4, 3), gc(4, 4)]);
    }

    #[test]
    fn start_is_end() {
        let g = first_choice_maze();
        let path = astar(&g, gc(2, 2), gc(2, 2)).unwrap();
        assert_eq!(path.coordinates(), &[gc(2, 2)]);
        assert_eq!(path.cost(), 0);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn no_path_to_or_from_a_wall() {
        let g = first_choice_maze();
        assert_eq!(astar(&g, gc(0, 0), gc(1, 1)), None);
        assert_eq!(astar(&g, gc(3, 3), gc(0, 0)), None);
    }

    #[test]
    fn no_path_off_the_grid() {
        let g = first_choice_maze();
        assert_eq!(astar(&g, gc(0, 0), gc(5, 0)), None);
        assert_eq!(astar(&g, gc(0, 9), gc(0, 0)), None);
    }

    #[test]
    fn no_path_on_uncarved_grid() {
        let g = MazeGrid::new(Width(2), Height(2)).unwrap();
        assert_eq!(astar(&g, gc(0, 0), gc(1, 1)), None);
    }

    #[test]
    fn no_path_between_disconnected_regions() {
        // (2, 3) is an island of passage with walls all around it
        let mut g = MazeGrid::new(Width(4), Height(3)).unwrap();
        g.set_passage(gc(0, 0));
        g.set_passage(gc(0, 1));
        g.set_passage(gc(2, 3));
        assert_eq!(astar(&g, gc(0, 0), gc(2, 3)), None);
        assert_eq!(astar(&g, gc(0, 1), gc(0, 0)).map(|p| p.cost()), Some(1));
    }

    #[test]
    fn finds_shortest_of_several_routes() {
        // Fully open grid: many shortest routes, every one of them manhattan length
        let mut g = MazeGrid::new(Width(6), Height(4)).unwrap();
        for c in g.iter().collect::<Vec<_>>() {
            g.set_passage(c);
        }
        let path = astar(&g, gc(3, 0), gc(0, 5)).unwrap();
        assert_eq!(path.cost(), 8);
        assert!(path.coordinates().windows(2).all(|step| step[0].is_adjacent(step[1])));
    }

    #[test]
    fn distances_require_a_passage_start() {
        let g = first_choice_maze();
        assert!(Distances::for_grid(&g, gc(1, 1)).is_none());
        assert!(Distances::for_grid(&g, gc(9, 9)).is_none());
        assert_eq!(Distances::for_grid(&g, gc(4, 4)).map(|d| d.start()), Some(gc(4, 4)));
    }

    #[test]
    fn distances_on_first_choice_maze() {
        let g = first_choice_maze();
        let distances = Distances::for_grid(&g, gc(0, 0)).unwrap();
        assert_eq!(distances.distance_from_start_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_from_start_to(gc(4, 4)), Some(8));
        assert_eq!(distances.distance_from_start_to(gc(0, 4)), Some(8));
        assert_eq!(distances.distance_from_start_to(gc(1, 1)), None);
        assert_eq!(distances.max(), 8);
        assert_eq!(&*distances.furthest_points_on_grid(), &[gc(0, 4), gc(4, 4)]);
        assert_eq!(distances.reachable_count(), 17);
    }

    #[test]
    fn bfs_path_matches_astar_on_first_choice_maze() {
        let g = first_choice_maze();
        let distances = Distances::for_grid(&g, gc(0, 4)).unwrap();
        let bfs = shortest_path_bfs(&g, &distances, gc(4, 4)).unwrap();
        assert_eq!(bfs, astar(&g, gc(0, 4), gc(4, 4)).unwrap().into_coordinates());
        assert_eq!(shortest_path_bfs(&g, &distances, gc(3, 3)), None);
    }

    #[test]
    fn path_is_valid() {
        fn prop(seed: u64, w: u8, h: u8, a: usize, b: usize) -> bool {
            let g = generated(side(w), side(h), seed);
            let cells = passage_cells(&g);
            let (start, end) = (pick(&cells, a), pick(&cells, b));
            let path = match astar(&g, start, end) {
                Some(p) => p,
                None => return false,
            };
            path.start() == start &&
            path.end() == end &&
            path.len() - 1 == path.cost() as usize &&
            path.iter().all(|c| g.is_passage(*c)) &&
            path.coordinates().windows(2).all(|step| step[0].is_adjacent(step[1]))
        }
        quickcheck(prop as fn(u64, u8, u8, usize, usize) -> bool);
    }

    #[test]
    fn path_is_optimal() {
        fn prop(seed: u64, w: u8, h: u8, a: usize, b: usize) -> TestResult {
            let g = generated(side(w), side(h), seed);
            let cells = passage_cells(&g);
            let (start, end) = (pick(&cells, a), pick(&cells, b));

            let graph = g.passage_graph();
            let node_of = |coord: GridCoordinate| graph.node_indices().find(|n| graph[*n] == coord);
            let (start_node, end_node) = match (node_of(start), node_of(end)) {
                (Some(s), Some(e)) => (s, e),
                _ => return TestResult::failed(),
            };
            let unit_costs = dijkstra(&graph, start_node, Some(end_node), |_| 1u32);

            let found = astar(&g, start, end).map(|p| p.cost());
            TestResult::from_bool(found == unit_costs.get(&end_node).cloned())
        }
        quickcheck(prop as fn(u64, u8, u8, usize, usize) -> TestResult);
    }

    #[test]
    fn optimal_on_grids_with_cycles() {
        // Knock extra holes into a maze so there is more than one route to choose from
        fn prop(seed: u64, holes: Vec<usize>, a: usize, b: usize) -> bool {
            let mut g = generated(17, 13, seed);
            for hole in holes {
                let coord = g.index_to_grid_coordinate(hole % g.size()).unwrap();
                g.set_passage(coord);
            }
            let cells = passage_cells(&g);
            let (start, end) = (pick(&cells, a), pick(&cells, b));

            let bfs_cost = Distances::for_grid(&g, start)
                .and_then(|d| d.distance_from_start_to(end));
            astar(&g, start, end).map(|p| p.cost()) == bfs_cost
        }
        quickcheck(prop as fn(u64, Vec<usize>, usize, usize) -> bool);
    }

    #[test]
    fn solving_leaves_the_grid_untouched() {
        let g = generated(25, 25, 11);
        let before = g.walls_row_major();
        let _ = astar(&g, gc(0, 0), gc(24, 24));
        let _ = astar(&g, gc(0, 0), gc(1, 1));
        assert_eq!(before, g.walls_row_major());
    }

    #[test]
    fn repeated_solves_agree() {
        let g = generated(31, 21, 8);
        let first = astar(&g, gc(0, 0), gc(20, 30));
        let second = astar(&g, gc(0, 0), gc(20, 30));
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
