//! Best effort route finding for agents chasing a target through a maze.
//!
//! The search is a greedy relative of A*. Every step re-scores the whole open list, estimating
//! the travelled distance of a candidate from its least rooted visited neighbour rather than
//! from a stored cost. The route it finds is not guaranteed to be the shortest one.
//!
//! A `Pathfinder` remembers whether its last search failed. While it does, blocked cells are
//! treated as passable, so an agent that is walled in digs its way out on the next search.

use bit_set::BitSet;
use log::{debug, trace};

use crate::cells::{CellContents, Coordinate};
use crate::errors::*;
use crate::grid::Grid;

/// Search state reused between path requests against the same maze.
#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    no_path: bool,
    // Indexed by row major cell index, rebuilt before every search.
    parents: Vec<Option<usize>>,
    // Insertion ordered, earlier cells win ties.
    open: Vec<usize>,
    in_open: BitSet,
    visited: BitSet,
}

impl Pathfinder {
    pub fn new() -> Pathfinder {
        Pathfinder::default()
    }

    /// Did the last search fail to reach its target?
    /// While true the next search may route through blocked cells.
    #[inline]
    pub fn no_path(&self) -> bool {
        self.no_path
    }

    /// The cell a search reached `coord` from, as recorded by the last search.
    pub fn search_parent(&self, grid: &Grid, coord: Coordinate) -> Option<Coordinate> {
        grid.coordinate_to_index(coord)
            .and_then(|index| self.parents.get(index).cloned().flatten())
            .map(|parent| grid.index_to_coordinate(parent))
    }

    /// Find a route from `start` to `target` over the linked cells of the grid.
    ///
    /// The route runs from `start` to `target` inclusive when the target is reached. When it is
    /// not, the route runs from `start` to the last cell the search expanded and the pathfinder
    /// switches into its no path mode. A start equal to the target gives a single cell route.
    pub fn find_path(&mut self,
                     grid: &Grid,
                     start: Coordinate,
                     target: Coordinate)
                     -> Result<Vec<Coordinate>> {
        let start_index = grid.coordinate_to_index(start)
            .ok_or(ErrorKind::InvalidCoordinate(start))?;
        let target_index = grid.coordinate_to_index(target)
            .ok_or(ErrorKind::InvalidCoordinate(target))?;

        self.reset(grid.size());
        self.push_open(start_index);

        let mut current = start_index;
        let mut reached = false;

        while !self.open.is_empty() {
            if current == target_index {
                reached = true;
                break;
            }

            for link in grid.link_indices(current) {
                let admissible = self.no_path || grid.contents_at(link) != CellContents::Blocked;
                if admissible && !self.in_open.contains(link) && !self.visited.contains(link) {
                    self.push_open(link);
                }
            }

            self.remove_open(current);
            self.visited.insert(current);

            let best = match self.best_open_cell(grid, current, target) {
                Some(best) => best,
                None => break,
            };
            let parent = self.least_rooted_visited_link(grid, best).unwrap_or(current);
            self.parents[best] = Some(parent);
            trace!("expanded {:?}, next {:?} reached from {:?}",
                   grid.index_to_coordinate(current),
                   grid.index_to_coordinate(best),
                   grid.index_to_coordinate(parent));

            current = best;
        }

        if self.no_path == reached {
            debug!("no path mode {} after searching {:?} -> {:?}",
                   if reached { "cleared" } else { "entered" },
                   start,
                   target);
        }
        self.no_path = !reached;

        let route_end = if reached { target_index } else { current };
        let mut path = self.ancestors(route_end)
            .map(|index| grid.index_to_coordinate(index))
            .collect::<Vec<Coordinate>>();
        path.reverse();

        debug!("path {:?} -> {:?}: reached {}, {} cells long, {} cells visited",
               start,
               target,
               reached,
               path.len(),
               self.visited.len());
        Ok(path)
    }

    fn reset(&mut self, cells_count: usize) {
        self.parents.clear();
        self.parents.resize(cells_count, None);
        self.open.clear();
        self.in_open.clear();
        self.visited.clear();
    }

    fn push_open(&mut self, index: usize) {
        if self.in_open.insert(index) {
            self.open.push(index);
        }
    }

    fn remove_open(&mut self, index: usize) {
        if self.in_open.remove(index) {
            if let Some(position) = self.open.iter().position(|&i| i == index) {
                let _ = self.open.remove(position);
            }
        }
    }

    /// The open cell with the lowest estimated route cost, ignoring `current`.
    /// A running minimum of exactly zero counts as unset, so a later candidate replaces it.
    fn best_open_cell(&self, grid: &Grid, current: usize, target: Coordinate) -> Option<usize> {
        let mut best = None;
        let mut lowest_cost = 0.0f32;
        for &candidate in self.open.iter().filter(|&&index| index != current) {
            let cost = self.estimated_cost(grid, candidate, target);
            if lowest_cost > cost || lowest_cost == 0.0 {
                lowest_cost = cost;
                best = Some(candidate);
            }
        }
        best
    }

    /// Travelled distance to a cell via its least rooted visited neighbour plus the straight
    /// line distance left to the target.
    fn estimated_cost(&self, grid: &Grid, index: usize, target: Coordinate) -> f32 {
        let coord = grid.index_to_coordinate(index);
        let anchor = self.least_rooted_visited_link(grid, index).unwrap_or(index);

        let mut step_from = grid.index_to_coordinate(anchor);
        let mut travelled = coord.euclidean_distance(step_from);
        for ancestor in self.ancestors(anchor).skip(1) {
            let step_to = grid.index_to_coordinate(ancestor);
            travelled += step_from.euclidean_distance(step_to);
            step_from = step_to;
        }

        travelled + coord.euclidean_distance(target)
    }

    /// The visited cell linked to `index` with the fewest search ancestors.
    /// A fewest count of zero counts as unset, so a cell linked to the root prefers a later
    /// visited link.
    fn least_rooted_visited_link(&self, grid: &Grid, index: usize) -> Option<usize> {
        let mut anchor = None;
        let mut fewest_ancestors = 0;
        for link in grid.link_indices(index).filter(|&link| self.visited.contains(link)) {
            let ancestors_count = self.ancestors(link).count() - 1;
            if fewest_ancestors > ancestors_count || fewest_ancestors == 0 {
                fewest_ancestors = ancestors_count;
                anchor = Some(link);
            }
        }
        anchor
    }

    fn ancestors(&self, index: usize) -> Ancestors {
        Ancestors {
            parents: &self.parents,
            next: Some(index),
            steps: 0,
        }
    }
}

/// Walks the search parents from a cell up to the root of the search, the cell itself first.
struct Ancestors<'a> {
    parents: &'a [Option<usize>],
    next: Option<usize>,
    steps: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        self.steps += 1;
        if self.steps > self.parents.len() {
            panic!("search parents from cell index {} form a cycle", index);
        }
        self.next = self.parents[index];
        Some(index)
    }
}

#[cfg(test)]
mod tests {

    use quickcheck::quickcheck;

    use super::*;
    use crate::generators::{generate, GenerationConfigBuilder};
    use crate::maze::Maze;
    use crate::units::{ExitsCount, Height, Width};

    fn open_grid(w: usize, h: usize) -> Grid {
        let mut g = Grid::new(Width(w), Height(h)).expect("valid grid dimensions");
        for coord in g.iter().collect::<Vec<Coordinate>>() {
            for neighbour in &[Coordinate::new(coord.x + 1, coord.y),
                               Coordinate::new(coord.x, coord.y + 1)] {
                if g.is_valid_coordinate(*neighbour) {
                    g.link(coord, *neighbour).expect("link failed");
                }
            }
        }
        g
    }

    fn corridor() -> Maze {
        let config = GenerationConfigBuilder::new(Width(3), Height(1))
            .wall_break_probability(0.0)
            .exits(ExitsCount(0))
            .build();
        generate(&config, 8).expect("valid generation config")
    }

    fn is_connected_route(g: &Grid, path: &[Coordinate]) -> bool {
        path.windows(2).all(|pair| g.is_linked(pair[0], pair[1]))
    }

    #[test]
    #[should_panic(expected = "form a cycle")]
    fn cyclic_search_parents_panic() {
        let mut pathfinder = Pathfinder::new();
        pathfinder.parents = vec![Some(1), Some(0)];
        let _ = pathfinder.ancestors(0).count();
    }

    #[test]
    fn start_is_target() {
        let g = open_grid(3, 3);
        let mut pathfinder = Pathfinder::new();
        let here = Coordinate::new(1, 1);
        assert_eq!(pathfinder.find_path(&g, here, here).unwrap(), vec![here]);
        assert!(!pathfinder.no_path());
    }

    #[test]
    fn invalid_coordinates_rejected() {
        let g = open_grid(3, 3);
        let mut pathfinder = Pathfinder::new();
        let outside = Coordinate::new(3, 0);
        match pathfinder.find_path(&g, outside, Coordinate::new(0, 0)) {
            Err(Error(ErrorKind::InvalidCoordinate(c), _)) => assert_eq!(c, outside),
            other => panic!("expected an invalid coordinate, got {:?}", other),
        }
        assert!(pathfinder.find_path(&g, Coordinate::new(0, 0), outside).is_err());
        assert!(!pathfinder.no_path());
    }

    #[test]
    fn open_grid_corner_to_corner() {
        let g = open_grid(3, 3);
        let mut pathfinder = Pathfinder::new();
        let (start, end) = (Coordinate::new(0, 0), Coordinate::new(2, 2));
        let path = pathfinder.find_path(&g, start, end).unwrap();

        assert!(!pathfinder.no_path());
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert!(is_connected_route(&g, &path));
        assert_eq!(pathfinder.search_parent(&g, start), None);
        assert_eq!(pathfinder.search_parent(&g, end), Some(path[3]));
    }

    #[test]
    fn generated_3x3_corner_to_corner() {
        let config = GenerationConfigBuilder::new(Width(3), Height(3))
            .wall_break_probability(0.0)
            .exits(ExitsCount(0))
            .build();
        for seed in 0..10 {
            let maze = generate(&config, seed).unwrap();
            assert_eq!(maze.grid().links_count(), 8);

            let mut pathfinder = Pathfinder::new();
            let (start, end) = (Coordinate::new(0, 0), Coordinate::new(2, 2));
            let path = pathfinder.find_path(maze.grid(), start, end).unwrap();
            assert!(!pathfinder.no_path());
            assert_eq!(path.first(), Some(&start));
            assert_eq!(path.last(), Some(&end));
            // A perfect 3x3 maze can wind through all 9 cells between opposite corners.
            assert!(path.len() <= 9);
            assert!(is_connected_route(maze.grid(), &path));
        }
    }

    #[test]
    fn routes_around_blocked_cells() {
        let mut g = open_grid(2, 2);
        g.set_contents(Coordinate::new(1, 0), CellContents::Blocked).unwrap();
        let mut pathfinder = Pathfinder::new();
        let path = pathfinder.find_path(&g, Coordinate::new(0, 0), Coordinate::new(1, 1)).unwrap();
        assert!(!pathfinder.no_path());
        assert_eq!(path,
                   vec![Coordinate::new(0, 0), Coordinate::new(0, 1), Coordinate::new(1, 1)]);
    }

    #[test]
    fn blocked_corridor_tunnels_on_the_second_search() {
        let mut maze = corridor();
        let g = maze.grid_mut();
        assert_eq!(g.links_count(), 2);
        let blocked = Coordinate::new(1, 0);
        g.set_contents(blocked, CellContents::Blocked).unwrap();

        let (start, end) = (Coordinate::new(0, 0), Coordinate::new(2, 0));
        let mut pathfinder = Pathfinder::new();

        let first = pathfinder.find_path(g, start, end).unwrap();
        assert!(pathfinder.no_path());
        assert_eq!(first, vec![start]);
        assert!(!first.contains(&blocked));

        let second = pathfinder.find_path(g, start, end).unwrap();
        assert!(!pathfinder.no_path());
        assert_eq!(second, vec![start, blocked, end]);
    }

    #[test]
    fn failed_search_ends_at_the_last_expanded_cell() {
        let mut g = open_grid(3, 1);
        g.set_contents(Coordinate::new(2, 0), CellContents::Blocked).unwrap();
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(&g, Coordinate::new(0, 0), Coordinate::new(2, 0)).unwrap();
        assert!(pathfinder.no_path());
        assert_eq!(path, vec![Coordinate::new(0, 0), Coordinate::new(1, 0)]);

        let path = pathfinder.find_path(&g, Coordinate::new(0, 0), Coordinate::new(2, 0)).unwrap();
        assert!(!pathfinder.no_path());
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn unlinked_target_stays_unreachable() {
        let g = Grid::new(Width(2), Height(1)).unwrap();
        let mut pathfinder = Pathfinder::new();
        for _ in 0..2 {
            let path = pathfinder.find_path(&g, Coordinate::new(0, 0), Coordinate::new(1, 0))
                .unwrap();
            assert!(pathfinder.no_path());
            assert_eq!(path, vec![Coordinate::new(0, 0)]);
        }
    }

    #[test]
    fn pathfinder_reused_across_grid_sizes() {
        let mut pathfinder = Pathfinder::new();
        let big = open_grid(6, 6);
        let _ = pathfinder.find_path(&big, Coordinate::new(0, 0), Coordinate::new(5, 5)).unwrap();
        let small = open_grid(2, 1);
        let path = pathfinder.find_path(&small, Coordinate::new(1, 0), Coordinate::new(0, 0))
            .unwrap();
        assert_eq!(path, vec![Coordinate::new(1, 0), Coordinate::new(0, 0)]);
        assert_eq!(pathfinder.search_parent(&small, Coordinate::new(0, 0)),
                   Some(Coordinate::new(1, 0)));
    }

    #[test]
    fn quickcheck_paths_in_generated_mazes_are_valid() {
        fn prop(w: u8, h: u8, seed: u64, start: u16, end: u16) -> bool {
            let (w, h) = (1 + (w % 12) as usize, 1 + (h % 12) as usize);
            let config = GenerationConfigBuilder::new(Width(w), Height(h))
                .wall_break_probability(0.2)
                .exits(ExitsCount(0))
                .build();
            let maze = match generate(&config, seed) {
                Ok(maze) => maze,
                Err(_) => return false,
            };
            let g = maze.grid();
            let start = g.index_to_coordinate(start as usize % g.size());
            let end = g.index_to_coordinate(end as usize % g.size());

            let mut pathfinder = Pathfinder::new();
            match pathfinder.find_path(g, start, end) {
                Ok(path) => {
                    !pathfinder.no_path() && path.first() == Some(&start) &&
                    path.last() == Some(&end) && is_connected_route(g, &path)
                }
                Err(_) => false,
            }
        }
        quickcheck(prop as fn(u8, u8, u64, u16, u16) -> bool);
    }
}
