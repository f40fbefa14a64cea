use bit_set::BitSet;
use error_chain::bail;
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::cells::{CellContents, Coordinate, CoordinateSmallVec};
use crate::errors::*;
use crate::grid::Grid;
use crate::maze::Maze;
use crate::units::{ExitsCount, Height, Width};

pub const DEFAULT_WALL_BREAK_PROBABILITY: f64 = 0.1;

/// Everything `generate` needs to know about the maze to build.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub width: Width,
    pub height: Height,
    /// Chance that a dead end cell gets one extra passage, making loops.
    pub wall_break_probability: f64,
    pub exits: ExitsCount,
    /// The very first maze of a run has no entrance to go back through.
    pub with_entrance: bool,
}

impl GenerationConfig {
    /// Check the preconditions of generation without doing any work.
    pub fn validate(&self) -> Result<()> {
        let (Width(w), Height(h)) = (self.width, self.height);
        if w == 0 || h == 0 {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }
        validate_probability(self.wall_break_probability)?;

        let ExitsCount(exits) = self.exits;
        let available = free_cells_count(w.saturating_mul(h), self.with_entrance);
        if exits > available {
            bail!(ErrorKind::TooManyExits(exits, available));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn new(width: Width, height: Height) -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: GenerationConfig {
                width,
                height,
                wall_break_probability: DEFAULT_WALL_BREAK_PROBABILITY,
                exits: ExitsCount(1),
                with_entrance: false,
            },
        }
    }

    pub fn wall_break_probability(mut self, probability: f64) -> GenerationConfigBuilder {
        self.config.wall_break_probability = probability;
        self
    }

    pub fn exits(mut self, exits: ExitsCount) -> GenerationConfigBuilder {
        self.config.exits = exits;
        self
    }

    pub fn with_entrance(mut self, with_entrance: bool) -> GenerationConfigBuilder {
        self.config.with_entrance = with_entrance;
        self
    }

    pub fn build(self) -> GenerationConfig {
        self.config
    }
}

/// Generate a maze from a seed. The same config and seed always give the same maze.
pub fn generate(config: &GenerationConfig, seed: u64) -> Result<Maze> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    generate_with_rng(config, &mut rng)
}

/// Generate a maze drawing all randomness from `rng`.
///
/// A randomized Prim spanning tree connects every cell, then some dead ends get an extra
/// passage so there is more than one route between many cells. Finally the entrance and exits
/// are tagged on random cells. The config is validated before anything is built.
pub fn generate_with_rng<R: Rng>(config: &GenerationConfig, rng: &mut R) -> Result<Maze> {
    config.validate()?;

    let mut grid = Grid::new(config.width, config.height)?;
    prim_spanning_tree(&mut grid, rng)?;
    let spanning_links = grid.links_count();

    break_random_walls(&mut grid, config.wall_break_probability, rng)?;
    let (entrance, exits) = place_entrance_and_exits(&mut grid,
                                                     config.with_entrance,
                                                     config.exits,
                                                     rng)?;

    debug!("generated {}x{} maze: {} spanning links, {} extra links, entrance {:?}, exits {:?}",
           config.width.0,
           config.height.0,
           spanning_links,
           grid.links_count() - spanning_links,
           entrance,
           exits);

    Ok(Maze::new(grid, entrance, exits))
}

/// Apply the randomized Prim algorithm to an unlinked grid.
///
/// The maze grows from one random cell. The frontier holds every cell next to the maze that is
/// not yet part of it. Each step takes a random frontier cell, links it to a random neighbour
/// already in the maze and pushes the frontier out around it. The frontier runs dry exactly
/// when every cell is in the maze, leaving a spanning tree of `size - 1` links.
pub fn prim_spanning_tree<R: Rng>(grid: &mut Grid, rng: &mut R) -> Result<()> {
    let cells_count = grid.size();
    let mut in_maze = BitSet::with_capacity(cells_count);
    let mut in_frontier = BitSet::with_capacity(cells_count);
    let mut frontier: Vec<usize> = Vec::with_capacity(cells_count);

    let first = rng.gen_range(0..cells_count);
    in_maze.insert(first);
    expand_frontier(grid, first, &in_maze, &mut in_frontier, &mut frontier);

    while !frontier.is_empty() {
        let next = frontier.swap_remove(rng.gen_range(0..frontier.len()));
        in_frontier.remove(next);

        let next_coord = grid.index_to_coordinate(next);
        let maze_neighbours = grid.neighbours(next_coord)
            .iter()
            .cloned()
            .filter(|coord| grid.coordinate_to_index(*coord).map_or(false, |i| in_maze.contains(i)))
            .collect::<CoordinateSmallVec>();
        let maze_coord = *maze_neighbours.choose(rng)
            .expect("frontier cells always neighbour the maze");

        grid.link(maze_coord, next_coord)?;
        in_maze.insert(next);
        expand_frontier(grid, next, &in_maze, &mut in_frontier, &mut frontier);
    }

    Ok(())
}

fn expand_frontier(grid: &Grid,
                   index: usize,
                   in_maze: &BitSet,
                   in_frontier: &mut BitSet,
                   frontier: &mut Vec<usize>) {
    let coord = grid.index_to_coordinate(index);
    for neighbour in grid.neighbours(coord).iter() {
        if let Some(neighbour_index) = grid.coordinate_to_index(*neighbour) {
            if !in_maze.contains(neighbour_index) && in_frontier.insert(neighbour_index) {
                frontier.push(neighbour_index);
            }
        }
    }
}

/// Break walls so the maze is no longer perfect.
///
/// A cell linked to fewer than half of its grid neighbours (integer halving, so in practice a
/// dead end with 4 neighbours) gets one extra link to a random unlinked neighbour with the given
/// probability. Links are only ever added.
pub fn break_random_walls<R: Rng>(grid: &mut Grid, probability: f64, rng: &mut R) -> Result<()> {
    validate_probability(probability)?;

    for index in 0..grid.size() {
        let coord = grid.index_to_coordinate(index);
        let neighbours = grid.neighbours(coord);
        let links_count = grid.link_indices(index).count();

        if links_count < neighbours.len() / 2 && rng.gen_bool(probability) {
            let unlinked = neighbours.iter()
                .cloned()
                .filter(|neighbour| !grid.is_linked(coord, *neighbour))
                .collect::<CoordinateSmallVec>();

            if let Some(&new_link) = unlinked.choose(rng) {
                trace!("breaking wall between {:?} and {:?}", coord, new_link);
                grid.link(coord, new_link)?;
            }
        }
    }

    Ok(())
}

/// Tag a random empty cell as the entrance, if wanted, then `exits` further distinct empty
/// cells as exits. Only contents change, the links are untouched.
pub fn place_entrance_and_exits<R: Rng>(grid: &mut Grid,
                                        with_entrance: bool,
                                        exits: ExitsCount,
                                        rng: &mut R)
                                        -> Result<(Option<Coordinate>, Vec<Coordinate>)> {
    let ExitsCount(exits_count) = exits;
    let empty_cells_count = grid.iter()
        .filter(|coord| grid.contents(*coord) == Some(CellContents::Empty))
        .count();
    let entrances_count = if with_entrance { 1 } else { 0 };
    if exits_count + entrances_count > empty_cells_count {
        let available = free_cells_count(empty_cells_count, with_entrance);
        bail!(ErrorKind::TooManyExits(exits_count, available));
    }

    let entrance = if with_entrance {
        Some(tag_random_empty_cell(grid, CellContents::Entrance, rng)?)
    } else {
        None
    };

    let mut exit_coords = Vec::with_capacity(exits_count);
    while exit_coords.len() < exits_count {
        exit_coords.push(tag_random_empty_cell(grid, CellContents::Exit, rng)?);
    }

    Ok((entrance, exit_coords))
}

// Callers guarantee at least one empty cell remains.
fn tag_random_empty_cell<R: Rng>(grid: &mut Grid,
                                 contents: CellContents,
                                 rng: &mut R)
                                 -> Result<Coordinate> {
    loop {
        let coord = grid.random_cell(rng);
        if grid.contents(coord) == Some(CellContents::Empty) {
            grid.set_contents(coord, contents)?;
            return Ok(coord);
        }
    }
}

fn free_cells_count(cells_count: usize, with_entrance: bool) -> usize {
    if with_entrance {
        cells_count.saturating_sub(1)
    } else {
        cells_count
    }
}

fn validate_probability(probability: f64) -> Result<()> {
    if probability >= 0.0 && probability <= 1.0 {
        Ok(())
    } else {
        Err(ErrorKind::InvalidProbability(probability).into())
    }
}
