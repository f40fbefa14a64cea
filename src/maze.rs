use std::fmt;

use crate::cells::Coordinate;
use crate::grid::Grid;

/// A generated maze: the cell graph plus the cells tagged as its entrance and exits.
///
/// A maze is built once per level and dropped as a whole when the level changes.
#[derive(Debug)]
pub struct Maze {
    grid: Grid,
    entrance: Option<Coordinate>,
    exits: Vec<Coordinate>,
}

impl Maze {
    pub(crate) fn new(grid: Grid, entrance: Option<Coordinate>, exits: Vec<Coordinate>) -> Maze {
        Maze { grid, entrance, exits }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Gameplay changes contents, occupants and punches through walls between turns.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[inline]
    pub fn entrance(&self) -> Option<Coordinate> {
        self.entrance
    }

    #[inline]
    pub fn exits(&self) -> &[Coordinate] {
        &self.exits
    }

    /// Which of the maze's exits, if any, a cell is.
    pub fn exit_index(&self, coord: Coordinate) -> Option<usize> {
        self.exits.iter().position(|&exit| exit == coord)
    }

    /// Look up a cell by position, None when outside of the maze.
    pub fn cell(&self, x: u32, y: u32) -> Option<Coordinate> {
        let coord = Coordinate::new(x, y);
        if self.grid.is_valid_coordinate(coord) {
            Some(coord)
        } else {
            None
        }
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.grid)
    }
}
