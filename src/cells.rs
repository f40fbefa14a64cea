use std::convert::From;

use smallvec::SmallVec;

pub type CoordinateSmallVec = SmallVec<[Coordinate; 4]>;

/// Position of a cell on the grid. `x` runs along a row, `y` down a column.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub fn new(x: u32, y: u32) -> Coordinate {
        Coordinate { x, y }
    }

    /// Straight line distance between the centres of two cells.
    #[inline]
    pub fn euclidean_distance(&self, other: Coordinate) -> f32 {
        let xd = self.x as f32 - other.x as f32;
        let yd = self.y as f32 - other.y as f32;
        (xd * xd + yd * yd).sqrt()
    }

    /// Creates a new `Coordinate` offset 1 cell away in the given direction.
    /// Returns None if the coordinate is not representable; the grid bounds are not checked.
    pub fn offset(&self, dir: CompassPrimary) -> Option<Coordinate> {
        let (x, y) = (self.x, self.y);
        match dir {
            CompassPrimary::North => {
                if y > 0 {
                    Some(Coordinate::new(x, y - 1))
                } else {
                    None
                }
            }
            CompassPrimary::South => y.checked_add(1).map(|y| Coordinate::new(x, y)),
            CompassPrimary::East => x.checked_add(1).map(|x| Coordinate::new(x, y)),
            CompassPrimary::West => {
                if x > 0 {
                    Some(Coordinate::new(x - 1, y))
                } else {
                    None
                }
            }
        }
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from(x_y_pair: (u32, u32)) -> Coordinate {
        Coordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

pub const COMPASS_PRIMARY_DIRECTIONS: [CompassPrimary; 4] = [CompassPrimary::North,
                                                             CompassPrimary::South,
                                                             CompassPrimary::East,
                                                             CompassPrimary::West];

/// What a cell currently holds. The tags are mutually exclusive.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellContents {
    Empty,
    Occupied,
    Blocked,
    Entrance,
    Exit,
}

impl Default for CellContents {
    fn default() -> CellContents {
        CellContents::Empty
    }
}

impl CellContents {
    /// Entrances and exits keep their tag whatever passes through them.
    #[inline]
    pub fn is_portal(self) -> bool {
        self == CellContents::Entrance || self == CellContents::Exit
    }
}

/// Identifies who is standing on, or has claimed, a cell.
pub type OccupantId = u32;

/// The human controlled agent. Computer agents are numbered from 1.
pub const PLAYER_OCCUPANT: OccupantId = 0;

/// Mutable per cell state that gameplay changes between searches.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct CellState {
    pub contents: CellContents,
    pub occupant: Option<OccupantId>,
}
