use std::fmt;
use std::rc::Rc;

use fnv::FnvHashSet;

use crate::cells::{CellContents, CellState, CompassPrimary, Coordinate, PLAYER_OCCUPANT};
use crate::grid::Grid;

/// Overlay deciding what is drawn inside a cell's body when a grid is rendered as text.
pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required. None leaves the body to the
    /// next overlay, or finally to the cell's own contents.
    fn render_cell_body(&self, _: Coordinate) -> Option<String> {
        None
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Coordinate>,
}
impl PathDisplay {
    pub fn new(path: &[Coordinate]) -> Self {
        PathDisplay { on_path_coordinates: path.iter().cloned().collect() }
    }
}
impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> Option<String> {
        if self.on_path_coordinates.contains(&coord) {
            Some(String::from(" . "))
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: Vec<Coordinate>,
    end_coordinates: Vec<Coordinate>,
}
impl StartEndPointsDisplay {
    pub fn new(starts: Vec<Coordinate>, ends: Vec<Coordinate>) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }
}
impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> Option<String> {
        if self.start_coordinates.contains(&coord) {
            Some(String::from(" S "))
        } else if self.end_coordinates.contains(&coord) {
            Some(String::from(" E "))
        } else {
            None
        }
    }
}

/// Stack of overlays, the first to render a cell body wins.
#[derive(Default)]
pub struct LayeredDisplay {
    layers: Vec<Rc<dyn GridDisplay>>,
}
impl LayeredDisplay {
    pub fn new() -> LayeredDisplay {
        LayeredDisplay::default()
    }

    pub fn with_layer(mut self, layer: Rc<dyn GridDisplay>) -> LayeredDisplay {
        self.layers.push(layer);
        self
    }
}
impl GridDisplay for LayeredDisplay {
    fn render_cell_body(&self, coord: Coordinate) -> Option<String> {
        self.layers.iter().filter_map(|layer| layer.render_cell_body(coord)).next()
    }
}

/// Text for a cell body when no overlay claims it.
pub fn contents_marker(state: CellState) -> String {
    match (state.contents, state.occupant) {
        (CellContents::Blocked, _) => String::from(" # "),
        (CellContents::Entrance, _) => String::from(" < "),
        (CellContents::Exit, _) => String::from(" > "),
        (_, Some(PLAYER_OCCUPANT)) => String::from(" @ "),
        (_, Some(agent)) => format!("{:^3}", agent % 10),
        (CellContents::Occupied, None) => String::from(" o "),
        (CellContents::Empty, None) => String::from("   "),
    }
}

impl Grid {
    fn cell_body(&self, coord: Coordinate) -> String {
        let overlay_body = self.grid_display()
            .as_ref()
            .and_then(|displayer| displayer.render_cell_body(coord));
        overlay_body.unwrap_or_else(|| {
            contents_marker(CellState {
                contents: self.contents(coord).unwrap_or_default(),
                occupant: self.occupant(coord),
            })
        })
    }

    /// The walls meeting at the south east corner of a cell.
    fn south_east_junction(&self, coord: Coordinate) -> &'static str {
        let east = self.neighbour_at_direction(coord, CompassPrimary::East);
        let south = self.neighbour_at_direction(coord, CompassPrimary::South);
        wall_junction(!self.is_neighbour_linked(coord, CompassPrimary::South),
                      east.map_or(false, |c| !self.is_neighbour_linked(c, CompassPrimary::South)),
                      !self.is_neighbour_linked(coord, CompassPrimary::East),
                      south.map_or(false, |c| !self.is_neighbour_linked(c, CompassPrimary::East)))
    }
}

/// Box drawing glyph for the wall arms present around a corner point.
fn wall_junction(left: bool, right: bool, up: bool, down: bool) -> &'static str {
    match (left, right, up, down) {
        (true, true, true, true) => "┼",
        (true, true, true, false) => "┴",
        (true, true, false, true) => "┬",
        (true, false, true, true) => "┤",
        (false, true, true, true) => "├",
        (true, true, false, false) => "─",
        (false, false, true, true) => "│",
        (false, true, true, false) => "└",
        (true, false, false, true) => "┐",
        (true, false, true, false) => "┘",
        (false, true, false, true) => "┌",
        (true, false, false, false) => "╴",
        (false, true, false, false) => "╶",
        (false, false, true, false) => "╵",
        (false, false, false, true) => "╷",
        (false, false, false, false) => " ",
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const WALL: &str = "───";
        const PASSAGE: &str = "   ";

        // The north boundary, every cell below draws only its own east and south sides.
        let mut output = String::from(wall_junction(false, true, false, true));
        for x in 0..self.width().0 {
            let coord = Coordinate::new(x as u32, 0);
            let has_east = self.neighbour_at_direction(coord, CompassPrimary::East).is_some();
            output.push_str(WALL);
            output.push_str(wall_junction(true,
                                          has_east,
                                          false,
                                          !self.is_neighbour_linked(coord, CompassPrimary::East)));
        }
        output.push('\n');

        for row in self.iter_row() {
            let mut bodies = String::from("│");
            let mut south_walls = String::new();

            for coord in row {
                let east_open = self.is_neighbour_linked(coord, CompassPrimary::East);
                let south_open = self.is_neighbour_linked(coord, CompassPrimary::South);

                bodies.push_str(&self.cell_body(coord));
                bodies.push_str(if east_open { " " } else { "│" });

                if coord.x == 0 {
                    let has_south = self.neighbour_at_direction(coord, CompassPrimary::South)
                        .is_some();
                    south_walls.push_str(wall_junction(false, !south_open, true, has_south));
                }
                south_walls.push_str(if south_open { PASSAGE } else { WALL });
                south_walls.push_str(self.south_east_junction(coord));
            }

            output.push_str(&bodies);
            output.push('\n');
            output.push_str(&south_walls);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}
