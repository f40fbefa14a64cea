//! The moves players and computer agents make on a maze between path searches.

use error_chain::bail;
use log::debug;

use crate::cells::{CellContents, CompassPrimary, Coordinate, OccupantId};
use crate::errors::*;
use crate::grid::Grid;
use crate::maze::Maze;
use crate::pathing::Pathfinder;

/// What a player's action towards a neighbouring cell did to the maze.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum ActionOutcome {
    /// The linked neighbour was blocked, agents now have to route around it.
    Blocked(Coordinate),
    /// The wall to the neighbour was knocked down.
    WallPunched(Coordinate),
    /// Off the edge of the maze, or a linked entrance or exit which cannot be blocked.
    Nothing,
}

/// The outcome of one computer agent turn.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct ChaseStep {
    /// Length of the route found towards the target, the agent's distance from it.
    pub distance: usize,
    /// The cell the agent moves into. None when it stays put.
    pub claimed: Option<Coordinate>,
    /// Whether the search failed, so the next search may tunnel through blocked cells.
    pub no_path: bool,
}

/// The cell a player standing at `position` may move into, if any.
pub fn step_target(grid: &Grid,
                   position: Coordinate,
                   direction: CompassPrimary)
                   -> Option<Coordinate> {
    grid.neighbour_at_direction(position, direction).and_then(|neighbour| {
        let passable = grid.contents(neighbour) != Some(CellContents::Blocked);
        if passable && grid.is_linked(position, neighbour) {
            Some(neighbour)
        } else {
            None
        }
    })
}

/// Act on the neighbour of `position` in the given direction instead of moving.
///
/// A linked neighbour that is not an entrance or exit becomes blocked. An unlinked neighbour
/// gets linked, the player digging through the wall.
pub fn player_action(grid: &mut Grid,
                     position: Coordinate,
                     direction: CompassPrimary)
                     -> Result<ActionOutcome> {
    if !grid.is_valid_coordinate(position) {
        bail!(ErrorKind::InvalidCoordinate(position));
    }
    let neighbour = match grid.neighbour_at_direction(position, direction) {
        Some(neighbour) => neighbour,
        None => return Ok(ActionOutcome::Nothing),
    };

    if grid.is_linked(position, neighbour) {
        let contents = grid.contents(neighbour).unwrap_or_default();
        if contents.is_portal() {
            Ok(ActionOutcome::Nothing)
        } else {
            grid.set_contents(neighbour, CellContents::Blocked)?;
            Ok(ActionOutcome::Blocked(neighbour))
        }
    } else {
        grid.link(position, neighbour)?;
        Ok(ActionOutcome::WallPunched(neighbour))
    }
}

/// Take one turn for a computer agent at `position` chasing `target`.
///
/// The agent moves one cell along a freshly searched route. A blocked cell on the way is
/// cleared as the agent claims it. Entrances and exits keep their tag whatever stands on them.
pub fn chase_step(pathfinder: &mut Pathfinder,
                  maze: &mut Maze,
                  agent: OccupantId,
                  position: Coordinate,
                  target: Coordinate)
                  -> Result<ChaseStep> {
    let path = pathfinder.find_path(maze.grid(), position, target)?;
    let claimed = path.get(1).cloned();

    if let Some(next) = claimed {
        let grid = maze.grid_mut();

        let next_contents = grid.contents(next).unwrap_or_default();
        if !next_contents.is_portal() {
            grid.set_contents(next, CellContents::Occupied)?;
        }
        grid.set_occupant(next, Some(agent))?;

        if !grid.contents(position).unwrap_or_default().is_portal() {
            grid.set_contents(position, CellContents::Empty)?;
        }
        grid.set_occupant(position, None)?;

        debug!("agent {} moves {:?} -> {:?}, {} cells from {:?}",
               agent,
               position,
               next,
               path.len(),
               target);
    }

    Ok(ChaseStep {
        distance: path.len(),
        claimed,
        no_path: pathfinder.no_path(),
    })
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::PLAYER_OCCUPANT;
    use crate::generators::{generate, GenerationConfigBuilder};
    use crate::units::{ExitsCount, Height, Width};

    fn corridor(length: usize) -> Maze {
        let config = GenerationConfigBuilder::new(Width(length), Height(1))
            .wall_break_probability(0.0)
            .exits(ExitsCount(0))
            .build();
        generate(&config, 21).expect("valid generation config")
    }

    #[test]
    fn stepping_needs_a_passage_to_an_unblocked_cell() {
        let mut g = Grid::new(Width(2), Height(2)).unwrap();
        let origin = Coordinate::new(0, 0);
        g.link(origin, Coordinate::new(1, 0)).unwrap();

        assert_eq!(step_target(&g, origin, CompassPrimary::East), Some(Coordinate::new(1, 0)));
        assert_eq!(step_target(&g, origin, CompassPrimary::South), None);
        assert_eq!(step_target(&g, origin, CompassPrimary::North), None);
        assert_eq!(step_target(&g, origin, CompassPrimary::West), None);

        g.set_contents(Coordinate::new(1, 0), CellContents::Blocked).unwrap();
        assert_eq!(step_target(&g, origin, CompassPrimary::East), None);
    }

    #[test]
    fn acting_blocks_or_digs() {
        let mut g = Grid::new(Width(3), Height(2)).unwrap();
        let origin = Coordinate::new(1, 0);
        g.link(origin, Coordinate::new(2, 0)).unwrap();
        g.link(origin, Coordinate::new(0, 0)).unwrap();
        g.set_contents(Coordinate::new(0, 0), CellContents::Exit).unwrap();

        assert_eq!(player_action(&mut g, origin, CompassPrimary::East).unwrap(),
                   ActionOutcome::Blocked(Coordinate::new(2, 0)));
        assert_eq!(g.contents(Coordinate::new(2, 0)), Some(CellContents::Blocked));
        assert!(g.is_linked(origin, Coordinate::new(2, 0)));

        assert_eq!(player_action(&mut g, origin, CompassPrimary::West).unwrap(),
                   ActionOutcome::Nothing);
        assert_eq!(g.contents(Coordinate::new(0, 0)), Some(CellContents::Exit));

        assert_eq!(player_action(&mut g, origin, CompassPrimary::South).unwrap(),
                   ActionOutcome::WallPunched(Coordinate::new(1, 1)));
        assert!(g.is_linked(origin, Coordinate::new(1, 1)));
        assert_eq!(g.contents(Coordinate::new(1, 1)), Some(CellContents::Empty));

        assert_eq!(player_action(&mut g, origin, CompassPrimary::North).unwrap(),
                   ActionOutcome::Nothing);
        assert!(player_action(&mut g, Coordinate::new(3, 0), CompassPrimary::West).is_err());
    }

    #[test]
    fn agent_walks_towards_the_player() {
        let mut maze = corridor(4);
        let player = Coordinate::new(3, 0);
        let agent_start = Coordinate::new(0, 0);
        {
            let g = maze.grid_mut();
            g.set_occupant(player, Some(PLAYER_OCCUPANT)).unwrap();
            g.set_contents(agent_start, CellContents::Occupied).unwrap();
            g.set_occupant(agent_start, Some(1)).unwrap();
        }

        let mut pathfinder = Pathfinder::new();
        let step = chase_step(&mut pathfinder, &mut maze, 1, agent_start, player).unwrap();
        assert_eq!(step,
                   ChaseStep {
                       distance: 4,
                       claimed: Some(Coordinate::new(1, 0)),
                       no_path: false,
                   });

        let g = maze.grid();
        assert_eq!(g.contents(agent_start), Some(CellContents::Empty));
        assert_eq!(g.occupant(agent_start), None);
        assert_eq!(g.contents(Coordinate::new(1, 0)), Some(CellContents::Occupied));
        assert_eq!(g.occupant(Coordinate::new(1, 0)), Some(1));

        let step = chase_step(&mut pathfinder, &mut maze, 1, Coordinate::new(1, 0), player)
            .unwrap();
        assert_eq!(step.distance, 3);
        assert_eq!(step.claimed, Some(Coordinate::new(2, 0)));
    }

    #[test]
    fn agent_at_the_target_stays_put() {
        let mut maze = corridor(2);
        let here = Coordinate::new(0, 0);
        let mut pathfinder = Pathfinder::new();
        let step = chase_step(&mut pathfinder, &mut maze, 2, here, here).unwrap();
        assert_eq!(step.distance, 1);
        assert_eq!(step.claimed, None);
        assert_eq!(maze.grid().contents(here), Some(CellContents::Empty));
    }

    #[test]
    fn walled_in_agent_digs_out_on_its_next_turn() {
        let mut maze = corridor(3);
        let (agent_start, blocked, player) =
            (Coordinate::new(0, 0), Coordinate::new(1, 0), Coordinate::new(2, 0));
        maze.grid_mut().set_contents(blocked, CellContents::Blocked).unwrap();

        let mut pathfinder = Pathfinder::new();
        let stuck = chase_step(&mut pathfinder, &mut maze, 1, agent_start, player).unwrap();
        assert_eq!(stuck,
                   ChaseStep {
                       distance: 1,
                       claimed: None,
                       no_path: true,
                   });

        let dig = chase_step(&mut pathfinder, &mut maze, 1, agent_start, player).unwrap();
        assert_eq!(dig.claimed, Some(blocked));
        assert!(!dig.no_path);
        assert_eq!(maze.grid().contents(blocked), Some(CellContents::Occupied));
        assert_eq!(maze.grid().occupant(blocked), Some(1));
    }

    #[test]
    fn portals_keep_their_tags() {
        let mut maze = corridor(3);
        let (exit, entrance) = (Coordinate::new(1, 0), Coordinate::new(0, 0));
        maze.grid_mut().set_contents(exit, CellContents::Exit).unwrap();
        maze.grid_mut().set_contents(entrance, CellContents::Entrance).unwrap();

        let mut pathfinder = Pathfinder::new();
        let step = chase_step(&mut pathfinder, &mut maze, 4, entrance, Coordinate::new(2, 0))
            .unwrap();
        assert_eq!(step.claimed, Some(exit));
        let g = maze.grid();
        assert_eq!(g.contents(exit), Some(CellContents::Exit));
        assert_eq!(g.occupant(exit), Some(4));
        assert_eq!(g.contents(entrance), Some(CellContents::Entrance));
        assert_eq!(g.occupant(entrance), None);
    }
}
