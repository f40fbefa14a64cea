use docopt::Docopt;
use error_chain::bail;
use itertools::Itertools;
use log::info;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde_derive::Deserialize;
use maze_chase::{
    cells::{CellContents, Coordinate, PLAYER_OCCUPANT},
    gameplay,
    generators::{self, GenerationConfig, GenerationConfigBuilder},
    grid::Grid,
    grid_displays::{LayeredDisplay, PathDisplay, StartEndPointsDisplay},
    levels::LevelSettings,
    maze::Maze,
    pathing::Pathfinder,
    units::{ExitsCount, Height, Width},
};
use std::{
    fs::File,
    io,
    io::prelude::*,
    rc::Rc
};

const USAGE: &str = "Maze Chase

Usage:
    maze_chase_driver -h | --help
    maze_chase_driver [options]
    maze_chase_driver (path | chase) --start-point-x=<x> --start-point-y=<y> --end-point-x=<e1> --end-point-y=<e2> [options]

Commands:
    path                      Search for a route from the start to the end point and show it. A failed search is retried once through blocked cells.
    chase                     An agent at the start point chases a player standing at the end point, one cell per turn.

Options:
    -h --help                 Show this screen.
    --grid-size=<n>           The grid size is n * n.
    --grid-width=<w>          The grid width in a w*h grid [default: 12].
    --grid-height=<h>         The grid height in a w*h grid [default: 12].
    --level=<l>               Derive the maze size, exits and entrance from a level number instead.
    --seed=<s>                Seed for maze generation. Random if not given.
    --wall-break-chance=<p>   Chance for a dead end to get an extra passage [default: 0.1].
    --exits=<n>               Number of exit cells [default: 1].
    --entrance                Place an entrance cell.
    --block=<cells>           Cells to block, as comma separated x,y pairs e.g. 1,0,2,3
    --start-point-x=<x>       x coordinate of the path start
    --start-point-y=<y>       y coordinate of the path start
    --end-point-x=<e1>        x coordinate of the path end
    --end-point-y=<e2>        y coordinate of the path end
    --turns=<n>               Most turns a chase may take [default: 100].
    --text-out=<path>         Output file path for a textual rendering of the maze.
    --save-edges=<path>       Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_path: bool,
    cmd_chase: bool,
    flag_grid_size: Option<usize>,
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_level: Option<u32>,
    flag_seed: Option<u64>,
    flag_wall_break_chance: f64,
    flag_exits: usize,
    flag_entrance: bool,
    flag_block: String,
    flag_start_point_x: Option<u32>,
    flag_start_point_y: Option<u32>,
    flag_end_point_x: Option<u32>,
    flag_end_point_y: Option<u32>,
    flag_turns: usize,
    flag_text_out: String,
    flag_save_edges: String,
}

mod errors {
    use error_chain::*;
    error_chain! {
        links {
            Maze(::maze_chase::errors::Error, ::maze_chase::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            ParseIntFailure(::std::num::ParseIntError);
        }
    }
}
use crate::errors::*;

const CHASING_AGENT: u32 = 1;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let seed = args.flag_seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("maze seed {}", seed);

    let config = generation_config(&args, seed);
    let mut maze = generators::generate(&config, seed).chain_err(|| "Failed to generate the maze")?;

    block_cells(&mut maze, &args.flag_block)?;

    if args.cmd_path {
        show_path(&mut maze, &args)?;
    } else if args.cmd_chase {
        run_chase(&mut maze, &args)?;
    }

    if args.flag_text_out.is_empty() {
        println!("{}", maze);
    } else {
        write_text_to_file(&format!("{}", maze), &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(maze.grid(), &args.flag_save_edges)?;
    }

    Ok(())
}

fn generation_config(maze_args: &MazeArgs, seed: u64) -> GenerationConfig {
    let mut config = if let Some(level) = maze_args.flag_level {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let settings = LevelSettings::for_level(level, &mut rng);
        info!("level {}: {}x{} maze, {} agents, {} exits, entrance {}",
              level,
              settings.width.0,
              settings.height.0,
              settings.agents,
              settings.exits.0,
              settings.with_entrance);
        GenerationConfig::from(&settings)
    } else {
        let (width, height) = if let Some(square_grid_size) = maze_args.flag_grid_size {
            (square_grid_size, square_grid_size)
        } else {
            (maze_args.flag_grid_width, maze_args.flag_grid_height)
        };
        GenerationConfigBuilder::new(Width(width), Height(height))
            .exits(ExitsCount(maze_args.flag_exits))
            .with_entrance(maze_args.flag_entrance)
            .build()
    };
    config.wall_break_probability = maze_args.flag_wall_break_chance;
    config
}

fn block_cells(maze: &mut Maze, cells_arg: &str) -> Result<()> {
    if cells_arg.is_empty() {
        return Ok(());
    }

    let numbers = cells_arg.split(',')
        .map(|n| n.trim().parse::<u32>())
        .collect::<::std::result::Result<Vec<u32>, _>>()?;
    if numbers.len() % 2 != 0 {
        bail!("Blocked cells need x,y pairs, got {}", cells_arg);
    }

    for (x, y) in numbers.into_iter().tuples() {
        maze.grid_mut()
            .set_contents(Coordinate::new(x, y), CellContents::Blocked)
            .chain_err(|| format!("Failed to block cell {},{}", x, y))?;
    }
    Ok(())
}

fn path_end_points(maze_args: &MazeArgs) -> Result<(Coordinate, Coordinate)> {
    match (maze_args.flag_start_point_x,
           maze_args.flag_start_point_y,
           maze_args.flag_end_point_x,
           maze_args.flag_end_point_y) {
        (Some(start_x), Some(start_y), Some(end_x), Some(end_y)) => {
            Ok((Coordinate::from((start_x, start_y)), Coordinate::from((end_x, end_y))))
        }
        _ => bail!("Both a start and an end point are required."),
    }
}

fn show_path(maze: &mut Maze, maze_args: &MazeArgs) -> Result<()> {
    let (start, end) = path_end_points(maze_args)?;

    let mut pathfinder = Pathfinder::new();
    let mut path = pathfinder.find_path(maze.grid(), start, end)?;
    if pathfinder.no_path() {
        println!("No open route from {:?} to {:?}, searching again through blocked cells.",
                 start,
                 end);
        path = pathfinder.find_path(maze.grid(), start, end)?;
    }
    println!("Route of {} cells, end reached: {}", path.len(), !pathfinder.no_path());

    set_maze_griddisplay(maze, start, end, &path);
    Ok(())
}

fn run_chase(maze: &mut Maze, maze_args: &MazeArgs) -> Result<()> {
    let (agent_start, player) = path_end_points(maze_args)?;
    {
        let grid = maze.grid_mut();
        grid.set_occupant(player, Some(PLAYER_OCCUPANT))?;
        if !grid.contents(agent_start).unwrap_or_default().is_portal() {
            grid.set_contents(agent_start, CellContents::Occupied)?;
        }
        grid.set_occupant(agent_start, Some(CHASING_AGENT))?;
    }

    let mut pathfinder = Pathfinder::new();
    let mut position = agent_start;
    let mut trail = vec![position];

    for turn in 1..=maze_args.flag_turns {
        let step = gameplay::chase_step(&mut pathfinder, maze, CHASING_AGENT, position, player)?;
        match step.claimed {
            Some(next) => {
                position = next;
                trail.push(next);
            }
            None if !step.no_path => break,
            None => {}
        }
        info!("turn {}: agent at {:?}, {} cells from the player", turn, position, step.distance);

        if position == player {
            println!("The agent caught the player after {} turns.", turn);
            break;
        }
    }
    if position != player {
        println!("The player escaped, the agent ended at ({}, {}).", position.x, position.y);
    }

    set_maze_griddisplay(maze, agent_start, player, &trail);
    Ok(())
}

fn set_maze_griddisplay(maze: &mut Maze, start: Coordinate, end: Coordinate, path: &[Coordinate]) {
    let display = LayeredDisplay::new()
        .with_layer(Rc::new(StartEndPointsDisplay::new(vec![start], vec![end])))
        .with_layer(Rc::new(PathDisplay::new(path)));
    maze.grid_mut().set_grid_display(Some(Rc::new(display)));
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze_grid: &Grid, file_path: &str) -> Result<()> {

    let mut graph_data = format!("{} {}\n", maze_grid.size(), maze_grid.links_count());

    for (src, dst) in maze_grid.iter_links() {
        let index_a = maze_grid
            .coordinate_to_index(src)
            .expect("Links iter should give valid coordinate");
        let index_b = maze_grid
            .coordinate_to_index(dst)
            .expect("Links iter should give valid coordinate");
        graph_data.push_str(&format!("{} {}\n", index_a + 1, index_b + 1));
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
