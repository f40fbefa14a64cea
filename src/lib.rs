//! **maze_chase** generates grid mazes and finds routes through them for agents chasing a
//! moving target.
//!
//! A maze is grown as a random spanning tree with a few extra passages, then handed to the
//! gameplay layer which blocks cells and digs through walls between searches.

pub mod cells;
pub mod errors;
pub mod gameplay;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod levels;
pub mod maze;
pub mod pathing;
pub mod units;
