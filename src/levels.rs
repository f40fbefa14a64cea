use rand::Rng;

use crate::generators::{GenerationConfig, DEFAULT_WALL_BREAK_PROBABILITY};
use crate::units::{ExitsCount, Height, Width};

/// Generation parameters for a level of the chase. Mazes get bigger, busier and gain more
/// exits as the level number grows, with diminishing steps.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSettings {
    pub level: u32,
    pub width: Width,
    pub height: Height,
    /// How many computer agents hunt the player on this level.
    pub agents: usize,
    pub exits: ExitsCount,
    /// Only the first level is entered without a way back.
    pub with_entrance: bool,
}

impl LevelSettings {
    /// Derive the settings of a level, drawing the maze dimensions from `rng`.
    ///
    /// Each quantity follows `floor(sqrt(stretch * level + min^2))`, which is `min` on the
    /// first level and grows like a square root after it.
    pub fn for_level<R: Rng>(level: u32, rng: &mut R) -> LevelSettings {
        let min_side = level_scale(level, 4.0, 8.0);
        let max_side = level_scale(level, 20.0, 8.0);
        let mut side = || if max_side > min_side {
            rng.gen_range(min_side..max_side)
        } else {
            min_side
        };
        let (width, height) = (side(), side());

        LevelSettings {
            level,
            width: Width(width),
            height: Height(height),
            agents: level_scale(level, 3.0, 1.0),
            exits: ExitsCount(level_scale(level, 0.5, 2.0)),
            with_entrance: level > 0,
        }
    }
}

impl<'a> From<&'a LevelSettings> for GenerationConfig {
    fn from(settings: &'a LevelSettings) -> GenerationConfig {
        GenerationConfig {
            width: settings.width,
            height: settings.height,
            wall_break_probability: DEFAULT_WALL_BREAK_PROBABILITY,
            exits: settings.exits,
            with_entrance: settings.with_entrance,
        }
    }
}

fn level_scale(level: u32, stretch: f32, min: f32) -> usize {
    (stretch * level as f32 + min * min).sqrt().floor() as usize
}
