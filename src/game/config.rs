use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::state::{Board, Position, Viewport};

/// Relative odds of each food kind being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodWeights {
    pub growth: u32,
    pub speed_boost: u32,
    pub invert: u32,
}

impl Default for FoodWeights {
    fn default() -> Self {
        Self {
            growth: 60,
            speed_boost: 20,
            invert: 20,
        }
    }
}

/// Configuration for the game
///
/// Lengths are expressed in viewport units; the board is the viewport divided
/// by `cell_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of one square cell
    pub cell_size: u32,
    /// Width of the drawing area
    pub viewport_width: u32,
    /// Height of the drawing area
    pub viewport_height: u32,
    /// Resize the viewport to whatever the terminal offers
    pub fit_to_terminal: bool,
    /// Spawn point of the head, in viewport units
    pub origin_x: u32,
    pub origin_y: u32,
    /// Interval between game ticks
    pub tick_interval_ms: u64,
    /// How long speed boost and inverted controls last
    pub effect_duration_ms: u64,
    pub food_weights: FoodWeights,
    /// Never place food on a cell occupied by the snake
    pub food_avoids_snake: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 20,
            viewport_width: 800,
            viewport_height: 600,
            fit_to_terminal: true,
            origin_x: 100,
            origin_y: 100,
            tick_interval_ms: 100,
            effect_duration_ms: 3000,
            food_weights: FoodWeights::default(),
            food_avoids_snake: false,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a fixed viewport
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            fit_to_terminal: false,
            ..Default::default()
        }
    }

    /// Create a small fixed board (10x10 cells) for testing
    pub fn small() -> Self {
        Self::new(200, 200)
    }

    /// Read a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    pub fn board(&self) -> Board {
        Board::from_viewport(self.viewport(), self.cell_size)
    }

    /// Spawn cell of the head
    pub fn origin(&self) -> Position {
        Position::from_pixels(self.origin_x, self.origin_y, self.cell_size)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn effect_duration(&self) -> Duration {
        Duration::from_millis(self.effect_duration_ms)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(self.cell_size > 0, "cell_size must be positive");
        ensure!(self.tick_interval_ms > 0, "tick_interval_ms must be positive");
        ensure!(
            self.viewport_width >= self.cell_size && self.viewport_height >= self.cell_size,
            "viewport {}x{} is smaller than one cell of size {}",
            self.viewport_width,
            self.viewport_height,
            self.cell_size
        );
        ensure!(
            self.origin_x < self.viewport_width && self.origin_y < self.viewport_height,
            "origin ({}, {}) lies outside the viewport",
            self.origin_x,
            self.origin_y
        );
        let weights = self.food_weights;
        ensure!(
            weights.growth + weights.speed_boost + weights.invert > 0,
            "at least one food weight must be positive"
        );
        Ok(())
    }
}
