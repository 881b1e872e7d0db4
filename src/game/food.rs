use anyhow::{Context, Result};
use rand::{
    Rng,
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
};

use super::config::FoodWeights;
use super::state::{Board, Position, Snake};

/// What happens when the snake eats a piece of food
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodKind {
    /// Adds one segment to the tail
    Growth,
    /// Doubles head speed for a while
    SpeedBoost,
    /// Swaps every direction key for its opposite for a while
    Invert,
}

impl FoodKind {
    pub const ALL: [FoodKind; 3] = [FoodKind::Growth, FoodKind::SpeedBoost, FoodKind::Invert];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodKind::Growth => "growth",
            FoodKind::SpeedBoost => "speed boost",
            FoodKind::Invert => "invert",
        }
    }
}

/// The single piece of food on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub position: Position,
    pub kind: FoodKind,
}

impl Food {
    pub fn new(position: Position, kind: FoodKind) -> Self {
        Self { position, kind }
    }
}

/// Weighted draw of food kinds
#[derive(Debug, Clone)]
pub struct FoodTable {
    dist: WeightedIndex<u32>,
}

impl FoodTable {
    pub fn new(weights: FoodWeights) -> Result<Self> {
        let dist = WeightedIndex::new([weights.growth, weights.speed_boost, weights.invert])
            .context("Invalid food weights")?;
        Ok(Self { dist })
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> FoodKind {
        FoodKind::ALL[self.dist.sample(rng)]
    }
}

/// Pick a uniformly random cell for the next food.
///
/// With `avoid_snake` the cell is drawn from the cells the snake does not
/// cover; a board with no free cell falls back to any cell.
pub fn random_cell<R: Rng + ?Sized>(
    board: Board,
    snake: &Snake,
    avoid_snake: bool,
    rng: &mut R,
) -> Position {
    if avoid_snake {
        let free: Vec<Position> = board
            .cells()
            .filter(|pos| !snake.body.contains(pos))
            .collect();
        if let Some(pos) = free.choose(rng) {
            return *pos;
        }
    }

    let x = rng.gen_range(0..board.width) as i32;
    let y = rng.gen_range(0..board.height) as i32;
    Position::new(x, y)
}
