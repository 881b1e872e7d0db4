//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Time enters only as `Instant` arguments, so the engine can be driven by a real
//! event loop or stepped by hand in tests.

pub mod action;
pub mod config;
pub mod engine;
pub mod food;
pub mod hooks;
pub mod state;
pub mod timer;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::{FoodWeights, GameConfig};
pub use engine::{GameEngine, StepResult};
pub use food::{Food, FoodKind};
pub use hooks::{GameHooks, GameOverReport, NoHooks};
pub use state::{Board, CollisionType, GameState, Position, Snake, Viewport};
pub use timer::ModifierTimer;
