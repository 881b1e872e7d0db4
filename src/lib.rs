//! Food Snake - a terminal Snake game with food that does more than grow you
//!
//! This library provides:
//! - Core game logic: movement, collisions, timed food effects (game module)
//! - Key mapping (input module)
//! - TUI rendering (render module)
//! - In-session statistics (metrics module)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
