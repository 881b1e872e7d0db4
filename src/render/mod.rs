pub mod renderer;

pub use renderer::{Renderer, SNAKE_COLOR, food_color};
