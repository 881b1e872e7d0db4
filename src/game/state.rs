use super::action::Direction;
use super::food::Food;
use super::timer::ModifierTimer;

/// Head speed, in cells per tick, outside of a speed boost
pub const NORMAL_SPEED: u32 = 1;
/// Head speed while a speed boost is active
pub const BOOSTED_SPEED: u32 = 2;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing the given viewport coordinates
    pub fn from_pixels(x: u32, y: u32, cell_size: u32) -> Self {
        Self::new((x / cell_size) as i32, (y / cell_size) as i32)
    }

    /// Top-left corner of this cell in viewport coordinates
    pub fn to_pixels(&self, cell_size: u32) -> (i32, i32) {
        let size = cell_size as i32;
        (self.x * size, self.y * size)
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Jump `cells` cells along a direction in one go
    pub fn moved_in_direction_by(&self, direction: Direction, cells: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * cells, dy * cells)
    }
}

/// Size of the drawing area the board is cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Playable area in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Whole cells that fit into the viewport; never smaller than one cell
    pub fn from_viewport(viewport: Viewport, cell_size: u32) -> Self {
        let cell = cell_size.max(1);
        Self::new(
            (viewport.width / cell).max(1) as usize,
            (viewport.height / cell).max(1) as usize,
        )
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| Position::new(x as i32, y as i32)))
    }

    /// Nearest on-board cell
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(0, self.width as i32 - 1),
            pos.y.clamp(0, self.height as i32 - 1),
        )
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Each segment takes its predecessor's cell, then the head jumps `cells`
    /// cells along the current direction.
    pub fn advance(&mut self, cells: u32) {
        for i in (1..self.body.len()).rev() {
            self.body[i] = self.body[i - 1];
        }
        self.body[0] = self.body[0].moved_in_direction_by(self.direction, cells as i32);
    }

    /// Append a segment on top of the tail; the next advance pulls it into place
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.body.push(tail);
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake left the board
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Complete state of one game session
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Food,
    pub board: Board,
    pub paused: bool,
    pub inverted: bool,
    /// Cells the head travels per tick
    pub speed_multiplier: u32,
    pub speed_timer: ModifierTimer,
    pub invert_timer: ModifierTimer,
    /// Food eaten this game
    pub score: u32,
    pub steps: u32,
}

impl GameState {
    /// Create a new game state with default modifiers
    pub fn new(snake: Snake, food: Food, board: Board) -> Self {
        Self {
            snake,
            food,
            board,
            paused: false,
            inverted: false,
            speed_multiplier: NORMAL_SPEED,
            speed_timer: ModifierTimer::new(),
            invert_timer: ModifierTimer::new(),
            score: 0,
            steps: 0,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        self.board.contains(pos)
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.body.contains(&pos)
    }

    pub fn is_boosted(&self) -> bool {
        self.speed_multiplier > NORMAL_SPEED
    }
}
