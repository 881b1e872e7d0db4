use super::{
    action::{Action, Direction},
    config::GameConfig,
    food::{self, Food, FoodKind, FoodTable},
    hooks::{GameHooks, GameOverReport},
    state::{BOOSTED_SPEED, Board, CollisionType, GameState, NORMAL_SPEED, Snake, Viewport},
};
use anyhow::Result;
use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use std::time::Instant;

/// Result of a game tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the snake moved (false while paused)
    pub moved: bool,
    /// Kind of the food eaten this tick
    pub ate_food: Option<FoodKind>,
    /// Set when the tick ended the game; the engine has already reset
    pub game_over: Option<GameOverReport>,
}

impl StepResult {
    fn idle() -> Self {
        Self {
            moved: false,
            ate_food: None,
            game_over: None,
        }
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    board: Board,
    food_table: FoodTable,
    rng: StdRng,
    state: GameState,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as `new`, with reproducible food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;
        let food_table = FoodTable::new(config.food_weights)?;
        let board = config.board();
        let state = fresh_state(&config, board, &food_table, &mut rng);

        Ok(Self {
            config,
            board,
            food_table,
            rng,
            state,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Re-derive the board from a new viewport size. The running game keeps
    /// going on the new board; food left outside it is placed again.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let board = Board::from_viewport(viewport, self.config.cell_size);
        if board != self.board {
            debug!("board resized to {}x{}", board.width, board.height);
            self.board = board;
            self.state.board = board;
            if !board.contains(self.state.food.position) {
                self.state.food = self.position_food();
            }
        }
    }

    /// Reset the snake, modifiers and food, then start the tick source
    pub fn start_new_game<H: GameHooks + ?Sized>(&mut self, hooks: &mut H) {
        self.state = fresh_state(&self.config, self.board, &self.food_table, &mut self.rng);
        info!(
            "new game on a {}x{} board, food {:?} at ({}, {})",
            self.board.width,
            self.board.height,
            self.state.food.kind,
            self.state.food.position.x,
            self.state.food.position.y
        );
        hooks.start_ticks();
    }

    /// Advance the game by one tick
    pub fn on_tick<H: GameHooks + ?Sized>(&mut self, now: Instant, hooks: &mut H) -> StepResult {
        self.expire_modifiers(now);
        debug_assert!(!self.state.snake.is_empty());

        if self.state.paused {
            return StepResult::idle();
        }

        self.state.snake.advance(self.state.speed_multiplier);
        self.state.steps += 1;

        if let Some(cause) = self.check_collision() {
            let report = self.game_over(cause, hooks);
            return StepResult {
                moved: true,
                ate_food: None,
                game_over: Some(report),
            };
        }

        let mut ate_food = None;
        if self.state.snake.head() == self.state.food.position {
            let kind = self.state.food.kind;
            self.state.score += 1;
            self.apply_food_effect(kind, now);
            self.state.food = self.position_food();
            ate_food = Some(kind);
        }

        StepResult {
            moved: true,
            ate_food,
            game_over: None,
        }
    }

    /// Handle a key from the input source. Returns whether the state changed.
    pub fn on_input(&mut self, action: Action) -> bool {
        match action {
            Action::TogglePause => {
                self.state.paused = !self.state.paused;
                debug!("paused: {}", self.state.paused);
                true
            }
            Action::Move(_) if self.state.paused => false,
            Action::Move(requested) => {
                let direction = if self.state.inverted {
                    requested.opposite()
                } else {
                    requested
                };
                self.turn(direction)
            }
        }
    }

    /// Fire the modifier timers whose deadline has passed
    pub fn expire_modifiers(&mut self, now: Instant) -> bool {
        let mut expired = false;

        if self.state.speed_timer.fire(now) {
            self.state.speed_multiplier = NORMAL_SPEED;
            debug!("speed boost expired");
            expired = true;
        }

        if self.state.invert_timer.fire(now) {
            self.state.inverted = false;
            debug!("inverted controls expired");
            expired = true;
        }

        expired
    }

    /// Earliest pending modifier deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.state.speed_timer.deadline(),
            self.state.invert_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    // Reject 180-degree turns
    fn turn(&mut self, direction: Direction) -> bool {
        if self.state.snake.direction.is_opposite(direction) {
            return false;
        }
        self.state.snake.direction = direction;
        true
    }

    fn check_collision(&self) -> Option<CollisionType> {
        let head = self.state.snake.head();

        if !self.state.is_in_bounds(head) {
            return Some(CollisionType::Wall);
        }

        if self.state.snake.collides_with_body(head) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn apply_food_effect(&mut self, kind: FoodKind, now: Instant) {
        let duration = self.config.effect_duration();

        match kind {
            FoodKind::Growth => self.state.snake.grow(),
            FoodKind::SpeedBoost => {
                self.state.speed_multiplier = BOOSTED_SPEED;
                self.state.speed_timer.arm(now, duration);
            }
            FoodKind::Invert => {
                self.state.inverted = true;
                self.state.invert_timer.arm(now, duration);
            }
        }

        debug!(
            "ate {} food, length {}, score {}",
            kind.as_str(),
            self.state.snake.len(),
            self.state.score
        );
    }

    fn position_food(&mut self) -> Food {
        let position = food::random_cell(
            self.board,
            &self.state.snake,
            self.config.food_avoids_snake,
            &mut self.rng,
        );
        Food::new(position, self.food_table.draw(&mut self.rng))
    }

    fn game_over<H: GameHooks + ?Sized>(
        &mut self,
        cause: CollisionType,
        hooks: &mut H,
    ) -> GameOverReport {
        let report = GameOverReport {
            cause,
            length: self.state.snake.len(),
            score: self.state.score,
            steps: self.state.steps,
        };
        info!(
            "game over ({:?}) after {} steps, length {}",
            cause, report.steps, report.length
        );

        hooks.stop_ticks();
        hooks.game_over(&report);
        self.start_new_game(hooks);

        report
    }
}

fn fresh_state(
    config: &GameConfig,
    board: Board,
    food_table: &FoodTable,
    rng: &mut StdRng,
) -> GameState {
    let head = board.clamp(config.origin());
    let snake = Snake::new(head, Direction::Right, 1);
    let position = food::random_cell(board, &snake, config.food_avoids_snake, rng);
    let food = Food::new(position, food_table.draw(rng));

    GameState::new(snake, food, board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{config::FoodWeights, hooks::NoHooks, state::Position};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingHooks {
        starts: u32,
        stops: u32,
        reports: Vec<GameOverReport>,
    }

    impl GameHooks for RecordingHooks {
        fn start_ticks(&mut self) {
            self.starts += 1;
        }

        fn stop_ticks(&mut self) {
            self.stops += 1;
        }

        fn game_over(&mut self, report: &GameOverReport) {
            // The notification comes before the reset
            assert_eq!(self.stops, self.starts);
            self.reports.push(*report);
        }
    }

    /// 40x30 board, food parked in the bottom-right corner
    fn engine() -> (GameEngine, RecordingHooks) {
        engine_with(GameConfig::new(800, 600))
    }

    fn engine_with(config: GameConfig) -> (GameEngine, RecordingHooks) {
        let mut engine = GameEngine::with_seed(config, 42).unwrap();
        let mut hooks = RecordingHooks::default();
        engine.start_new_game(&mut hooks);
        park_food(&mut engine);
        (engine, hooks)
    }

    // Keep respawned food out of the snake's path
    fn park_food(engine: &mut GameEngine) {
        let board = engine.board();
        let corner = Position::new(board.width as i32 - 1, board.height as i32 - 1);
        engine.state_mut().food = Food::new(corner, FoodKind::Growth);
    }

    fn place_food_ahead(engine: &mut GameEngine, kind: FoodKind) {
        let snake = &engine.state().snake;
        let ahead = snake
            .head()
            .moved_in_direction_by(snake.direction, engine.state().speed_multiplier as i32);
        engine.state_mut().food = Food::new(ahead, kind);
    }

    #[test]
    fn test_new_game_defaults() {
        let (engine, hooks) = engine();
        let state = engine.state();

        assert_eq!(hooks.starts, 1);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.snake.head().to_pixels(20), (100, 100));
        assert_eq!(state.snake.direction, Direction::Right);
        assert!(!state.paused);
        assert!(!state.inverted);
        assert_eq!(state.speed_multiplier, 1);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_tick_moves_head_one_cell() {
        let (mut engine, mut hooks) = engine();

        let result = engine.on_tick(Instant::now(), &mut hooks);

        assert!(result.moved);
        assert_eq!(result.ate_food, None);
        assert_eq!(result.game_over, None);
        assert_eq!(engine.state().snake.head().to_pixels(20), (120, 100));
        assert_eq!(engine.state().snake.len(), 1);
    }

    #[test]
    fn test_length_constant_without_food() {
        let (mut engine, mut hooks) = engine();
        let now = Instant::now();

        engine.state_mut().snake = Snake::new(Position::new(5, 5), Direction::Right, 4);
        for step in 0..10 {
            engine.on_tick(now + Duration::from_millis(100 * step), &mut hooks);
            assert_eq!(engine.state().snake.len(), 4);
        }
        assert_eq!(engine.state().snake.head(), Position::new(15, 5));
        assert_eq!(engine.state().steps, 10);
    }

    #[test]
    fn test_growth_food() {
        let mut config = GameConfig::new(800, 600);
        config.food_avoids_snake = true;
        let (mut engine, mut hooks) = engine_with(config);
        place_food_ahead(&mut engine, FoodKind::Growth);

        let result = engine.on_tick(Instant::now(), &mut hooks);

        assert_eq!(result.ate_food, Some(FoodKind::Growth));
        let state = engine.state();
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.score, 1);
        assert_ne!(state.food.position, state.snake.head());
        assert!(state.board.contains(state.food.position));

        park_food(&mut engine);
        // The new tail sits on the old tail until the next tick
        engine.on_tick(Instant::now(), &mut hooks);
        assert_eq!(
            engine.state().snake.body,
            vec![Position::new(7, 5), Position::new(6, 5)]
        );
    }

    #[test]
    fn test_only_growth_changes_length() {
        let (mut engine, mut hooks) = engine();
        let now = Instant::now();

        for kind in [FoodKind::SpeedBoost, FoodKind::Invert] {
            place_food_ahead(&mut engine, kind);
            let result = engine.on_tick(now, &mut hooks);
            assert_eq!(result.ate_food, Some(kind));
            assert_eq!(engine.state().snake.len(), 1);
        }
    }

    #[test]
    fn test_speed_boost_window() {
        let (mut engine, mut hooks) = engine_with(GameConfig::new(2000, 400));
        let start = Instant::now();

        place_food_ahead(&mut engine, FoodKind::SpeedBoost);
        engine.on_tick(start, &mut hooks);
        park_food(&mut engine);
        assert_eq!(engine.state().snake.head(), Position::new(6, 5));
        assert!(engine.state().is_boosted());
        assert_eq!(engine.next_deadline(), Some(start + Duration::from_secs(3)));

        engine.on_tick(start + Duration::from_secs(1), &mut hooks);
        assert_eq!(engine.state().snake.head(), Position::new(8, 5));

        engine.on_tick(start + Duration::from_millis(2999), &mut hooks);
        assert_eq!(engine.state().snake.head(), Position::new(10, 5));

        engine.on_tick(start + Duration::from_secs(3), &mut hooks);
        assert_eq!(engine.state().snake.head(), Position::new(11, 5));
        assert_eq!(engine.state().speed_multiplier, 1);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_second_boost_replaces_pending_reset() {
        let (mut engine, mut hooks) = engine_with(GameConfig::new(2000, 400));
        let start = Instant::now();

        place_food_ahead(&mut engine, FoodKind::SpeedBoost);
        engine.on_tick(start, &mut hooks);

        place_food_ahead(&mut engine, FoodKind::SpeedBoost);
        engine.on_tick(start + Duration::from_secs(2), &mut hooks);

        assert!(!engine.expire_modifiers(start + Duration::from_secs(3)));
        assert!(engine.state().is_boosted());

        assert!(engine.expire_modifiers(start + Duration::from_secs(5)));
        assert!(!engine.state().is_boosted());
    }

    #[test]
    fn test_boosted_jump_past_the_edge_ends_game() {
        let (mut engine, mut hooks) = engine_with(GameConfig::small());
        engine.state_mut().snake = Snake::new(Position::new(8, 2), Direction::Right, 1);
        engine.state_mut().speed_multiplier = 2;

        let result = engine.on_tick(Instant::now(), &mut hooks);

        assert_eq!(result.game_over.map(|r| r.cause), Some(CollisionType::Wall));
        assert_eq!(engine.state().speed_multiplier, 1);
    }

    #[test]
    fn test_inverted_controls() {
        let (mut engine, mut hooks) = engine();
        let start = Instant::now();

        place_food_ahead(&mut engine, FoodKind::Invert);
        engine.on_tick(start, &mut hooks);
        assert!(engine.state().inverted);

        assert!(engine.on_input(Action::Move(Direction::Up)));
        assert_eq!(engine.state().snake.direction, Direction::Down);

        assert!(engine.on_input(Action::Move(Direction::Right)));
        assert_eq!(engine.state().snake.direction, Direction::Left);

        // Left becomes Right, the exact reverse of the current direction
        assert!(!engine.on_input(Action::Move(Direction::Left)));
        assert_eq!(engine.state().snake.direction, Direction::Left);

        engine.expire_modifiers(start + Duration::from_secs(3));
        assert!(!engine.state().inverted);
        assert!(engine.on_input(Action::Move(Direction::Up)));
        assert_eq!(engine.state().snake.direction, Direction::Up);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let (mut engine, _) = engine();

        assert!(!engine.on_input(Action::Move(Direction::Left)));
        assert_eq!(engine.state().snake.direction, Direction::Right);

        assert!(engine.on_input(Action::Move(Direction::Down)));
        assert!(!engine.on_input(Action::Move(Direction::Up)));
        assert_eq!(engine.state().snake.direction, Direction::Down);

        // The rejected turn must not leak into the next tick
        engine.on_tick(Instant::now(), &mut NoHooks);
        assert_eq!(engine.state().snake.head(), Position::new(5, 6));
    }

    #[test]
    fn test_pause() {
        let (mut engine, mut hooks) = engine();
        let head = engine.state().snake.head();

        assert!(engine.on_input(Action::TogglePause));
        assert!(engine.state().paused);

        let result = engine.on_tick(Instant::now(), &mut hooks);
        assert!(!result.moved);
        assert_eq!(engine.state().snake.head(), head);

        assert!(!engine.on_input(Action::Move(Direction::Up)));
        assert_eq!(engine.state().snake.direction, Direction::Right);

        assert!(engine.on_input(Action::TogglePause));
        assert!(engine.on_tick(Instant::now(), &mut hooks).moved);
    }

    #[test]
    fn test_modifiers_expire_while_paused() {
        let (mut engine, mut hooks) = engine();
        let start = Instant::now();

        place_food_ahead(&mut engine, FoodKind::SpeedBoost);
        engine.on_tick(start, &mut hooks);
        engine.on_input(Action::TogglePause);

        engine.on_tick(start + Duration::from_secs(4), &mut hooks);
        assert_eq!(engine.state().speed_multiplier, 1);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let (mut engine, _) = engine();
        let start = Instant::now();

        engine
            .state_mut()
            .speed_timer
            .arm(start, Duration::from_secs(3));
        engine
            .state_mut()
            .invert_timer
            .arm(start, Duration::from_secs(1));

        assert_eq!(engine.next_deadline(), Some(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_wall_collision_resets_game() {
        let (mut engine, mut hooks) = engine_with(GameConfig::small());
        engine.state_mut().snake = Snake::new(Position::new(0, 5), Direction::Left, 3);
        engine.state_mut().inverted = true;
        engine.state_mut().score = 4;

        let result = engine.on_tick(Instant::now(), &mut hooks);

        let report = result.game_over.expect("wall hit should end the game");
        assert_eq!(report.cause, CollisionType::Wall);
        assert_eq!(report.length, 3);
        assert_eq!(report.score, 4);
        assert_eq!(hooks.stops, 1);
        assert_eq!(hooks.reports, vec![report]);
        assert_eq!(hooks.starts, 2);

        let state = engine.state();
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.snake.head(), Position::new(5, 5));
        assert_eq!(state.snake.direction, Direction::Right);
        assert!(!state.inverted);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_self_collision() {
        let (mut engine, mut hooks) = engine_with(GameConfig::small());

        // Body: (5,5) (4,5) (3,5) (2,5) (1,5)
        engine.state_mut().snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
        let now = Instant::now();

        engine.on_tick(now, &mut hooks);
        engine.on_input(Action::Move(Direction::Down));
        engine.on_tick(now, &mut hooks);
        engine.on_input(Action::Move(Direction::Left));
        engine.on_tick(now, &mut hooks);
        engine.on_input(Action::Move(Direction::Up));
        let result = engine.on_tick(now, &mut hooks);

        assert_eq!(
            result.game_over.map(|r| r.cause),
            Some(CollisionType::SelfCollision)
        );
        assert_eq!(engine.state().snake.len(), 1);
        assert_eq!(engine.state().snake.head(), Position::new(5, 5));
        assert_eq!(engine.state().snake.direction, Direction::Right);
    }

    #[test]
    fn test_food_may_spawn_under_snake() {
        let config = GameConfig {
            origin_x: 0,
            origin_y: 0,
            ..GameConfig::new(20, 20)
        };
        let mut engine = GameEngine::with_seed(config, 1).unwrap();
        engine.start_new_game(&mut NoHooks);

        assert_eq!(engine.state().food.position, engine.state().snake.head());
    }

    #[test]
    fn test_eaten_food_kind_is_redrawn() {
        let mut config = GameConfig::new(800, 600);
        config.food_weights = FoodWeights {
            growth: 0,
            speed_boost: 0,
            invert: 1,
        };
        let (mut engine, mut hooks) = engine_with(config);
        place_food_ahead(&mut engine, FoodKind::Growth);

        let result = engine.on_tick(Instant::now(), &mut hooks);

        assert_eq!(result.ate_food, Some(FoodKind::Growth));
        assert_eq!(engine.state().food.kind, FoodKind::Invert);
    }

    #[test]
    fn test_origin_clamped_to_small_board() {
        let (mut engine, mut hooks) = engine();
        engine.set_viewport(Viewport::new(60, 60));
        engine.start_new_game(&mut hooks);

        assert_eq!(engine.board(), Board::new(3, 3));
        assert_eq!(engine.state().snake.head(), Position::new(2, 2));
    }

    #[test]
    fn test_shrinking_board_moves_food_back_on_board() {
        let (mut engine, mut hooks) = engine();
        engine.state_mut().food = Food::new(Position::new(30, 20), FoodKind::Growth);

        engine.set_viewport(Viewport::new(200, 200));

        assert_eq!(engine.board(), Board::new(10, 10));
        assert!(engine.board().contains(engine.state().food.position));
        assert_eq!(engine.state().snake.head(), Position::new(5, 5));

        for _ in 0..3 {
            engine.on_tick(Instant::now(), &mut hooks);
            assert!(engine.board().contains(engine.state().food.position));
        }
    }

    #[test]
    fn test_growing_board_keeps_food() {
        let (mut engine, _) = engine();
        let food = engine.state().food;

        engine.set_viewport(Viewport::new(1000, 1000));

        assert_eq!(engine.board(), Board::new(50, 50));
        assert_eq!(engine.state().food, food);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(GameEngine::new(GameConfig::new(0, 0)).is_err());
    }
}
