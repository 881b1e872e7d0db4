use super::state::CollisionType;

/// Summary of a finished game, handed to the notifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub cause: CollisionType,
    /// Snake length at the moment of the crash
    pub length: usize,
    /// Food eaten during the game
    pub score: u32,
    pub steps: u32,
}

/// Callbacks the engine makes into the presentation layer.
///
/// Every method defaults to a no-op.
pub trait GameHooks {
    /// Start (or restart) delivering ticks
    fn start_ticks(&mut self) {}

    /// Stop delivering ticks
    fn stop_ticks(&mut self) {}

    /// Show the game-over message. The engine resets the game right after
    /// this returns.
    fn game_over(&mut self, _report: &GameOverReport) {}
}

/// Hooks for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl GameHooks for NoHooks {}
