use std::time::{Duration, Instant};

use crate::game::GameOverReport;

/// In-session statistics; nothing here outlives the process
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub best_score: u32,
    pub best_length: usize,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            best_score: 0,
            best_length: 1,
            games_played: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, report: &GameOverReport) {
        self.games_played += 1;
        self.best_score = self.best_score.max(report.score);
        self.best_length = self.best_length.max(report.length);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::CollisionType;

    fn report(score: u32, length: usize) -> GameOverReport {
        GameOverReport {
            cause: CollisionType::Wall,
            length,
            score,
            steps: 0,
        }
    }

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_best_tracking() {
        let mut metrics = GameMetrics::new();

        metrics.on_game_over(&report(10, 4));
        assert_eq!(metrics.best_score, 10);
        assert_eq!(metrics.best_length, 4);
        assert_eq!(metrics.games_played, 1);

        metrics.on_game_over(&report(5, 6));
        assert_eq!(metrics.best_score, 10); // Should not decrease
        assert_eq!(metrics.best_length, 6);
        assert_eq!(metrics.games_played, 2);
    }

    #[test]
    fn test_game_start_resets_time() {
        let mut metrics = GameMetrics::new();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update();

        assert!(metrics.elapsed_time.as_millis() >= 50);

        metrics.on_game_start();
        metrics.update();
        assert!(metrics.elapsed_time.as_millis() < 50);
    }
}
