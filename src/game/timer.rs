use std::time::{Duration, Instant};

/// One-shot timer that can be re-armed.
///
/// Arming replaces any pending deadline, so only the latest arming can ever
/// fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierTimer {
    deadline: Option<Instant>,
}

impl ModifierTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the timer fires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns true once when the deadline has been reached, disarming the timer
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
