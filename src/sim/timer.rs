//! Deadline timers
//!
//! Elapsed-time accumulator compared against a threshold. Advanced once per
//! tick; fires exactly once when the deadline is crossed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeadlineTimer {
    elapsed: f32,
    duration: f32,
    armed: bool,
}

impl DeadlineTimer {
    /// Armed timer that fires after `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
            armed: true,
        }
    }

    /// Timer that never fires until restarted
    pub fn disarmed() -> Self {
        Self {
            elapsed: 0.0,
            duration: 0.0,
            armed: false,
        }
    }

    /// Advance by `dt`. Returns true on the tick the deadline is reached.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.armed {
            return false;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.armed = false;
            true
        } else {
            false
        }
    }

    /// Re-arm with the same duration, discarding accumulated time
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.armed = true;
    }

    /// Re-arm with a new duration
    pub fn restart_with(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.restart();
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds left before firing (0 when disarmed)
    pub fn remaining(&self) -> f32 {
        if self.armed {
            (self.duration - self.elapsed).max(0.0)
        } else {
            0.0
        }
    }
}
