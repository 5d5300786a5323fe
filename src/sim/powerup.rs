//! Timed power-up window
//!
//! Non-stacking: picking up another power-up while one is running only
//! restarts the countdown.

use serde::{Deserialize, Serialize};

use crate::consts::POWER_UP_DURATION_FRAMES;

/// What changed when the timer was poked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpTransition {
    /// Window opened
    Activated,
    /// Window was already open, countdown restarted
    Refreshed,
    /// Window closed
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpTimer {
    duration: u32,
    remaining: u32,
}

impl Default for PowerUpTimer {
    fn default() -> Self {
        Self::new(POWER_UP_DURATION_FRAMES)
    }
}

impl PowerUpTimer {
    pub fn new(duration: u32) -> Self {
        Self {
            duration: duration.max(1),
            remaining: 0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Start (or restart) the window
    pub fn trigger(&mut self) -> PowerUpTransition {
        let was_active = self.is_active();
        self.remaining = self.duration;
        if was_active {
            PowerUpTransition::Refreshed
        } else {
            PowerUpTransition::Activated
        }
    }

    /// Count down one frame
    pub fn tick(&mut self) -> Option<PowerUpTransition> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        (self.remaining == 0).then_some(PowerUpTransition::Expired)
    }
}
