use std::time::Duration;

use log::warn;
use serde_with::serde_as;
use serde_with::DurationSeconds;

pub const FALLBACK_LIMIT: Duration = Duration::from_secs(60);
const TICK: Duration = Duration::from_secs(1);

/// Session countdown, advanced one second per tick.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimerState {
    #[serde_as(as = "DurationSeconds<u64>")]
    pub limit: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub remaining: Duration,
    pub paused: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(FALLBACK_LIMIT)
    }
}

impl TimerState {
    /// A limit below one second is replaced by [`FALLBACK_LIMIT`].
    pub fn new(limit: Duration) -> Self {
        let limit = if limit < TICK {
            warn!(target: "timer", "Invalid time limit {:?}; using {:?}", limit, FALLBACK_LIMIT);
            FALLBACK_LIMIT
        } else {
            limit
        };
        Self {
            limit,
            remaining: limit,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining.as_secs()
    }

    pub fn elapsed(&self) -> Duration {
        self.limit.saturating_sub(self.remaining)
    }

    pub fn paused(&self) -> TimerState {
        let mut new_state = self.clone();
        new_state.paused = true;
        new_state
    }

    pub fn resumed(&self) -> TimerState {
        let mut new_state = self.clone();
        new_state.paused = false;
        new_state
    }

    /// One second passes. Paused or expired timers do not move.
    pub fn ticked(&self) -> TimerState {
        let mut new_state = self.clone();
        if !self.paused {
            new_state.remaining = self.remaining.saturating_sub(TICK);
        }
        new_state
    }
}
