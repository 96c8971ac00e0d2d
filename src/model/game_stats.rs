use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DurationSeconds;
use std::time::Duration;
use uuid::Uuid;

use super::{GameOverReason, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub points: u64,
    pub stars: u32,
    pub max_stars: u32,
    pub streak: u32,
    pub level: Level,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct LeaderboardEntry {
    pub points: u64,
    pub level: Level,
    pub correct: u32,
    pub answered: u32,
    pub best_streak: u32,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
    pub playthrough_id: Uuid,
}

impl LeaderboardEntry {
    /// Share of answered questions that were correct, 0-100.
    pub fn accuracy_percent(&self) -> u32 {
        if self.answered == 0 {
            return 0;
        }
        self.correct * 100 / self.answered
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub reason: GameOverReason,
    pub entry: LeaderboardEntry,
    /// 1-based position on the leaderboard, if the game made it
    pub rank: Option<usize>,
    pub is_high_score: bool,
}
