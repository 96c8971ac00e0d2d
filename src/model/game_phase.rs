use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    OutOfStars,
    OutOfTime,
    Quit,
}

impl GameOverReason {
    pub fn message(&self) -> &'static str {
        match self {
            GameOverReason::OutOfStars => "No stars left",
            GameOverReason::OutOfTime => "Time's up",
            GameOverReason::Quit => "Game ended",
        }
    }
}

/// menu -> countdown -> playing -> game over; a new game restarts the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    #[default]
    Menu,
    Countdown(u32),
    Playing,
    GameOver(GameOverReason),
}

impl GamePhase {
    pub fn is_playing(&self) -> bool {
        matches!(self, GamePhase::Playing)
    }

    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::GameOver(_))
    }
}
