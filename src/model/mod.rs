mod game_engine_command;
mod game_engine_event;
mod game_phase;
mod game_stats;
mod level;
mod question;
mod time_value;
mod timer_state;

pub use game_engine_command::{GameEngineCommand, SettingsChange};
pub use game_engine_event::GameEngineEvent;
pub use game_phase::{GameOverReason, GamePhase};
pub use game_stats::{GameSummary, LeaderboardEntry, ScoreSnapshot};
pub use level::{InvalidLevel, Level, WeightedFormat};
pub use question::{AnswerOutcome, Question};
pub use time_value::{HandAngles, TimeFormat, TimeKey, TimeValue};
pub use timer_state::{TimerState, FALLBACK_LIMIT};
