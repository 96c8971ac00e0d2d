use super::{AnswerOutcome, GamePhase, GameSummary, LeaderboardEntry, Level, Question, ScoreSnapshot};
use crate::game::settings::Settings;

#[derive(Debug, Clone)]
pub enum GameEngineEvent {
    PhaseChanged(GamePhase),
    CountdownTick(u32),
    QuestionPresented(Question),
    AnswerChecked(AnswerOutcome),
    ScoreChanged(ScoreSnapshot),
    LevelChanged(Level),
    TimerChanged { remaining_secs: u64, paused: bool },
    GameOver(GameSummary),
    SettingsChanged(Settings),
    LeaderboardUpdated(Vec<LeaderboardEntry>),
    StorageFailed(String),
}
