use serde::Serialize;

use super::{Level, TimeValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub number: u32,
    pub time: TimeValue,
    pub level: Level,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn shows_seconds(&self) -> bool {
        self.level.shows_seconds()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question: Question,
    /// `None` when the question was skipped
    pub chosen: Option<usize>,
    pub is_correct: bool,
    pub points_awarded: u64,
    pub level_up: Option<Level>,
    pub out_of_stars: bool,
}
