use log::{debug, info};

use super::option_generator::{correct_index, generate_options};
use super::randomness::RandomnessManager;
use super::settings::Settings;
use crate::model::{AnswerOutcome, GamePhase, Level, Question, ScoreSnapshot, TimerState};

const STREAK_BONUS_STEP: u64 = 2;
const STREAK_BONUS_MAX: u64 = 10;

/// Score, lives and progress for one session.
#[derive(Debug)]
pub struct GameState {
    pub phase: GamePhase,
    pub level: Level,
    pub stars: u32,
    pub max_stars: u32,
    pub points: u64,
    pub correct_in_level: u32,
    pub total_correct: u32,
    pub total_answered: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub timer_state: TimerState,
    current_question: Option<Question>,
    question_count: u32,
    randomness: RandomnessManager,
}

impl GameState {
    pub fn new(settings: &Settings, seed: Option<u64>) -> Self {
        Self {
            phase: GamePhase::Menu,
            level: Level::MIN,
            stars: settings.star_count,
            max_stars: settings.star_count,
            points: 0,
            correct_in_level: 0,
            total_correct: 0,
            total_answered: 0,
            streak: 0,
            best_streak: 0,
            timer_state: TimerState::new(settings.time_limit()),
            current_question: None,
            question_count: 0,
            randomness: RandomnessManager::new(seed),
        }
    }

    /// Starts a fresh session. A seed reseeds the generator; otherwise the
    /// existing generator continues with its session tracking cleared.
    pub fn reset(&mut self, settings: &Settings, seed: Option<u64>) {
        match seed {
            Some(_) => self.randomness = RandomnessManager::new(seed),
            None => self.randomness.reset_session(),
        }
        self.phase = GamePhase::Menu;
        self.level = Level::MIN;
        self.stars = settings.star_count;
        self.max_stars = settings.star_count;
        self.points = 0;
        self.correct_in_level = 0;
        self.total_correct = 0;
        self.total_answered = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.timer_state = TimerState::new(settings.time_limit());
        self.current_question = None;
        self.question_count = 0;
        info!(target: "game_state", "New session; seed: {}", self.randomness.seed());
    }

    pub fn seed(&self) -> u64 {
        self.randomness.seed()
    }

    pub fn randomness(&self) -> &RandomnessManager {
        &self.randomness
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn next_question(&mut self) -> Question {
        let level = self.level;
        let time = self.randomness.next_time(level);
        let options = generate_options(&time, level, &mut self.randomness);
        let correct_index = correct_index(&options, &time, level).unwrap_or(0);
        self.question_count += 1;
        let question = Question {
            number: self.question_count,
            time,
            level,
            options,
            correct_index,
        };
        debug!(target: "game_state", "Question {}: {:?}", question.number, question.time);
        self.current_question = Some(question.clone());
        question
    }

    /// Scores `choice` against the current question; `None` skips it.
    /// Returns `None` when there is no open question or the index is out of range.
    pub fn answer(&mut self, choice: Option<usize>) -> Option<AnswerOutcome> {
        let question = self.current_question.as_ref()?;
        if choice.is_some_and(|index| index >= question.options.len()) {
            return None;
        }
        let question = self.current_question.take()?;
        let is_correct = choice == Some(question.correct_index);
        self.total_answered += 1;

        let (points_awarded, level_up, out_of_stars) = if is_correct {
            let (points, level_up) = self.apply_correct();
            (points, level_up, false)
        } else {
            (0, None, self.apply_wrong())
        };

        Some(AnswerOutcome {
            question,
            chosen: choice,
            is_correct,
            points_awarded,
            level_up,
            out_of_stars,
        })
    }

    fn streak_bonus(&self) -> u64 {
        (self.streak as u64 * STREAK_BONUS_STEP).min(STREAK_BONUS_MAX)
    }

    fn apply_correct(&mut self) -> (u64, Option<Level>) {
        let points = self.level.points_per_answer() + self.streak_bonus();
        self.points += points;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.total_correct += 1;
        self.correct_in_level += 1;

        let level_up = match self.level.answers_to_advance() {
            Some(needed) if self.correct_in_level >= needed => {
                self.level = self.level.next();
                self.correct_in_level = 0;
                info!(target: "game_state", "Advanced to {}", self.level);
                Some(self.level)
            }
            _ => None,
        };
        (points, level_up)
    }

    /// Returns whether the last star is gone.
    fn apply_wrong(&mut self) -> bool {
        self.streak = 0;
        self.stars = self.stars.saturating_sub(1);
        self.stars == 0
    }

    pub fn score(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            points: self.points,
            stars: self.stars,
            max_stars: self.max_stars,
            streak: self.streak,
            level: self.level,
        }
    }
}
