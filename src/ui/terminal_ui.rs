use chrono::Local;
use log::error;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use super::clock_face;
use super::input_translator::HELP_TEXT;
use crate::destroyable::Destroyable;
use crate::events::{EventHandler, EventObserver, Unsubscriber};
use crate::game::settings::Settings;
use crate::model::{
    AnswerOutcome, GameEngineEvent, GamePhase, GameSummary, LeaderboardEntry, Question,
    ScoreSnapshot,
};

const BELL: &str = "\x07";
const TIMER_REPORT_INTERVAL: u64 = 15;
const TIMER_FINAL_SECONDS: u64 = 10;

/// Text view of the game. Owns no game state beyond what events tell it.
pub struct TerminalUi<W: Write> {
    out: W,
    sound_enabled: bool,
    timer_paused: bool,
    subscription: Option<Unsubscriber<GameEngineEvent>>,
}

impl<W: Write> Destroyable for TerminalUi<W> {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

impl<W: Write + 'static> TerminalUi<W> {
    pub fn new(
        out: W,
        settings: &Settings,
        game_engine_event_observer: EventObserver<GameEngineEvent>,
    ) -> Rc<RefCell<Self>> {
        let terminal_ui = Rc::new(RefCell::new(Self {
            out,
            sound_enabled: settings.sound_enabled,
            timer_paused: false,
            subscription: None,
        }));

        let subscription = {
            let terminal_ui = terminal_ui.clone();
            game_engine_event_observer.subscribe(move |event| {
                terminal_ui.borrow_mut().handle_event(event);
            })
        };
        terminal_ui.borrow_mut().subscription = Some(subscription);
        terminal_ui
    }
}

impl<W: Write> TerminalUi<W> {
    pub fn output(&self) -> &W {
        &self.out
    }

    fn write_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = lines
            .into_iter()
            .try_for_each(|line| writeln!(self.out, "{}", line.as_ref()))
            .and_then(|_| self.out.flush());
        if let Err(err) = result {
            error!(target: "terminal_ui", "Could not write to terminal: {}", err);
        }
    }

    fn bell(&mut self) {
        if self.sound_enabled {
            if let Err(err) = write!(self.out, "{}", BELL) {
                error!(target: "terminal_ui", "Could not write to terminal: {}", err);
            }
        }
    }

    pub fn show_help(&mut self) {
        self.write_lines(HELP_TEXT.lines());
    }

    pub fn show_message(&mut self, message: &str) {
        self.write_lines([message]);
    }

    fn show_phase(&mut self, phase: GamePhase) {
        match phase {
            GamePhase::Menu => self.write_lines(["Type `n` to start a new game."]),
            GamePhase::Playing => self.write_lines(["Go!"]),
            GamePhase::Countdown(_) => self.timer_paused = false,
            GamePhase::GameOver(_) => (),
        }
    }

    fn show_question(&mut self, question: &Question) {
        let mut lines = vec![String::new(), format!("Question {}", question.number)];
        lines.extend(clock_face::render(&question.time, question.shows_seconds()));
        lines.push("What time is it?".to_string());
        lines.extend(
            question
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| format!("  {}) {}", index + 1, option)),
        );
        self.write_lines(lines);
    }

    fn show_outcome(&mut self, outcome: &AnswerOutcome) {
        if outcome.is_correct {
            self.write_lines([format!("Correct! +{} points", outcome.points_awarded)]);
        } else {
            self.bell();
            let verb = if outcome.chosen.is_some() { "Not quite" } else { "Skipped" };
            self.write_lines([format!(
                "{}: it was {} ({}).",
                verb,
                outcome.question.correct_answer(),
                outcome.question.time.describe()
            )]);
        }
    }

    fn show_score(&mut self, score: &ScoreSnapshot) {
        let stars = format!(
            "{}{}",
            "*".repeat(score.stars as usize),
            "-".repeat(score.max_stars.saturating_sub(score.stars) as usize)
        );
        self.write_lines([format!(
            "{} | points {} | stars [{}] | streak {}",
            score.level, score.points, stars, score.streak
        )]);
    }

    fn show_timer(&mut self, remaining_secs: u64, paused: bool) {
        if paused != self.timer_paused {
            self.timer_paused = paused;
            let state = if paused { "Paused" } else { "Resumed" };
            self.write_lines([format!(
                "{} with {} left.",
                state,
                format_duration(Duration::from_secs(remaining_secs))
            )]);
            return;
        }
        if remaining_secs > 0
            && (remaining_secs % TIMER_REPORT_INTERVAL == 0 || remaining_secs <= TIMER_FINAL_SECONDS)
        {
            self.write_lines([format!(
                "{} left",
                format_duration(Duration::from_secs(remaining_secs))
            )]);
        }
    }

    fn show_game_over(&mut self, summary: &GameSummary) {
        self.bell();
        let entry = &summary.entry;
        let mut lines = vec![
            String::new(),
            format!("{}! Game over.", summary.reason.message()),
            format!(
                "Points: {}  Reached: {}  Correct: {}/{} ({}%)  Best streak: {}",
                entry.points,
                entry.level,
                entry.correct,
                entry.answered,
                entry.accuracy_percent(),
                entry.best_streak
            ),
        ];
        if summary.is_high_score {
            lines.push("New high score!".to_string());
        }
        if let Some(rank) = summary.rank {
            lines.push(format!("You placed #{} on the leaderboard.", rank));
        }
        lines.push("Type `n` for a new game or `q` to quit.".to_string());
        self.write_lines(lines);
    }

    fn show_leaderboard(&mut self, entries: &[LeaderboardEntry]) {
        if entries.is_empty() {
            self.write_lines(["The leaderboard is empty."]);
            return;
        }
        let mut lines = vec![format!(
            "{:<5}{:>7}  {:<9}{:>9}  {:>6}  {}",
            "Rank", "Points", "Level", "Correct", "Time", "Date"
        )];
        lines.extend(entries.iter().enumerate().map(|(index, entry)| {
            format!(
                "{:<5}{:>7}  {:<9}{:>9}  {:>6}  {}",
                index + 1,
                entry.points,
                entry.level.to_string(),
                format!("{}/{}", entry.correct, entry.answered),
                format_duration(entry.duration),
                entry
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
            )
        }));
        self.write_lines(lines);
    }

    fn show_settings(&mut self, settings: &Settings) {
        self.sound_enabled = settings.sound_enabled;
        self.write_lines([format!(
            "Settings: {} min, {} stars, sound {} (applies to the next game)",
            settings.time_limit_minutes,
            settings.star_count,
            if settings.sound_enabled { "on" } else { "off" }
        )]);
    }
}

impl<W: Write> EventHandler<GameEngineEvent> for TerminalUi<W> {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::PhaseChanged(phase) => self.show_phase(*phase),
            GameEngineEvent::CountdownTick(remaining) => {
                self.write_lines([format!("Starting in {}...", remaining)])
            }
            GameEngineEvent::QuestionPresented(question) => self.show_question(question),
            GameEngineEvent::AnswerChecked(outcome) => self.show_outcome(outcome),
            GameEngineEvent::ScoreChanged(score) => self.show_score(score),
            GameEngineEvent::LevelChanged(level) => {
                self.write_lines([format!("== {} ==", level)])
            }
            GameEngineEvent::TimerChanged {
                remaining_secs,
                paused,
            } => self.show_timer(*remaining_secs, *paused),
            GameEngineEvent::GameOver(summary) => self.show_game_over(summary),
            GameEngineEvent::SettingsChanged(settings) => self.show_settings(settings),
            GameEngineEvent::LeaderboardUpdated(entries) => self.show_leaderboard(entries),
            GameEngineEvent::StorageFailed(message) => {
                self.write_lines([format!("warning: {}", message)])
            }
        }
    }
}
