use chrono::Utc;
use log::{debug, error, info, trace};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use uuid::Uuid;

use super::game_state::GameState;
use super::leaderboard::{Leaderboard, MAX_ENTRIES};
use super::settings::Settings;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    GameEngineCommand, GameEngineEvent, GameOverReason, GamePhase, GameSummary, LeaderboardEntry,
    SettingsChange,
};

/// Seconds of "get ready" before the first question.
pub const COUNTDOWN_START: u32 = 3;

/// Runs a session: reacts to commands, drives [`GameState`], and reports
/// everything the view needs as [`GameEngineEvent`]s.
pub struct GameEngine {
    state: GameState,
    settings: Settings,
    leaderboard: Leaderboard,
    data_dir: PathBuf,
    debug_mode: bool,
    current_playthrough_id: Uuid,
    subscription: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl GameEngine {
    pub fn new(
        game_engine_command_observer: EventObserver<GameEngineCommand>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        settings: Settings,
        leaderboard: Leaderboard,
        data_dir: PathBuf,
    ) -> Rc<RefCell<Self>> {
        let game_engine = Self {
            state: GameState::new(&settings, Settings::seed_from_env()),
            settings,
            leaderboard,
            data_dir,
            debug_mode: Settings::is_debug_mode(),
            current_playthrough_id: Uuid::new_v4(),
            subscription: None,
            game_engine_event_emitter,
        };
        let refcell = Rc::new(RefCell::new(game_engine));
        GameEngine::wire_subscription(refcell.clone(), game_engine_command_observer);
        refcell
    }

    fn wire_subscription(
        game_engine: Rc<RefCell<Self>>,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) {
        let game_engine_handler = game_engine.clone();
        let subscription = game_engine_command_observer.subscribe(move |command| {
            let mut game_engine = game_engine_handler.borrow_mut();
            game_engine.handle_command(command.clone());
        });
        game_engine.borrow_mut().subscription = Some(subscription);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    fn emit(&self, event: GameEngineEvent) {
        self.game_engine_event_emitter.emit(event);
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        match command {
            GameEngineCommand::NewGame { seed } => self.new_game(seed),
            GameEngineCommand::Tick => self.tick(),
            GameEngineCommand::Answer(index) => self.answer(Some(index)),
            GameEngineCommand::Skip => self.answer(None),
            GameEngineCommand::Pause => self.pause_game(),
            GameEngineCommand::Resume => self.resume_game(),
            GameEngineCommand::TogglePause => {
                if self.state.timer_state.is_paused() {
                    self.resume_game()
                } else {
                    self.pause_game()
                }
            }
            GameEngineCommand::Quit => self.quit(),
            GameEngineCommand::ChangeSettings(change) => self.change_settings(change),
            GameEngineCommand::ShowLeaderboard => self.emit(GameEngineEvent::LeaderboardUpdated(
                self.leaderboard.entries(MAX_ENTRIES),
            )),
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.state.phase = phase;
        self.emit(GameEngineEvent::PhaseChanged(phase));
    }

    fn new_game(&mut self, seed: Option<u64>) {
        self.state.reset(&self.settings, seed);
        self.current_playthrough_id = Uuid::new_v4();
        info!(
            target: "game_engine",
            "New game; playthrough: {}; seed: {}",
            self.current_playthrough_id,
            self.state.seed()
        );
        self.set_phase(GamePhase::Countdown(COUNTDOWN_START));
        self.emit(GameEngineEvent::CountdownTick(COUNTDOWN_START));
        self.emit(GameEngineEvent::LevelChanged(self.state.level));
        self.emit(GameEngineEvent::ScoreChanged(self.state.score()));
        self.sync_timer();
    }

    fn tick(&mut self) {
        match self.state.phase {
            GamePhase::Countdown(remaining) if remaining <= 1 => self.start_playing(),
            GamePhase::Countdown(remaining) => {
                self.state.phase = GamePhase::Countdown(remaining - 1);
                self.emit(GameEngineEvent::CountdownTick(remaining - 1));
            }
            GamePhase::Playing => {
                if self.state.timer_state.is_paused() {
                    return;
                }
                self.state.timer_state = self.state.timer_state.ticked();
                self.sync_timer();
                if self.state.timer_state.is_expired() {
                    self.end_game(GameOverReason::OutOfTime);
                }
            }
            GamePhase::Menu | GamePhase::GameOver(_) => (),
        }
    }

    fn start_playing(&mut self) {
        self.set_phase(GamePhase::Playing);
        self.present_question();
    }

    fn present_question(&mut self) {
        let question = self.state.next_question();
        if self.debug_mode {
            info!(
                target: "game_engine",
                "Question {} answer: {} ({})",
                question.number,
                question.correct_answer(),
                question.time.describe()
            );
        }
        self.emit(GameEngineEvent::QuestionPresented(question));
    }

    fn answer(&mut self, choice: Option<usize>) {
        if !self.state.phase.is_playing() || self.state.timer_state.is_paused() {
            debug!(target: "game_engine", "Ignoring answer {:?} in {:?}", choice, self.state.phase);
            return;
        }
        let Some(outcome) = self.state.answer(choice) else {
            debug!(target: "game_engine", "Ignoring invalid answer {:?}", choice);
            return;
        };
        let level_up = outcome.level_up;
        let out_of_stars = outcome.out_of_stars;

        self.emit(GameEngineEvent::AnswerChecked(outcome));
        self.emit(GameEngineEvent::ScoreChanged(self.state.score()));
        if let Some(level) = level_up {
            self.emit(GameEngineEvent::LevelChanged(level));
        }

        if out_of_stars {
            self.end_game(GameOverReason::OutOfStars);
        } else {
            self.present_question();
        }
    }

    fn pause_game(&mut self) {
        if self.state.phase.is_playing() && !self.state.timer_state.is_paused() {
            self.state.timer_state = self.state.timer_state.paused();
            self.sync_timer();
        }
    }

    fn resume_game(&mut self) {
        if self.state.phase.is_playing() && self.state.timer_state.is_paused() {
            self.state.timer_state = self.state.timer_state.resumed();
            self.sync_timer();
        }
    }

    fn quit(&mut self) {
        match self.state.phase {
            GamePhase::Playing | GamePhase::Countdown(_) => self.end_game(GameOverReason::Quit),
            _ => (),
        }
    }

    fn sync_timer(&self) {
        self.emit(GameEngineEvent::TimerChanged {
            remaining_secs: self.state.timer_state.remaining_secs(),
            paused: self.state.timer_state.is_paused(),
        });
    }

    fn end_game(&mut self, reason: GameOverReason) {
        self.state.timer_state = self.state.timer_state.paused();
        let entry = self.get_leaderboard_entry();
        let is_high_score = entry.points > self.leaderboard.high_score();

        let rank = if entry.points > 0 {
            match self.leaderboard.record(entry.clone()) {
                Ok(rank) => rank,
                Err(err) => {
                    error!(target: "game_engine", "Could not save leaderboard: {}", err);
                    self.emit(GameEngineEvent::StorageFailed(err.to_string()));
                    None
                }
            }
        } else {
            None
        };

        info!(
            target: "game_engine",
            "Game over ({:?}); points: {}; seed: {}",
            reason,
            entry.points,
            self.state.seed()
        );
        self.set_phase(GamePhase::GameOver(reason));
        self.emit(GameEngineEvent::GameOver(GameSummary {
            reason,
            entry,
            rank,
            is_high_score,
        }));
    }

    pub fn get_leaderboard_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            points: self.state.points,
            level: self.state.level,
            correct: self.state.total_correct,
            answered: self.state.total_answered,
            best_streak: self.state.best_streak,
            duration: self.state.timer_state.elapsed(),
            timestamp: Utc::now(),
            playthrough_id: self.current_playthrough_id,
        }
    }

    /// Applied settings take effect on the next new game.
    fn change_settings(&mut self, change: SettingsChange) {
        self.settings.apply(&change);
        if let Err(err) = self.settings.save_to(&self.data_dir) {
            error!(target: "game_engine", "Could not save settings: {}", err);
            self.emit(GameEngineEvent::StorageFailed(err.to_string()));
        }
        self.emit(GameEngineEvent::SettingsChanged(self.settings.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::model::Level;
    use crate::tests::UsingLogger;
    use std::time::Duration;
    use tempfile::TempDir;
    use test_context::test_context;

    struct Harness {
        commands: EventEmitter<GameEngineCommand>,
        engine: Rc<RefCell<GameEngine>>,
        events: Rc<RefCell<Vec<GameEngineEvent>>>,
        _dir: TempDir,
    }

    impl Harness {
        fn new(settings: Settings) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let data_dir = dir.path().to_path_buf();
            Self::with_data_dir(settings, data_dir, dir)
        }

        fn with_data_dir(settings: Settings, data_dir: PathBuf, dir: TempDir) -> Self {
            let (commands, command_observer) = Channel::<GameEngineCommand>::new();
            let (event_emitter, event_observer) = Channel::<GameEngineEvent>::new();
            let events = Rc::new(RefCell::new(Vec::new()));
            let events_clone = events.clone();
            event_observer.subscribe(move |event: &GameEngineEvent| {
                events_clone.borrow_mut().push(event.clone());
            });
            let engine = GameEngine::new(
                command_observer,
                event_emitter,
                settings,
                Leaderboard::load_from(&data_dir),
                data_dir,
            );
            Self {
                commands,
                engine,
                events,
                _dir: dir,
            }
        }

        fn send(&self, command: GameEngineCommand) {
            self.commands.emit(command);
        }

        fn start(&self) {
            self.send(GameEngineCommand::NewGame { seed: Some(17) });
            for _ in 0..COUNTDOWN_START {
                self.send(GameEngineCommand::Tick);
            }
        }

        fn correct_index(&self) -> usize {
            self.engine
                .borrow()
                .state()
                .current_question()
                .map(|q| q.correct_index)
                .unwrap()
        }

        fn take_events(&self) -> Vec<GameEngineEvent> {
            self.events.borrow_mut().drain(..).collect()
        }

        fn game_over(&self) -> Option<GameSummary> {
            self.events.borrow().iter().find_map(|e| match e {
                GameEngineEvent::GameOver(summary) => Some(summary.clone()),
                _ => None,
            })
        }
    }

    fn settings(minutes: u32, stars: u32) -> Settings {
        let mut settings = Settings::default();
        settings.time_limit_minutes = minutes;
        settings.star_count = stars;
        settings
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_countdown_then_first_question(_: &mut UsingLogger) {
        let harness = Harness::new(settings(1, 3));
        harness.send(GameEngineCommand::NewGame { seed: Some(1) });
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Countdown(3));

        harness.send(GameEngineCommand::Tick);
        harness.send(GameEngineCommand::Tick);
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Countdown(1));
        harness.send(GameEngineCommand::Tick);
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Playing);

        let events = harness.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEngineEvent::QuestionPresented(q) if q.number == 1)));
        let countdown: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                GameEngineEvent::CountdownTick(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(countdown, vec![3, 2, 1]);
    }

    #[test]
    fn test_time_runs_out_after_limit_ticks() {
        let harness = Harness::new(settings(1, 3));
        harness.start();
        for _ in 0..59 {
            harness.send(GameEngineCommand::Tick);
        }
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Playing);
        harness.send(GameEngineCommand::Tick);
        assert_eq!(
            harness.engine.borrow().phase(),
            GamePhase::GameOver(GameOverReason::OutOfTime)
        );
        let summary = harness.game_over().unwrap();
        assert_eq!(summary.entry.duration, Duration::from_secs(60));
    }

    #[test]
    fn test_pause_stops_the_clock_and_blocks_answers() {
        let harness = Harness::new(settings(1, 3));
        harness.start();
        harness.send(GameEngineCommand::Tick);
        harness.send(GameEngineCommand::TogglePause);
        for _ in 0..100 {
            harness.send(GameEngineCommand::Tick);
        }
        let index = harness.correct_index();
        harness.send(GameEngineCommand::Answer(index));
        {
            let engine = harness.engine.borrow();
            assert_eq!(engine.state().timer_state.remaining_secs(), 59);
            assert_eq!(engine.state().points, 0);
        }

        harness.send(GameEngineCommand::Resume);
        harness.send(GameEngineCommand::Answer(index));
        assert_eq!(harness.engine.borrow().state().points, 10);
    }

    #[test]
    fn test_losing_all_stars_ends_game() {
        let harness = Harness::new(settings(2, 2));
        harness.start();
        harness.send(GameEngineCommand::Skip);
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Playing);
        harness.send(GameEngineCommand::Skip);
        assert_eq!(
            harness.engine.borrow().phase(),
            GamePhase::GameOver(GameOverReason::OutOfStars)
        );
        let summary = harness.game_over().unwrap();
        assert_eq!(summary.rank, None);
        assert_eq!(summary.entry.answered, 2);
    }

    #[test]
    fn test_score_only_grows_and_level_advances() {
        let harness = Harness::new(settings(5, 5));
        harness.start();
        let mut last_points = 0;
        for round in 0..12 {
            if round == 6 {
                harness.send(GameEngineCommand::Skip);
            } else {
                let index = harness.correct_index();
                harness.send(GameEngineCommand::Answer(index));
            }
            let points = harness.engine.borrow().state().points;
            assert!(points >= last_points);
            last_points = points;
        }
        let events = harness.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEngineEvent::LevelChanged(level) if *level == Level::new(2))));
    }

    #[test]
    fn test_game_over_records_leaderboard() {
        let harness = Harness::new(settings(2, 3));
        harness.start();
        let index = harness.correct_index();
        harness.send(GameEngineCommand::Answer(index));
        harness.send(GameEngineCommand::Quit);

        let summary = harness.game_over().unwrap();
        assert_eq!(summary.reason, GameOverReason::Quit);
        assert_eq!(summary.rank, Some(1));
        assert!(summary.is_high_score);
        assert_eq!(harness.engine.borrow().leaderboard().high_score(), 10);

        harness.take_events();
        harness.send(GameEngineCommand::ShowLeaderboard);
        let events = harness.take_events();
        assert!(matches!(
            events.as_slice(),
            [GameEngineEvent::LeaderboardUpdated(entries)] if entries.len() == 1
        ));
    }

    #[test]
    fn test_answers_ignored_outside_play() {
        let harness = Harness::new(settings(2, 3));
        harness.send(GameEngineCommand::Answer(0));
        harness.send(GameEngineCommand::Tick);
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Menu);
        assert!(harness.take_events().is_empty());
    }

    #[test]
    fn test_change_settings_persists_and_applies_next_game() {
        let harness = Harness::new(settings(2, 3));
        harness.send(GameEngineCommand::ChangeSettings(SettingsChange {
            star_count: Some(5),
            ..Default::default()
        }));
        let saved = Settings::load_from(&harness.engine.borrow().data_dir);
        assert_eq!(saved.star_count, 5);

        harness.start();
        assert_eq!(harness.engine.borrow().state().stars, 5);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_storage_failures_are_reported_and_play_continues(_: &mut UsingLogger) {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the data directory should be
        let data_dir = dir.path().join("not-a-directory");
        std::fs::write(&data_dir, "").unwrap();
        let harness = Harness::with_data_dir(settings(2, 3), data_dir, dir);

        harness.send(GameEngineCommand::ChangeSettings(SettingsChange {
            star_count: Some(4),
            ..Default::default()
        }));
        let events = harness.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEngineEvent::StorageFailed(_))));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEngineEvent::SettingsChanged(s) if s.star_count == 4)));

        harness.start();
        assert_eq!(harness.engine.borrow().state().stars, 4);
        let index = harness.correct_index();
        harness.send(GameEngineCommand::Answer(index));
        harness.send(GameEngineCommand::Quit);

        let summary = harness.game_over().unwrap();
        assert_eq!(summary.entry.points, 10);
        assert_eq!(summary.rank, None);
        let events = harness.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEngineEvent::StorageFailed(_))));
        assert_eq!(harness.engine.borrow().leaderboard().high_score(), 0);

        harness.start();
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Playing);
        assert!(harness.engine.borrow().state().current_question().is_some());
    }

    #[test]
    fn test_destroy_unsubscribes() {
        let harness = Harness::new(settings(2, 3));
        harness.engine.borrow_mut().destroy();
        harness.send(GameEngineCommand::NewGame { seed: None });
        assert_eq!(harness.engine.borrow().phase(), GamePhase::Menu);
    }
}
