use log::{debug, info, warn};
use std::io::{self, BufRead, Write};
use std::path::Path;
use flume::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use super::input_translator::{translate, InputAction};
use super::terminal_ui::TerminalUi;
use crate::destroyable::Destroyable;
use crate::events::Channel;
use crate::game::game_engine::GameEngine;
use crate::game::leaderboard::Leaderboard;
use crate::game::settings::Settings;
use crate::game::storage;
use crate::model::{GameEngineCommand, GameEngineEvent};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Runs the game on stdin/stdout until the player quits or input closes.
pub fn run() {
    let data_dir = storage::data_dir_or_fallback();
    info!(target: "app", "Using data directory {}", data_dir.display());
    run_with(
        io::BufReader::new(io::stdin()),
        io::stdout(),
        &data_dir,
        TICK_INTERVAL,
    );
}

fn spawn_reader<R: BufRead + Send + 'static>(input: R) -> Receiver<String> {
    let (sender, receiver) = flume::unbounded();
    thread::spawn(move || {
        for line in input.lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(target: "app", "Could not read input: {}", err);
                    break;
                }
            }
        }
        debug!(target: "app", "Input closed");
    });
    receiver
}

pub fn run_with<R, W>(input: R, output: W, data_dir: &Path, tick_interval: Duration)
where
    R: BufRead + Send + 'static,
    W: Write + 'static,
{
    let (game_engine_command_emitter, game_engine_command_observer) =
        Channel::<GameEngineCommand>::new();
    let (game_engine_event_emitter, game_engine_event_observer) =
        Channel::<GameEngineEvent>::new();

    let settings = Settings::load_from(data_dir);
    let leaderboard = Leaderboard::load_from(data_dir);
    let terminal_ui = TerminalUi::new(output, &settings, game_engine_event_observer);
    let game_engine = GameEngine::new(
        game_engine_command_observer,
        game_engine_event_emitter,
        settings,
        leaderboard,
        data_dir.to_path_buf(),
    );

    terminal_ui.borrow_mut().show_help();
    game_engine_command_emitter.emit(GameEngineCommand::NewGame {
        seed: Settings::seed_from_env(),
    });

    let lines = spawn_reader(input);
    let mut next_tick = Instant::now() + tick_interval;
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match lines.recv_timeout(timeout) {
            Ok(line) => match translate(&line) {
                InputAction::Command(GameEngineCommand::Quit) => {
                    game_engine_command_emitter.emit(GameEngineCommand::Quit);
                    break;
                }
                InputAction::Command(command) => game_engine_command_emitter.emit(command),
                InputAction::Help => terminal_ui.borrow_mut().show_help(),
                InputAction::Invalid(message) => {
                    terminal_ui.borrow_mut().show_message(&message)
                }
                InputAction::Nothing => (),
            },
            Err(RecvTimeoutError::Timeout) => {
                game_engine_command_emitter.emit(GameEngineCommand::Tick);
                next_tick += tick_interval;
            }
            Err(RecvTimeoutError::Disconnected) => {
                game_engine_command_emitter.emit(GameEngineCommand::Quit);
                break;
            }
        }
    }

    terminal_ui.borrow_mut().show_message("Goodbye!");
    game_engine.borrow_mut().destroy();
    terminal_ui.borrow_mut().destroy();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedOutput(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedOutput {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    #[test]
    fn test_session_starts_and_quits() {
        let dir = tempfile::tempdir().unwrap();
        let output = SharedOutput::default();
        run_with(
            Cursor::new("h\nbogus\nq\n"),
            output.clone(),
            dir.path(),
            Duration::from_secs(60),
        );
        let text = output.text();
        assert!(text.contains("Starting in 3..."));
        assert!(text.contains("unknown command `bogus`"));
        assert!(text.contains("Game ended! Game over."));
        assert!(text.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_closed_input_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let output = SharedOutput::default();
        run_with(
            Cursor::new(""),
            output.clone(),
            dir.path(),
            Duration::from_secs(60),
        );
        assert!(output.text().contains("Goodbye!"));
    }

    #[test]
    fn test_ticks_drive_the_countdown() {
        let dir = tempfile::tempdir().unwrap();
        let output = SharedOutput::default();
        // input stays open long enough for several ticks
        let input = DelayedQuit {
            delay: Duration::from_millis(250),
            done: false,
        };
        run_with(
            io::BufReader::new(input),
            output.clone(),
            dir.path(),
            Duration::from_millis(20),
        );
        let text = output.text();
        assert!(text.contains("Starting in 2..."));
        assert!(text.contains("Question 1"));
    }

    struct DelayedQuit {
        delay: Duration,
        done: bool,
    }

    impl io::Read for DelayedQuit {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.done {
                return Ok(0);
            }
            thread::sleep(self.delay);
            self.done = true;
            let line = b"q\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }
}
