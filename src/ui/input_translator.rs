use crate::model::{GameEngineCommand, SettingsChange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Command(GameEngineCommand),
    Help,
    Invalid(String),
    Nothing,
}

pub const HELP_TEXT: &str = "\
Commands:
  1-4        pick an answer
  s          skip the question (costs a star)
  p          pause / resume
  n          new game
  l          show the leaderboard
  t <min>    set the time limit in minutes (next game)
  k <stars>  set the number of stars (next game)
  m          toggle sound
  h          show this help
  q          quit";

/// Turns one line of terminal input into an action.
pub fn translate(line: &str) -> InputAction {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return InputAction::Nothing;
    };
    let argument = words.next();

    let command = match word.to_lowercase().as_str() {
        "1" | "2" | "3" | "4" => {
            // parsed digits are 1-4
            let index = word.parse::<usize>().unwrap_or(1) - 1;
            GameEngineCommand::Answer(index)
        }
        "s" | "skip" => GameEngineCommand::Skip,
        "p" | "pause" => GameEngineCommand::TogglePause,
        "n" | "new" => GameEngineCommand::NewGame { seed: None },
        "l" | "leaderboard" => GameEngineCommand::ShowLeaderboard,
        "m" | "mute" => GameEngineCommand::ChangeSettings(SettingsChange {
            toggle_sound: true,
            ..Default::default()
        }),
        "t" | "time" => match argument.and_then(|a| a.parse::<u32>().ok()) {
            Some(minutes) => GameEngineCommand::ChangeSettings(SettingsChange {
                time_limit_minutes: Some(minutes),
                ..Default::default()
            }),
            None => return InputAction::Invalid("usage: t <minutes>".to_string()),
        },
        "k" | "stars" => match argument.and_then(|a| a.parse::<u32>().ok()) {
            Some(stars) => GameEngineCommand::ChangeSettings(SettingsChange {
                star_count: Some(stars),
                ..Default::default()
            }),
            None => return InputAction::Invalid("usage: k <stars>".to_string()),
        },
        "h" | "help" | "?" => return InputAction::Help,
        "q" | "quit" | "exit" => GameEngineCommand::Quit,
        other => return InputAction::Invalid(format!("unknown command `{}`", other)),
    };
    InputAction::Command(command)
}
