#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub time_limit_minutes: Option<u32>,
    pub star_count: Option<u32>,
    pub sound_enabled: Option<bool>,
    pub toggle_sound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEngineCommand {
    NewGame { seed: Option<u64> },
    Tick,
    Answer(usize), // option index
    Skip,
    Pause,
    Resume,
    TogglePause,
    Quit,
    ChangeSettings(SettingsChange),
    ShowLeaderboard,
}
