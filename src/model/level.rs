use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TimeFormat;

const HOURS_ON_FACE: usize = 12;

#[derive(Debug, Clone, Copy)]
pub struct WeightedFormat {
    pub format: TimeFormat,
    pub weight: u32,
}

const fn weighted(format: TimeFormat, weight: u32) -> WeightedFormat {
    WeightedFormat { format, weight }
}

const LEVEL_1_FORMATS: &[WeightedFormat] = &[weighted(TimeFormat::OClock, 1)];
const LEVEL_2_FORMATS: &[WeightedFormat] = &[
    weighted(TimeFormat::OClock, 1),
    weighted(TimeFormat::HalfPast, 2),
];
const LEVEL_3_FORMATS: &[WeightedFormat] = &[
    weighted(TimeFormat::OClock, 1),
    weighted(TimeFormat::HalfPast, 1),
    weighted(TimeFormat::QuarterHour, 3),
];
const LEVEL_4_FORMATS: &[WeightedFormat] = &[
    weighted(TimeFormat::HalfPast, 1),
    weighted(TimeFormat::QuarterHour, 2),
    weighted(TimeFormat::FiveMinute, 4),
];
const LEVEL_5_FORMATS: &[WeightedFormat] = &[
    weighted(TimeFormat::QuarterHour, 1),
    weighted(TimeFormat::FiveMinute, 3),
    weighted(TimeFormat::FullMinute, 4),
];
const LEVEL_6_FORMATS: &[WeightedFormat] = &[
    weighted(TimeFormat::FiveMinute, 1),
    weighted(TimeFormat::FullMinute, 4),
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("level {0} is outside {min}-{max}", min = Level::MIN.0, max = Level::MAX.0)]
pub struct InvalidLevel(pub u8);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8")]
pub struct Level(u8);

impl TryFrom<u8> for Level {
    type Error = InvalidLevel;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&number) {
            Ok(Level(number))
        } else {
            Err(InvalidLevel(number))
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::MIN
    }
}

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(6);

    pub fn new(number: u8) -> Level {
        Level(number.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn all() -> Vec<Level> {
        (Self::MIN.0..=Self::MAX.0).map(Level).collect()
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        *self == Self::MAX
    }

    pub fn next(&self) -> Level {
        Level::new(self.0 + 1)
    }

    pub fn formats(&self) -> &'static [WeightedFormat] {
        match self.0 {
            1 => LEVEL_1_FORMATS,
            2 => LEVEL_2_FORMATS,
            3 => LEVEL_3_FORMATS,
            4 => LEVEL_4_FORMATS,
            5 => LEVEL_5_FORMATS,
            _ => LEVEL_6_FORMATS,
        }
    }

    pub fn shows_seconds(&self) -> bool {
        self.0 >= 6
    }

    pub fn shows_meridiem(&self) -> bool {
        self.0 >= 5
    }

    /// Correct answers needed to leave this level; `None` at the top level.
    pub fn answers_to_advance(&self) -> Option<u32> {
        match self.0 {
            1 | 2 => Some(5),
            3 | 4 => Some(6),
            5 => Some(8),
            _ => None,
        }
    }

    pub fn points_per_answer(&self) -> u64 {
        10 * self.0 as u64
    }

    /// Meridiems a generated time may carry. Levels that hide AM/PM only
    /// produce AM so that every key looks different on the face.
    pub fn meridiems(&self) -> &'static [bool] {
        if self.shows_meridiem() {
            &[true, false]
        } else {
            &[true]
        }
    }

    /// Number of distinct time keys this level can produce.
    pub fn pool_size(&self) -> usize {
        let minutes: usize = self.formats().iter().map(|w| w.format.minute_count()).sum();
        let seconds = if self.shows_seconds() { 60 } else { 1 };
        minutes * HOURS_ON_FACE * self.meridiems().len() * seconds
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level {}", self.0)
    }
}
