use serde::{Deserialize, Serialize};

pub const MINUTES_PER_HALF_DAY: i32 = 12 * 60;

/// Granularity class of a clock reading. Every minute of the hour belongs to
/// exactly one format, so the format of a time is a function of its minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeFormat {
    OClock,
    HalfPast,
    QuarterHour,
    FiveMinute,
    FullMinute,
}

impl TimeFormat {
    pub fn all() -> [TimeFormat; 5] {
        [
            TimeFormat::OClock,
            TimeFormat::HalfPast,
            TimeFormat::QuarterHour,
            TimeFormat::FiveMinute,
            TimeFormat::FullMinute,
        ]
    }

    pub fn of_minute(minute: u8) -> TimeFormat {
        match minute {
            0 => TimeFormat::OClock,
            30 => TimeFormat::HalfPast,
            15 | 45 => TimeFormat::QuarterHour,
            m if m % 5 == 0 => TimeFormat::FiveMinute,
            _ => TimeFormat::FullMinute,
        }
    }

    /// Minute values (0-59) that display in this format.
    pub fn minutes(&self) -> Vec<u8> {
        (0..60u8)
            .filter(|m| TimeFormat::of_minute(*m) == *self)
            .collect()
    }

    pub fn minute_count(&self) -> usize {
        match self {
            TimeFormat::OClock => 1,
            TimeFormat::HalfPast => 1,
            TimeFormat::QuarterHour => 2,
            TimeFormat::FiveMinute => 8,
            TimeFormat::FullMinute => 48,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFormat::OClock => "o'clock",
            TimeFormat::HalfPast => "half past",
            TimeFormat::QuarterHour => "quarter hour",
            TimeFormat::FiveMinute => "five minute",
            TimeFormat::FullMinute => "full minute",
        }
    }
}

/// Uniqueness key for a generated time: hour, minute, second and meridiem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeKey {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub is_am: bool,
}

impl std::fmt::Display for TimeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}-{}",
            self.hours,
            self.minutes,
            self.seconds,
            if self.is_am { "AM" } else { "PM" }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour: f64,
    pub minute: f64,
    pub second: Option<f64>,
}

/// A single clock reading shown to the player. Only built through
/// [`TimeValue::new`], so it is serialize-only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeValue {
    hours: u8,
    minutes: u8,
    seconds: u8,
    is_am: bool,
    format: TimeFormat,
}

impl Default for TimeValue {
    fn default() -> Self {
        Self {
            hours: 12,
            minutes: 0,
            seconds: 0,
            is_am: true,
            format: TimeFormat::OClock,
        }
    }
}

impl TimeValue {
    /// Returns `None` unless hours is 1-12, minutes and seconds are 0-59.
    pub fn new(hours: u8, minutes: u8, seconds: u8, is_am: bool) -> Option<Self> {
        if !(1..=12).contains(&hours) || minutes > 59 || seconds > 59 {
            return None;
        }
        Some(Self {
            hours,
            minutes,
            seconds,
            is_am,
            format: TimeFormat::of_minute(minutes),
        })
    }

    pub fn from_key(key: TimeKey) -> Option<Self> {
        Self::new(key.hours, key.minutes, key.seconds, key.is_am)
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn is_am(&self) -> bool {
        self.is_am
    }

    pub fn format(&self) -> TimeFormat {
        self.format
    }

    pub fn key(&self) -> TimeKey {
        TimeKey {
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
            is_am: self.is_am,
        }
    }

    /// Moves the minute hand by `delta` minutes around a 12 hour face,
    /// carrying into the hour. Meridiem and seconds are kept.
    pub fn shifted_minutes(&self, delta: i32) -> Self {
        let total = (self.hours as i32 % 12) * 60 + self.minutes as i32 + delta;
        let total = total.rem_euclid(MINUTES_PER_HALF_DAY);
        let hours = match (total / 60) as u8 {
            0 => 12,
            h => h,
        };
        Self {
            hours,
            minutes: (total % 60) as u8,
            seconds: self.seconds,
            is_am: self.is_am,
            format: TimeFormat::of_minute((total % 60) as u8),
        }
    }

    pub fn shifted_hours(&self, delta: i32) -> Self {
        self.shifted_minutes(delta * 60)
    }

    pub fn shifted_seconds(&self, delta: i32) -> Self {
        let mut copy = *self;
        copy.seconds = (self.seconds as i32 + delta).rem_euclid(60) as u8;
        copy
    }

    pub fn with_meridiem(&self, is_am: bool) -> Self {
        let mut copy = *self;
        copy.is_am = is_am;
        copy
    }

    /// The reading a child gets by confusing the two hands.
    pub fn hands_swapped(&self) -> Option<Self> {
        let hours = match self.minutes / 5 {
            0 => 12,
            h => h,
        };
        let minutes = (self.hours % 12) * 5;
        Self::new(hours, minutes, self.seconds, self.is_am)
    }

    /// The reading of the face flipped left to right.
    pub fn mirrored(&self) -> Option<Self> {
        let hours = match 12 - (self.hours % 12) {
            12 => 12,
            h => h,
        };
        let minutes = (60 - self.minutes as u16) % 60;
        Self::new(hours, minutes as u8, self.seconds, self.is_am)
    }

    /// The answer string, e.g. `3:05`, `3:05:42 PM`.
    pub fn display(&self, show_seconds: bool, show_meridiem: bool) -> String {
        let mut out = format!("{}:{:02}", self.hours, self.minutes);
        if show_seconds {
            out.push_str(&format!(":{:02}", self.seconds));
        }
        if show_meridiem {
            out.push_str(if self.is_am { " AM" } else { " PM" });
        }
        out
    }

    /// Reading in words, as it is said aloud.
    pub fn describe(&self) -> String {
        let next_hour = self.hours % 12 + 1;
        match self.minutes {
            0 => format!("{} o'clock", self.hours),
            15 => format!("quarter past {}", self.hours),
            30 => format!("half past {}", self.hours),
            45 => format!("quarter to {}", next_hour),
            m @ (5 | 10 | 20 | 25) => format!("{} past {}", minute_words(m), self.hours),
            m @ (35 | 40 | 50 | 55) => format!("{} to {}", minute_words(60 - m), next_hour),
            m => format!("{}:{:02}", self.hours, m),
        }
    }

    /// Angles in degrees clockwise from 12.
    pub fn hand_angles(&self, with_seconds: bool) -> HandAngles {
        let seconds = if with_seconds { self.seconds as f64 } else { 0.0 };
        let minute = self.minutes as f64 * 6.0 + seconds * 0.1;
        let hour = (self.hours % 12) as f64 * 30.0 + self.minutes as f64 * 0.5;
        HandAngles {
            hour,
            minute,
            second: with_seconds.then(|| seconds * 6.0),
        }
    }

    #[cfg(test)]
    /// Parse a time of the form "3:05" or "3:05:42" (AM implied).
    pub fn parse(s: &str) -> Self {
        let parts: Vec<u8> = s.split(':').map(|p| p.parse().unwrap()).collect();
        Self::new(parts[0], parts[1], parts.get(2).copied().unwrap_or(0), true).unwrap()
    }
}

fn minute_words(minutes: u8) -> &'static str {
    match minutes {
        5 => "five",
        10 => "ten",
        20 => "twenty",
        25 => "twenty-five",
        _ => "",
    }
}

impl std::fmt::Display for TimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display(true, true))
    }
}

impl std::fmt::Debug for TimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.display(true, true), self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_partition_the_hour() {
        let total: usize = TimeFormat::all().iter().map(|f| f.minutes().len()).sum();
        assert_eq!(total, 60);
        for format in TimeFormat::all() {
            assert_eq!(format.minutes().len(), format.minute_count());
        }
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(TimeValue::new(0, 0, 0, true).is_none());
        assert!(TimeValue::new(13, 0, 0, true).is_none());
        assert!(TimeValue::new(3, 60, 0, true).is_none());
        assert!(TimeValue::new(3, 0, 60, true).is_none());
        assert_eq!(
            TimeValue::new(3, 45, 0, true).unwrap().format(),
            TimeFormat::QuarterHour
        );
    }

    #[test]
    fn test_display() {
        let time = TimeValue::new(3, 5, 42, false).unwrap();
        assert_eq!(time.display(false, false), "3:05");
        assert_eq!(time.display(true, false), "3:05:42");
        assert_eq!(time.display(false, true), "3:05 PM");
        assert_eq!(time.display(true, true), "3:05:42 PM");
    }

    #[test]
    fn test_describe() {
        assert_eq!(TimeValue::parse("7:00").describe(), "7 o'clock");
        assert_eq!(TimeValue::parse("3:15").describe(), "quarter past 3");
        assert_eq!(TimeValue::parse("7:30").describe(), "half past 7");
        assert_eq!(TimeValue::parse("12:45").describe(), "quarter to 1");
        assert_eq!(TimeValue::parse("3:35").describe(), "twenty-five to 4");
        assert_eq!(TimeValue::parse("3:10").describe(), "ten past 3");
        assert_eq!(TimeValue::parse("3:17").describe(), "3:17");
    }

    #[test]
    fn test_shifted_minutes_wraps_hours() {
        assert_eq!(TimeValue::parse("12:55").shifted_minutes(10), TimeValue::parse("1:05"));
        assert_eq!(TimeValue::parse("1:05").shifted_minutes(-10), TimeValue::parse("12:55"));
        assert_eq!(TimeValue::parse("11:30").shifted_hours(1), TimeValue::parse("12:30"));
        assert_eq!(TimeValue::parse("3:00:55").shifted_seconds(10).seconds(), 5);
    }

    #[test]
    fn test_hands_swapped_and_mirrored() {
        assert_eq!(
            TimeValue::parse("3:40").hands_swapped(),
            Some(TimeValue::parse("8:15"))
        );
        assert_eq!(
            TimeValue::parse("12:00").hands_swapped(),
            Some(TimeValue::parse("12:00"))
        );
        assert_eq!(
            TimeValue::parse("2:10").mirrored(),
            Some(TimeValue::parse("10:50"))
        );
        assert_eq!(
            TimeValue::parse("6:00").mirrored(),
            Some(TimeValue::parse("6:00"))
        );
    }

    #[test]
    fn test_hand_angles() {
        let angles = TimeValue::parse("3:30:30").hand_angles(true);
        assert_eq!(angles.hour, 105.0);
        assert_eq!(angles.minute, 183.0);
        assert_eq!(angles.second, Some(180.0));
        assert_eq!(TimeValue::parse("12:00").hand_angles(false).hour, 0.0);
    }

    #[test]
    fn test_key_display() {
        let key = TimeValue::new(9, 7, 3, false).unwrap().key();
        assert_eq!(key.to_string(), "09:07:03-PM");
        assert_eq!(TimeValue::from_key(key).unwrap().key(), key);
    }
}
