use chrono::{DateTime, Utc};
use itertools::iproduct;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::{HashMap, VecDeque};

use crate::model::{Level, TimeFormat, TimeKey, TimeValue};

/// Random draws per question before falling back to a pool scan.
pub const MAX_ATTEMPTS: usize = 64;
/// A format used this many times in a row is skipped for the next draw.
pub const MAX_FORMAT_RUN: usize = 3;
pub const RECENT_HISTORY: usize = 5;
/// Share of a level's pool that may be used before its tracking is cleared.
pub const EXHAUSTION_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub format: TimeFormat,
    pub timestamp: DateTime<Utc>,
}

/// Hands out clock times that do not repeat within a session.
///
/// Uniqueness is tracked per level. Once a level has used
/// [`EXHAUSTION_RATIO`] of its pool, its tracking set is cleared and times
/// may come around again. A level whose pool is fully used between resets
/// (only possible for tiny pools) gets a repeated time rather than a stall.
pub struct RandomnessManager {
    seed: u64,
    rng: StdRng,
    used: HashMap<Level, HashMap<TimeKey, UsageRecord>>,
    recent: VecDeque<TimeValue>,
}

impl std::fmt::Debug for RandomnessManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomnessManager")
            .field("seed", &self.seed)
            .field("used", &self.used.values().map(|m| m.len()).sum::<usize>())
            .field("recent", &self.recent)
            .finish()
    }
}

impl RandomnessManager {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        debug!(target: "randomness", "Seeding randomness with {}", seed);
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            used: HashMap::new(),
            recent: VecDeque::with_capacity(RECENT_HISTORY + 1),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn reset_session(&mut self) {
        info!(target: "randomness", "Resetting session tracking");
        self.used.clear();
        self.recent.clear();
    }

    pub fn used_count(&self, level: Level) -> usize {
        self.used.get(&level).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_used(&self, level: Level, key: &TimeKey) -> bool {
        self.used
            .get(&level)
            .is_some_and(|used| used.contains_key(key))
    }

    pub fn usage(&self, level: Level, key: &TimeKey) -> Option<&UsageRecord> {
        self.used.get(&level).and_then(|used| used.get(key))
    }

    pub fn recent(&self) -> impl Iterator<Item = &TimeValue> {
        self.recent.iter()
    }

    pub fn record(&mut self, level: Level, time: TimeValue) {
        self.used.entry(level).or_default().insert(
            time.key(),
            UsageRecord {
                format: time.format(),
                timestamp: Utc::now(),
            },
        );
        self.recent.push_back(time);
        while self.recent.len() > RECENT_HISTORY {
            self.recent.pop_front();
        }
    }

    /// Next time for `level`, unique within the session where the pool allows.
    pub fn next_time(&mut self, level: Level) -> TimeValue {
        self.reset_if_exhausted(level);

        for attempt in 0..MAX_ATTEMPTS {
            let format = self.choose_format(level);
            let candidate = self.random_time_in_format(level, format);
            if self.is_used(level, &candidate.key()) {
                trace!(target: "randomness", "Attempt {}: {} already used", attempt, candidate.key());
                continue;
            }
            if self.repeats_recent_pattern(&candidate) {
                trace!(target: "randomness", "Attempt {}: {:?} repeats a recent pattern", attempt, candidate);
                continue;
            }
            self.record(level, candidate);
            return candidate;
        }

        if let Some(time) = self.first_unused_in_pool(level) {
            debug!(target: "randomness", "Random draws exhausted; took {:?} from pool scan", time);
            self.record(level, time);
            return time;
        }

        let time = self.random_time(level);
        warn!(
            target: "randomness",
            "{} pool fully used; repeating {:?}",
            level,
            time
        );
        self.record(level, time);
        time
    }

    /// Any time the level can show, ignoring session tracking.
    pub fn random_time(&mut self, level: Level) -> TimeValue {
        let format = level
            .formats()
            .choose_weighted(&mut self.rng, |w| w.weight)
            .map(|w| w.format)
            .unwrap_or(TimeFormat::OClock);
        self.random_time_in_format(level, format)
    }

    pub fn random_time_in_format(&mut self, level: Level, format: TimeFormat) -> TimeValue {
        let minutes = format.minutes();
        let minute = minutes.choose(&mut self.rng).copied().unwrap_or(0);
        let hour = self.rng.random_range(1..=12u8);
        let second = if level.shows_seconds() {
            self.rng.random_range(0..60u8)
        } else {
            0
        };
        let is_am = match level.meridiems() {
            [only] => *only,
            _ => self.rng.random_bool(0.5),
        };
        TimeValue::new(hour, minute, second, is_am).unwrap_or_default()
    }

    fn reset_if_exhausted(&mut self, level: Level) {
        let used = self.used_count(level);
        let pool = level.pool_size();
        if used as f64 >= pool as f64 * EXHAUSTION_RATIO {
            info!(
                target: "randomness",
                "{} used {}/{} times; clearing its tracking",
                level,
                used,
                pool
            );
            if let Some(used) = self.used.get_mut(&level) {
                used.clear();
            }
        }
    }

    /// Weighted draw over the level's formats. The previous format is
    /// down-weighted, and a format that ran [`MAX_FORMAT_RUN`] times in a row
    /// is skipped while the level offers another.
    fn choose_format(&mut self, level: Level) -> TimeFormat {
        let candidates = self.format_weights(level);
        candidates
            .choose_weighted(&mut self.rng, |(_, weight)| *weight)
            .map(|(format, _)| *format)
            .unwrap_or(level.formats()[0].format)
    }

    fn format_weights(&self, level: Level) -> Vec<(TimeFormat, u32)> {
        let formats = level.formats();
        let last = self.recent.back().map(|t| t.format());
        let run = self.format_run();

        formats
            .iter()
            .filter(|w| formats.len() == 1 || Some(w.format) != run)
            .map(|w| {
                let weight = if Some(w.format) == last {
                    (w.weight / 2).max(1)
                } else {
                    w.weight
                };
                (w.format, weight)
            })
            .collect()
    }

    /// The format of the last [`MAX_FORMAT_RUN`] times, if they all share one.
    fn format_run(&self) -> Option<TimeFormat> {
        if self.recent.len() < MAX_FORMAT_RUN {
            return None;
        }
        let mut tail = self.recent.iter().rev().take(MAX_FORMAT_RUN);
        let first = tail.next()?.format();
        tail.all(|t| t.format() == first).then_some(first)
    }

    fn repeats_recent_pattern(&self, candidate: &TimeValue) -> bool {
        let Some(previous) = self.recent.back() else {
            return false;
        };
        if previous.hours() == candidate.hours() {
            return true;
        }
        candidate.format().minute_count() > 1 && previous.minutes() == candidate.minutes()
    }

    fn first_unused_in_pool(&mut self, level: Level) -> Option<TimeValue> {
        let pool = pool_keys(level);
        if pool.is_empty() {
            return None;
        }
        let offset = self.rng.random_range(0..pool.len());
        pool.iter()
            .cycle()
            .skip(offset)
            .take(pool.len())
            .find(|key| !self.is_used(level, key))
            .and_then(|key| TimeValue::from_key(*key))
    }
}

/// Every key the level can produce, in a fixed order.
pub fn pool_keys(level: Level) -> Vec<TimeKey> {
    let seconds: Vec<u8> = if level.shows_seconds() {
        (0..60).collect()
    } else {
        vec![0]
    };
    let minutes: Vec<u8> = level
        .formats()
        .iter()
        .flat_map(|w| w.format.minutes())
        .collect();
    iproduct!(minutes, 1..=12u8, level.meridiems().iter().copied(), seconds)
        .map(|(minutes, hours, is_am, seconds)| TimeKey {
            hours,
            minutes,
            seconds,
            is_am,
        })
        .collect()
}
