use itertools::Itertools;
use rand::seq::SliceRandom;

use super::randomness::RandomnessManager;
use crate::model::{Level, TimeFormat, TimeValue};

pub const OPTION_COUNT: usize = 4;
const RANDOM_FILL_ATTEMPTS: usize = 32;

/// Wrong answers a player is likely to give for `correct`, most plausible first.
fn plausible_distractors(correct: &TimeValue, level: Level) -> Vec<TimeValue> {
    let mut distractors: Vec<TimeValue> = Vec::new();
    distractors.extend(correct.hands_swapped());
    distractors.push(correct.shifted_hours(1));
    distractors.push(correct.shifted_hours(-1));
    distractors.push(correct.shifted_minutes(5));
    distractors.push(correct.shifted_minutes(-5));
    distractors.push(correct.shifted_minutes(15));
    distractors.push(correct.shifted_minutes(-15));
    distractors.extend(correct.mirrored());
    if level.shows_meridiem() {
        distractors.push(correct.with_meridiem(!correct.is_am()));
    }
    if level.shows_seconds() {
        distractors.push(correct.shifted_seconds(10));
        distractors.push(correct.shifted_seconds(-10));
    }
    distractors
}

/// Exactly [`OPTION_COUNT`] distinct answer strings, one of which is the
/// display of `correct`, in random order.
pub fn generate_options(
    correct: &TimeValue,
    level: Level,
    randomness: &mut RandomnessManager,
) -> Vec<String> {
    let show_seconds = level.shows_seconds();
    let show_meridiem = level.shows_meridiem();
    let render = |time: &TimeValue| time.display(show_seconds, show_meridiem);

    let answer = render(correct);
    let mut options = vec![answer.clone()];

    let mut candidates = plausible_distractors(correct, level);
    candidates.shuffle(randomness.rng_mut());
    let distractors = candidates
        .iter()
        .map(render)
        .filter(|option| *option != answer)
        .unique()
        .take(OPTION_COUNT - 1);
    options.extend(distractors);

    let mut attempts = 0;
    while options.len() < OPTION_COUNT {
        // full-minute times give 576+ distinct strings, so this always ends
        let filler = if attempts < RANDOM_FILL_ATTEMPTS {
            randomness.random_time(level)
        } else {
            randomness.random_time_in_format(level, TimeFormat::FullMinute)
        };
        attempts += 1;
        let option = render(&filler);
        if !options.contains(&option) {
            options.push(option);
        }
    }

    options.shuffle(randomness.rng_mut());
    options
}

pub fn correct_index(options: &[String], correct: &TimeValue, level: Level) -> Option<usize> {
    let answer = correct.display(level.shows_seconds(), level.shows_meridiem());
    options.iter().position(|option| *option == answer)
}
