use crate::model::TimeValue;

// terminal cells are about twice as tall as wide
const RADIUS_X: f64 = 12.0;
const RADIUS_Y: f64 = 6.0;
const WIDTH: usize = 2 * RADIUS_X as usize + 1;
const HEIGHT: usize = 2 * RADIUS_Y as usize + 1;
const CENTER_X: usize = RADIUS_X as usize;
const CENTER_Y: usize = RADIUS_Y as usize;

const RIM_CHAR: char = '.';
const HOUR_HAND_CHAR: char = 'o';
const MINUTE_HAND_CHAR: char = '*';
const SECOND_HAND_CHAR: char = ':';
const CENTER_CHAR: char = '+';

const NUMERAL_RADIUS: f64 = 0.85;
const HOUR_HAND_LENGTH: f64 = 0.45;
const MINUTE_HAND_LENGTH: f64 = 0.7;
const SECOND_HAND_LENGTH: f64 = 0.75;
const HAND_STEPS: usize = 40;

struct Canvas {
    cells: [[char; WIDTH]; HEIGHT],
}

impl Canvas {
    fn new() -> Self {
        Self {
            cells: [[' '; WIDTH]; HEIGHT],
        }
    }

    /// Cell at `radius` (fraction of the face) along `angle` degrees from 12.
    fn position(angle: f64, radius: f64) -> (usize, usize) {
        let radians = angle.to_radians();
        let x = CENTER_X as f64 + (radians.sin() * radius * RADIUS_X).round();
        let y = CENTER_Y as f64 - (radians.cos() * radius * RADIUS_Y).round();
        (
            (x.max(0.0) as usize).min(WIDTH - 1),
            (y.max(0.0) as usize).min(HEIGHT - 1),
        )
    }

    fn put(&mut self, (x, y): (usize, usize), c: char) {
        self.cells[y][x] = c;
    }

    #[cfg(test)]
    fn get(&self, x: usize, y: usize) -> char {
        self.cells[y][x]
    }

    fn draw_hand(&mut self, angle: f64, length: f64, c: char) {
        for step in 1..=HAND_STEPS {
            let radius = length * step as f64 / HAND_STEPS as f64;
            self.put(Self::position(angle, radius), c);
        }
    }

    fn draw_text(&mut self, (x, y): (usize, usize), text: &str) {
        // two-digit numerals straddle their position
        let start = x.saturating_sub(text.len() / 2);
        for (offset, c) in text.chars().enumerate() {
            if start + offset < WIDTH {
                self.cells[y][start + offset] = c;
            }
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}

/// Draws `time` as an analog face, one string per terminal row.
pub fn render(time: &TimeValue, show_seconds: bool) -> Vec<String> {
    let mut canvas = Canvas::new();
    for tick in 0..60 {
        canvas.put(Canvas::position(tick as f64 * 6.0, 1.0), RIM_CHAR);
    }
    for hour in 1..=12u32 {
        let position = Canvas::position(hour as f64 * 30.0, NUMERAL_RADIUS);
        canvas.draw_text(position, &hour.to_string());
    }

    let angles = time.hand_angles(show_seconds);
    if let Some(second) = angles.second {
        canvas.draw_hand(second, SECOND_HAND_LENGTH, SECOND_HAND_CHAR);
    }
    canvas.draw_hand(angles.minute, MINUTE_HAND_LENGTH, MINUTE_HAND_CHAR);
    canvas.draw_hand(angles.hour, HOUR_HAND_LENGTH, HOUR_HAND_CHAR);
    canvas.put((CENTER_X, CENTER_Y), CENTER_CHAR);

    canvas.into_lines()
}
