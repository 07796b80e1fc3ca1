//! Input mapping
//!
//! Keyboard keys, on-screen buttons and touch swipes all reduce to a
//! [`Command`] applied to the game.

use snake_core::Direction;

/// Player intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    /// Space bar: start when idle, otherwise pause/resume
    StartOrPause,
    Start,
    TogglePause,
    Reset,
}

/// Map a `KeyboardEvent.key` value
pub fn command_for_key(key: &str) -> Option<Command> {
    let dir = match key {
        "ArrowUp" | "w" | "W" => Direction::Up,
        "ArrowDown" | "s" | "S" => Direction::Down,
        "ArrowLeft" | "a" | "A" => Direction::Left,
        "ArrowRight" | "d" | "D" => Direction::Right,
        " " => return Some(Command::StartOrPause),
        _ => return None,
    };
    Some(Command::Steer(dir))
}

/// Element ids of the on-screen buttons and their commands
pub const BUTTONS: &[(&str, Command)] = &[
    ("start-btn", Command::Start),
    ("pause-btn", Command::TogglePause),
    ("reset-btn", Command::Reset),
    ("up-btn", Command::Steer(Direction::Up)),
    ("down-btn", Command::Steer(Direction::Down)),
    ("left-btn", Command::Steer(Direction::Left)),
    ("right-btn", Command::Steer(Direction::Right)),
];

/// Tracks one touch gesture. A swipe yields at most one direction; the
/// gesture must start again before the next one.
#[derive(Debug, Default)]
pub struct Swipe {
    start: Option<(f64, f64)>,
}

impl Swipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.start = Some((x, y));
    }

    /// Direction of the movement from the start point along the dominant
    /// axis. `None` without a start point or without movement.
    pub fn moved(&mut self, x: f64, y: f64) -> Option<Direction> {
        let (sx, sy) = self.start.take()?;
        let dx = sx - x;
        let dy = sy - y;

        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Some(Direction::Left)
            } else if dx < 0.0 {
                Some(Direction::Right)
            } else {
                None
            }
        } else if dy > 0.0 {
            Some(Direction::Up)
        } else if dy < 0.0 {
            Some(Direction::Down)
        } else {
            None
        }
    }
}
