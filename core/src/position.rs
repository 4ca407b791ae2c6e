//! Grid coordinates.
//!
//! x is the row axis (bounded by grid height), y is the column axis
//! (bounded by grid width). "Up" decreases x, "right" increases y.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance.
    pub fn distance_to(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// One grid step in `direction`, clamped to a `height` x `width` grid.
    /// Stepping into an edge returns the same position.
    pub fn step(&self, direction: Direction, height: usize, width: usize) -> Position {
        match direction {
            Direction::Up    => Position::new(self.x.saturating_sub(1), self.y),
            Direction::Down  => Position::new((self.x + 1).min(height.saturating_sub(1)), self.y),
            Direction::Left  => Position::new(self.x, self.y.saturating_sub(1)),
            Direction::Right => Position::new(self.x, (self.y + 1).min(width.saturating_sub(1))),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}
