use crate::entities::Position;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::str::FromStr;

/// Represents the direction an entity can move.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stay,
}

impl Direction {
    /// The four directions that actually displace an entity.
    pub const MOVES: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The displacement as `(row delta, col delta)`.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Stay => (0, 0),
        }
    }

    /// Applies the displacement to `position` on a `size`×`size` board.
    ///
    /// Returns `None` if the result would leave the board.
    pub fn apply(self, position: Position, size: usize) -> Option<Position> {
        let (d_row, d_col) = self.offset();
        let row = position.row.checked_add_signed(d_row)?;
        let col = position.col.checked_add_signed(d_col)?;

        if row >= size || col >= size {
            return None;
        }

        Some(Position::new(row, col))
    }
}

impl Distribution<Direction> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Direction {
        match rng.gen_range(0..4) {
            0 => Direction::Up,
            1 => Direction::Down,
            2 => Direction::Left,
            _ => Direction::Right,
        }
    }
}

/// Error returned when a console command does not name a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "w" | "up" => Ok(Direction::Up),
            "s" | "down" => Ok(Direction::Down),
            "a" | "left" => Ok(Direction::Left),
            "d" | "right" => Ok(Direction::Right),
            "stay" => Ok(Direction::Stay),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}
