use crate::board::Board;
use crate::entities::{Entity, Position};
use crate::map::{BONUS_GLYPH, DOT_GLYPH};
use rand::seq::SliceRandom;
use rand::Rng;

/// A one-off bonus item shown on top of a dot.
///
/// The bonus is never written into the board grid. Drivers overlay it when
/// rendering, so it is never saved either.
#[derive(Clone, Debug, PartialEq)]
pub struct Bonus {
    position: Option<Position>,
}

impl Bonus {
    /// Places the bonus on a random dot away from the center of the board.
    ///
    /// Cells more than 2 steps away from the center are preferred, falling back to
    /// cells more than 1 step away. If no dot qualifies the bonus is not placed.
    pub fn place<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Bonus {
        let position = [2, 1].into_iter().find_map(|min_distance| {
            candidates(board, min_distance).choose(&mut *rng).copied()
        });

        match position {
            Some(at) => tracing::debug!("Bonus placed at {at:?}"),
            None => tracing::debug!("No room left for a bonus"),
        }

        Bonus { position }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn glyph(&self) -> char {
        BONUS_GLYPH
    }

    /// Returns true, and removes the bonus, when the player stands on it.
    pub fn check_eaten(&mut self, board: &Board) -> bool {
        if self.position != Some(board.player().position()) || board.is_game_over() {
            return false;
        }

        self.position = None;
        true
    }

    /// The bonus as an overlay for [`crate::map::Grid::draw`].
    pub fn overlay(&self) -> Option<(Position, char)> {
        self.position.map(|at| (at, BONUS_GLYPH))
    }
}

fn candidates(board: &Board, min_distance: usize) -> Vec<Position> {
    let size = board.grid_size();
    let center = Position::new(size / 2, size / 2);

    (0..size)
        .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
        .filter(|at| board.grid_char(at.row, at.col) == DOT_GLYPH)
        .filter(|at| at.row.abs_diff(center.row).max(at.col.abs_diff(center.col)) > min_distance)
        .collect()
}
