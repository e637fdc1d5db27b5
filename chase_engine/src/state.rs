use crate::entities::Position;
use serde::Serialize;

/// Represents the state of the game after a turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameState {
    /// The number of turns resolved so far.
    pub turn: usize,
    /// The current score.
    pub score: usize,
    /// The side length of the square board.
    pub size: usize,
    /// Where the player stands.
    pub player: Position,
    /// Where each pursuer stands, in creation order.
    pub pursuers: Vec<Position>,
    /// How many cells still hold a dot.
    pub dots_remaining: usize,
    /// Whether the player has been caught.
    pub game_over: bool,
}
