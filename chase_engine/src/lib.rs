//! # chase_engine
//!
//! The core engine for a grid chase game.
//! A single player moves under external control across an open square board
//! eating dots, while pursuers close in on it one greedy step per turn.

pub mod board;
pub use board::Board;
pub use board::DOT_REWARD;
pub use board::PURSUER_COUNT;

pub mod direction;
pub use direction::Direction;

pub mod entities;
pub use entities::Entity;
pub use entities::Player;
pub use entities::Position;
pub use entities::Pursuer;

pub mod error;
pub use error::BoardError;
pub use error::Result;

pub mod session;
pub use session::Outcome;
pub use session::Session;

pub mod state;
pub use state::GameState;

pub mod bonus;
pub mod map;
pub mod replay;
pub mod save;
