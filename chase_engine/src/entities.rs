use crate::direction::Direction;
use serde::Serialize;
use std::any::type_name;
use uuid::Uuid;

pub const PLAYER_GLYPH: char = 'P';
pub const CAUGHT_GLYPH: char = 'X';
pub const PURSUER_GLYPH: char = 'G';
/// Glyphs richer renderers give to individual pursuers.
pub const NAMED_PURSUER_GLYPHS: [char; 4] = ['A', 'B', 'C', 'D'];

/// A cell on the board, `row` growing downwards and `col` to the right.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    pub fn manhattan(&self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

pub trait Entity {
    fn name(&self) -> &str {
        type_name::<Self>().rsplit("::").next().unwrap_or("Entity")
    }

    fn id(&self) -> &str;

    fn position(&self) -> Position;

    fn set_position(&mut self, position: Position);

    fn glyph(&self) -> char;

    /// Chooses the next step towards `target`.
    fn decide_move(&self, target: Position) -> Direction;
}

pub struct Player {
    id: String,
    position: Position,
    caught: bool,
}

impl Player {
    pub fn new(position: Position) -> Player {
        Player {
            id: Uuid::new_v4().to_string(),
            position,
            caught: false,
        }
    }

    pub fn caught(position: Position) -> Player {
        Player {
            caught: true,
            ..Player::new(position)
        }
    }

    pub fn is_caught(&self) -> bool {
        self.caught
    }

    /// Marks the player as caught, switching its glyph for good.
    pub fn catch(&mut self) {
        self.caught = true;
    }
}

impl Entity for Player {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn glyph(&self) -> char {
        match self.caught {
            true => CAUGHT_GLYPH,
            false => PLAYER_GLYPH,
        }
    }

    // The player is driven from outside, it never picks a move on its own
    fn decide_move(&self, _target: Position) -> Direction {
        Direction::Stay
    }
}

pub struct Pursuer {
    id: String,
    position: Position,
    glyph: char,
}

impl Pursuer {
    pub fn new(position: Position) -> Pursuer {
        Pursuer::with_glyph(position, PURSUER_GLYPH)
    }

    pub fn with_glyph(position: Position, glyph: char) -> Pursuer {
        Pursuer {
            id: Uuid::new_v4().to_string(),
            position,
            glyph,
        }
    }
}

impl Entity for Pursuer {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn glyph(&self) -> char {
        self.glyph
    }

    fn decide_move(&self, target: Position) -> Direction {
        let d_row = target.row as isize - self.position.row as isize;
        let d_col = target.col as isize - self.position.col as isize;

        if d_row == 0 && d_col == 0 {
            return Direction::Stay;
        }

        // Aligned on one axis: close the gap along the other one
        if d_col == 0 {
            return vertical_towards(d_row);
        }
        if d_row == 0 {
            return horizontal_towards(d_col);
        }

        // A strictly larger column gap moves vertically, ties move horizontally
        if d_col.abs() > d_row.abs() {
            vertical_towards(d_row)
        } else {
            horizontal_towards(d_col)
        }
    }
}

fn vertical_towards(d_row: isize) -> Direction {
    match d_row > 0 {
        true => Direction::Down,
        false => Direction::Up,
    }
}

fn horizontal_towards(d_col: isize) -> Direction {
    match d_col > 0 {
        true => Direction::Right,
        false => Direction::Left,
    }
}

/// The entity a save-file glyph stands for, if any.
pub enum Glyph {
    Player(Player),
    Pursuer(Pursuer),
}

pub fn from_glyph(value: char, position: Position) -> Option<Glyph> {
    match value {
        PLAYER_GLYPH => Some(Glyph::Player(Player::new(position))),
        CAUGHT_GLYPH => Some(Glyph::Player(Player::caught(position))),
        PURSUER_GLYPH => Some(Glyph::Pursuer(Pursuer::new(position))),
        _ if NAMED_PURSUER_GLYPHS.contains(&value) => {
            Some(Glyph::Pursuer(Pursuer::with_glyph(position, value)))
        }
        _ => None,
    }
}
