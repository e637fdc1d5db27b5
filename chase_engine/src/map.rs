use crate::entities::{
    Position, CAUGHT_GLYPH, NAMED_PURSUER_GLYPHS, PLAYER_GLYPH, PURSUER_GLYPH,
};
use crossterm::{
    queue,
    style::{Color, Print, SetForegroundColor},
};
use std::io::{self, Write};

pub const DOT_GLYPH: char = '*';
pub const EMPTY_GLYPH: char = ' ';
pub const BONUS_GLYPH: char = 'F';

/// The display grid: one glyph per cell, stored row-major.
///
/// It is a derived view of the board. The board recomputes it from the
/// visitation bitmap and the entity positions after every turn.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<char>,
}

impl Grid {
    pub fn new(size: usize) -> Grid {
        Grid {
            size,
            cells: vec![DOT_GLYPH; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.index(row, col).map(|index| self.cells[index])
    }

    /// Returns false if the cell is outside the grid.
    pub fn set(&mut self, row: usize, col: usize, glyph: char) -> bool {
        match self.index(row, col) {
            Some(index) => {
                self.cells[index] = glyph;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        // `max(1)` keeps `chunks` happy on a zero-sized grid
        self.cells.chunks(self.size.max(1))
    }

    pub fn count(&self, glyph: char) -> usize {
        self.cells.iter().filter(|&&cell| cell == glyph).count()
    }

    /// Renders the grid with colours to a terminal.
    ///
    /// `overlay` is an optional glyph drawn on top of the grid, such as the bonus item.
    pub fn draw<W: Write>(
        &self,
        out: &mut W,
        score: usize,
        overlay: Option<(Position, char)>,
    ) -> io::Result<()> {
        queue!(out, Print("Score: "), Print(score.to_string()), Print("\n"))?;

        for (row, cells) in self.rows().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                let glyph = match overlay {
                    Some((at, glyph)) if at == Position::new(row, col) && cell == DOT_GLYPH => {
                        glyph
                    }
                    _ => cell,
                };
                queue!(
                    out,
                    Print("  "),
                    SetForegroundColor(glyph_to_color(glyph)),
                    Print(glyph),
                    SetForegroundColor(Color::Reset)
                )?;
            }
            queue!(out, Print("\n"))?;
        }

        out.flush()
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(row * self.size + col)
    }
}

/// Which cells have had their dot consumed.
///
/// Cells only ever go from unvisited to visited.
#[derive(Clone, Debug, PartialEq)]
pub struct Visited {
    size: usize,
    cells: Vec<bool>,
}

impl Visited {
    pub fn new(size: usize) -> Visited {
        Visited {
            size,
            cells: vec![false; size * size],
        }
    }

    pub fn is_visited(&self, position: Position) -> bool {
        self.index(position)
            .is_some_and(|index| self.cells[index])
    }

    /// Marks the cell as visited, returning true only the first time.
    pub fn mark(&mut self, position: Position) -> bool {
        match self.index(position) {
            Some(index) if !self.cells[index] => {
                self.cells[index] = true;
                true
            }
            _ => false,
        }
    }

    pub fn unvisited(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, visited)| !**visited)
            .map(|(index, _)| Position::new(index / self.size, index % self.size))
            .collect()
    }

    pub fn unvisited_count(&self) -> usize {
        self.cells.iter().filter(|visited| !**visited).count()
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.row >= self.size || position.col >= self.size {
            return None;
        }
        Some(position.row * self.size + position.col)
    }
}

const NAMED_PURSUER_COLORS: [Color; 4] =
    [Color::Red, Color::Magenta, Color::Cyan, Color::DarkYellow];

pub fn glyph_to_color(glyph: char) -> Color {
    if let Some(index) = NAMED_PURSUER_GLYPHS.iter().position(|&named| named == glyph) {
        return NAMED_PURSUER_COLORS[index];
    }

    match glyph {
        PLAYER_GLYPH => Color::Yellow,
        CAUGHT_GLYPH => Color::Red,
        PURSUER_GLYPH => Color::Blue,
        BONUS_GLYPH => Color::Green,
        _ => Color::Grey,
    }
}
