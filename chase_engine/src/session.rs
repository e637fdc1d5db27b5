//! Drives a board turn by turn from a line based input source.

use crate::board::Board;
use crate::bonus::Bonus;
use crate::direction::Direction;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Lives a player starts a session with.
pub const INITIAL_LIVES: usize = 3;

/// Represents the reason a session ended.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    /// The player asked to stop.
    Quit,
    /// A pursuer caught the player on its last life.
    Caught,
    /// Every dot on the board was eaten.
    Cleared,
    /// The player found the bonus item.
    BonusEaten,
}

pub struct Session<R, W> {
    board: Board,
    input: R,
    output: W,
    output_path: PathBuf,
    lives: usize,
    bonus: Option<Bonus>,
    bonus_rng: Option<StdRng>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Creates a new session.
    ///
    /// # Arguments
    /// * `board` - The board to play on.
    /// * `input` - Where commands are read from, one per line.
    /// * `output` - Where the board is rendered.
    /// * `output_path` - Where the board is saved when the session ends.
    pub fn new(board: Board, input: R, output: W, output_path: PathBuf) -> Session<R, W> {
        Session {
            board,
            input,
            output,
            output_path,
            lives: INITIAL_LIVES,
            bonus: None,
            bonus_rng: None,
        }
    }

    /// Sets how many captures end the session, at least one.
    pub fn with_lives(mut self, lives: usize) -> Session<R, W> {
        self.lives = lives.max(1);
        self
    }

    /// Places a bonus item on the board, eating it ends the session.
    /// A new one is placed every time the board restarts.
    ///
    /// # Arguments
    /// * `seed` - The seed for the random number generator placing the bonus.
    pub fn with_bonus(mut self, seed: u64) -> Session<R, W> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.bonus = Some(Bonus::place(&self.board, &mut rng));
        self.bonus_rng = Some(rng);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bonus(&self) -> Option<&Bonus> {
        self.bonus.as_ref()
    }

    pub fn lives(&self) -> usize {
        self.lives
    }

    /// Plays until the player quits, runs out of lives or wins.
    ///
    /// A capture costs a life and starts a fresh board of the same size.
    /// Valid commands are `w` (up), `a` (left), `s` (down), `d` (right) and
    /// `q` to quit. The board is saved whatever the outcome.
    pub fn run(&mut self) -> Result<Outcome> {
        self.render()?;

        loop {
            if let Some(outcome) = self.outcome()? {
                return self.finish(outcome);
            }

            self.print_controls()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                tracing::info!("Input closed, quitting");
                return self.finish(Outcome::Quit);
            }

            let command = line.trim();
            if command.eq_ignore_ascii_case("q") {
                return self.finish(Outcome::Quit);
            }

            match command.parse::<Direction>() {
                Ok(Direction::Stay) | Err(_) => {
                    tracing::warn!("Invalid command {command:?}");
                    writeln!(self.output, "Invalid command. Please try again.")?;
                }
                Ok(direction) => {
                    self.board.move_player(direction);
                    self.render()?;
                }
            }
        }
    }

    /// Plays on its own, picking random moves that stay on the board.
    ///
    /// # Arguments
    /// * `seed` - The seed for the random number generator.
    /// * `max_turns` - The number of turns after which the session quits.
    pub fn autoplay(&mut self, seed: u64, max_turns: usize) -> Result<Outcome> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.render()?;

        for _ in 0..max_turns {
            if let Some(outcome) = self.outcome()? {
                return self.finish(outcome);
            }

            let direction = self.random_move(&mut rng);
            self.board.move_player(direction);
            self.render()?;
        }

        match self.outcome()? {
            Some(outcome) => self.finish(outcome),
            None => self.finish(Outcome::Quit),
        }
    }

    fn random_move(&self, rng: &mut StdRng) -> Direction {
        // On a 1x1 board no move stays on it
        if !Direction::MOVES.iter().any(|&d| self.board.can_move(d)) {
            return Direction::Stay;
        }

        loop {
            let direction: Direction = rng.gen();
            if self.board.can_move(direction) {
                return direction;
            }
        }
    }

    fn outcome(&mut self) -> Result<Option<Outcome>> {
        if self.board.is_game_over() {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                return Ok(Some(Outcome::Caught));
            }
            self.start_over()?;
        }

        if self
            .bonus
            .as_mut()
            .is_some_and(|bonus| bonus.check_eaten(&self.board))
        {
            return Ok(Some(Outcome::BonusEaten));
        }

        if self.board.dots_remaining() == 0 {
            return Ok(Some(Outcome::Cleared));
        }

        Ok(None)
    }

    fn start_over(&mut self) -> Result<()> {
        tracing::info!("Player caught, {} lives left", self.lives);
        writeln!(self.output, "Caught! Lives left: {}", self.lives)?;

        self.board.restart();
        if let Some(rng) = self.bonus_rng.as_mut() {
            self.bonus = Some(Bonus::place(&self.board, rng));
        }

        self.render()
    }

    fn finish(&mut self, outcome: Outcome) -> Result<Outcome> {
        tracing::info!(
            "Session ended with {outcome:?} after {} turns, score {}",
            self.board.turn(),
            self.board.score()
        );

        self.board.save(&self.output_path)?;
        self.board.save_replay()?;

        match outcome {
            Outcome::Quit => writeln!(
                self.output,
                "Game saved to: {}",
                self.output_path.display()
            )?,
            Outcome::Caught => writeln!(self.output, "Game Over!")?,
            Outcome::Cleared => writeln!(self.output, "You cleared the board!")?,
            Outcome::BonusEaten => writeln!(self.output, "You found the bonus!")?,
        }
        self.output.flush()?;

        Ok(outcome)
    }

    fn render(&mut self) -> Result<()> {
        let overlay = self.bonus.as_ref().and_then(Bonus::overlay);
        self.board
            .grid()
            .draw(&mut self.output, self.board.score(), overlay)?;
        writeln!(self.output, "Lives: {}", self.lives)?;
        writeln!(self.output)?;
        Ok(())
    }

    fn print_controls(&mut self) -> Result<()> {
        writeln!(self.output, "  Controls:")?;
        writeln!(self.output, "    w - Move Up")?;
        writeln!(self.output, "    s - Move Down")?;
        writeln!(self.output, "    a - Move Left")?;
        writeln!(self.output, "    d - Move Right")?;
        writeln!(self.output, "    q - Quit and Save Board")?;
        writeln!(self.output)?;
        Ok(())
    }
}
