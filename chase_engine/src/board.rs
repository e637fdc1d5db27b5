use crate::direction::Direction;
use crate::entities::{from_glyph, Entity, Glyph, Player, Position, Pursuer};
use crate::error::{BoardError, Result};
use crate::map::{Grid, Visited, DOT_GLYPH, EMPTY_GLYPH};
use crate::replay::{create_replay_logger, ReplayLogger};
use crate::save::SavedBoard;
use crate::state::GameState;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Points awarded the first time a dot is eaten.
pub const DOT_REWARD: usize = 10;
/// Pursuers placed on a freshly generated board, one per corner.
pub const PURSUER_COUNT: usize = 4;

/// The chase game board.
/// Owns the grid, the visitation bitmap, the entities and the score.
pub struct Board {
    size: usize,
    grid: Grid,
    visited: Visited,
    player: Player,
    pursuers: Vec<Pursuer>,
    score: usize,
    game_over: bool,
    turn: usize,
    replay_logger: Box<dyn ReplayLogger>,
}

impl Board {
    /// Creates a fresh board.
    ///
    /// The player starts at the center and one pursuer sits in each corner.
    /// Sizes below 3 are accepted, callers are expected to enforce a sane minimum.
    ///
    /// # Arguments
    /// * `size` - The side length of the square board.
    pub fn new(size: usize) -> Board {
        let center = size / 2;
        let last = size.saturating_sub(1);

        let player = Player::new(Position::new(center, center));
        let pursuers = [(0, 0), (0, last), (last, last), (last, 0)]
            .into_iter()
            .map(|(row, col)| Pursuer::new(Position::new(row, col)))
            .collect();

        let mut visited = Visited::new(size);
        visited.mark(player.position());

        Board::assemble(size, 0, visited, player, pursuers)
    }

    /// Loads a board from a file written by [`Board::save`].
    ///
    /// # Arguments
    /// * `path` - The path to the board file.
    pub fn load(path: impl AsRef<Path>) -> Result<Board> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let board = Board::from_saved(SavedBoard::parse(&contents)?)?;

        tracing::info!(
            "Loaded {}x{} board with {} pursuers from {}",
            board.size,
            board.size,
            board.pursuers.len(),
            path.display()
        );

        Ok(board)
    }

    /// Rebuilds a board from its saved glyphs.
    ///
    /// Entities are recreated wherever their glyphs appear. Blank cells count as
    /// visited; every other cell still holds a dot. Any number of pursuers is kept.
    pub fn from_saved(saved: SavedBoard) -> Result<Board> {
        let size = saved.size;
        let mut visited = Visited::new(size);
        let mut player: Option<Player> = None;
        let mut pursuers = Vec::new();

        for (row, cells) in saved.rows.iter().enumerate() {
            for (col, &glyph) in cells.iter().enumerate() {
                let position = Position::new(row, col);

                match from_glyph(glyph, position) {
                    Some(Glyph::Player(found)) => {
                        if player.is_some() {
                            tracing::warn!(
                                "Several players on the board, keeping the one at {position:?}"
                            );
                        }
                        visited.mark(position);
                        player = Some(found);
                    }
                    Some(Glyph::Pursuer(pursuer)) => pursuers.push(pursuer),
                    None if glyph == EMPTY_GLYPH => {
                        visited.mark(position);
                    }
                    None => {}
                }
            }
        }

        let player = player.ok_or_else(|| BoardError::Format {
            line: 3,
            reason: "no player on the board".to_string(),
        })?;

        Ok(Board::assemble(size, saved.score, visited, player, pursuers))
    }

    /// Records every turn to a JSON replay file, written by [`Board::save_replay`].
    ///
    /// # Arguments
    /// * `filename` - Where to write the replay. If `None`, no replay is kept.
    pub fn with_replay(mut self, filename: Option<PathBuf>) -> Board {
        self.replay_logger =
            create_replay_logger(filename, self.size, self.to_saved().to_string());
        self.log_turn();
        self
    }

    /// Moves the player and then every pursuer, resolving a whole turn.
    ///
    /// A move off the board leaves the player in place, the pursuers still move.
    /// Once the player is caught further moves are ignored.
    ///
    /// # Arguments
    /// * `direction` - The direction the player should move.
    pub fn move_player(&mut self, direction: Direction) {
        if self.game_over {
            tracing::warn!("Ignoring move {direction:?}, the game is over");
            return;
        }

        self.turn += 1;

        let from = self.player.position();
        tracing::debug!("Player starting at {from:?}, moving {direction:?}");

        if let Some(to) = direction.apply(from, self.size) {
            self.player.set_position(to);
            if to != from {
                self.replay_logger
                    .log_move(self.turn, self.player.name(), self.player.id(), from, to);
            }
            if self.visited.mark(to) {
                self.score += DOT_REWARD;
                self.replay_logger.log_consume(self.turn, to);
            }
        }

        self.check_capture();

        for index in 0..self.pursuers.len() {
            self.move_pursuer(index);
            self.check_capture();
        }

        self.refresh_grid();
        self.log_turn();
    }

    /// Starts over on a fresh board of the same size.
    ///
    /// The turn counter and the replay carry on, everything else is reset.
    pub fn restart(&mut self) {
        let Board {
            grid,
            visited,
            player,
            pursuers,
            score,
            game_over,
            ..
        } = Board::new(self.size);

        self.grid = grid;
        self.visited = visited;
        self.player = player;
        self.pursuers = pursuers;
        self.score = score;
        self.game_over = game_over;

        tracing::info!("Board restarted on turn {}", self.turn);
        self.log_turn();
    }

    /// Whether the player could move in `direction` without leaving the board.
    pub fn can_move(&self, direction: Direction) -> bool {
        direction.apply(self.player.position(), self.size).is_some()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Whether any pursuer stands on the player's cell right now.
    pub fn is_captured(&self) -> bool {
        let at = self.player.position();
        self.pursuers.iter().any(|pursuer| pursuer.position() == at)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn grid_size(&self) -> usize {
        self.size
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    /// The glyph at a cell, or a blank for cells outside the board.
    pub fn grid_char(&self, row: usize, col: usize) -> char {
        self.grid.get(row, col).unwrap_or(EMPTY_GLYPH)
    }

    /// Overwrites a displayed glyph until the next turn redraws the grid.
    /// Cells outside the board are ignored.
    pub fn set_grid_char(&mut self, row: usize, col: usize, glyph: char) {
        self.grid.set(row, col, glyph);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn visited(&self) -> &Visited {
        &self.visited
    }

    /// Cells still showing an uneaten dot.
    pub fn dots_remaining(&self) -> usize {
        self.visited
            .unvisited()
            .into_iter()
            .filter(|&position| !self.is_occupied(position))
            .count()
    }

    pub fn state(&self) -> GameState {
        GameState {
            turn: self.turn,
            score: self.score,
            size: self.size,
            player: self.player.position(),
            pursuers: self.pursuer_positions(),
            dots_remaining: self.dots_remaining(),
            game_over: self.game_over,
        }
    }

    /// Writes the board to a file readable by [`Board::load`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_saved().to_string())?;
        tracing::info!("Board saved to {}", path.display());
        Ok(())
    }

    /// Flushes the replay, if one is being recorded.
    pub fn save_replay(&self) -> Result<()> {
        self.replay_logger.save()
    }

    pub fn to_saved(&self) -> SavedBoard {
        SavedBoard {
            size: self.size,
            score: self.score,
            rows: self.grid.rows().map(|row| row.to_vec()).collect(),
        }
    }

    fn assemble(
        size: usize,
        score: usize,
        visited: Visited,
        player: Player,
        pursuers: Vec<Pursuer>,
    ) -> Board {
        let game_over = player.is_caught();
        let mut board = Board {
            size,
            grid: Grid::new(size),
            visited,
            player,
            pursuers,
            score,
            game_over,
            turn: 0,
            replay_logger: create_replay_logger(None, size, String::new()),
        };
        // Tiny boards start with a pursuer on the player's cell
        board.check_capture();
        board.refresh_grid();
        board
    }

    fn move_pursuer(&mut self, index: usize) {
        // Once the player is caught the rest of the pass stands still
        let direction = match self.game_over {
            true => Direction::Stay,
            false => self.pursuers[index].decide_move(self.player.position()),
        };

        let pursuer = &mut self.pursuers[index];
        let from = pursuer.position();

        // A chase step moves between two cells on the board, so it can't leave it
        let Some(to) = direction.apply(from, self.size) else {
            tracing::warn!("Pursuer {} tried to leave the board at {from:?}", pursuer.id());
            return;
        };

        if to != from {
            pursuer.set_position(to);
            self.replay_logger
                .log_move(self.turn, pursuer.name(), pursuer.id(), from, to);
        }
        tracing::debug!("Pursuer {index} moved {direction:?} to {to:?}");
    }

    fn check_capture(&mut self) {
        if self.game_over || !self.is_captured() {
            return;
        }

        self.game_over = true;
        self.player.catch();
        self.replay_logger
            .log_capture(self.turn, self.player.id(), self.player.position());
        self.replay_logger.log_end_game("Caught".to_string());
        tracing::info!(
            "Player caught at {:?} on turn {}",
            self.player.position(),
            self.turn
        );
    }

    fn refresh_grid(&mut self) {
        for row in 0..self.size {
            for col in 0..self.size {
                let position = Position::new(row, col);
                let glyph = match self.visited.is_visited(position) {
                    true => EMPTY_GLYPH,
                    false => DOT_GLYPH,
                };
                self.grid.set(row, col, glyph);
            }
        }

        // Pursuers are drawn in reverse so the first one created ends up on top,
        // and the player is drawn over all of them
        for pursuer in self.pursuers.iter().rev() {
            let at = pursuer.position();
            self.grid.set(at.row, at.col, pursuer.glyph());
        }
        let at = self.player.position();
        self.grid.set(at.row, at.col, self.player.glyph());
    }

    fn is_occupied(&self, position: Position) -> bool {
        self.player.position() == position
            || self
                .pursuers
                .iter()
                .any(|pursuer| pursuer.position() == position)
    }

    fn pursuer_positions(&self) -> Vec<Position> {
        self.pursuers.iter().map(|pursuer| pursuer.position()).collect()
    }

    fn log_turn(&mut self) {
        let pursuers = self.pursuer_positions();
        self.replay_logger
            .log_turn(self.turn, self.score, self.player.position(), pursuers);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        for row in self.grid.rows() {
            for cell in row {
                write!(f, "  {cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(contents: &str) -> Board {
        Board::from_saved(SavedBoard::parse(contents).unwrap()).unwrap()
    }

    fn rows(board: &Board) -> Vec<String> {
        board.grid().rows().map(|row| row.iter().collect()).collect()
    }

    #[test]
    fn when_creating_a_board_the_player_starts_at_the_center() {
        for size in 3..12 {
            let board = Board::new(size);

            assert_eq!(board.player().position(), Position::new(size / 2, size / 2));
            assert_eq!(board.grid_char(size / 2, size / 2), 'P');
            assert!(board.visited().is_visited(Position::new(size / 2, size / 2)));
            assert_eq!(board.score(), 0);
            assert!(!board.is_game_over());
        }
    }

    #[test]
    fn when_creating_a_board_four_pursuers_sit_in_the_corners() {
        let board = Board::new(5);
        let corners: Vec<Position> = board.pursuers().iter().map(|p| p.position()).collect();

        assert_eq!(board.pursuers().len(), PURSUER_COUNT);
        assert_eq!(
            corners,
            vec![
                Position::new(0, 0),
                Position::new(0, 4),
                Position::new(4, 4),
                Position::new(4, 0),
            ]
        );
    }

    #[test]
    fn when_creating_a_board_only_the_center_is_visited() {
        let board = Board::new(5);

        assert_eq!(board.visited().unvisited_count(), 24);
        assert_eq!(
            rows(&board),
            vec!["G***G", "*****", "**P**", "*****", "G***G"]
        );
        assert_eq!(board.dots_remaining(), 20);
    }

    #[test]
    fn when_a_pursuer_is_tied_on_both_axes_it_moves_horizontally() {
        let mut board = Board::new(5);

        board.move_player(Direction::Stay);

        assert_eq!(board.pursuers()[0].position(), Position::new(0, 1));
        assert_eq!(board.pursuers()[1].position(), Position::new(0, 3));
        assert_eq!(board.pursuers()[2].position(), Position::new(4, 3));
        assert_eq!(board.pursuers()[3].position(), Position::new(4, 1));
        assert_eq!(board.score(), 0);
        assert_eq!(board.turn(), 1);
    }

    #[test]
    fn when_the_player_eats_a_fresh_dot_the_score_increases_by_ten() {
        let mut board = Board::new(5);

        board.move_player(Direction::Up);

        assert_eq!(board.player().position(), Position::new(1, 2));
        assert_eq!(board.score(), DOT_REWARD);
        assert!(board.visited().is_visited(Position::new(1, 2)));
    }

    #[test]
    fn when_the_player_returns_to_a_visited_cell_the_score_is_unchanged() {
        let mut board = Board::new(7);

        board.move_player(Direction::Down);
        board.move_player(Direction::Up);

        assert_eq!(board.player().position(), Position::new(3, 3));
        assert_eq!(board.score(), DOT_REWARD);
    }

    #[test]
    fn when_the_player_moves_off_the_board_it_stays_but_pursuers_still_move() {
        let mut board = board_from("5\n0\nP    \n     \n     \n     \n    G\n");

        assert!(!board.can_move(Direction::Up));
        board.move_player(Direction::Up);

        assert_eq!(board.player().position(), Position::new(0, 0));
        assert_eq!(board.score(), 0);
        // d_row = -4, d_col = -4: a tie moves horizontally
        assert_eq!(board.pursuers()[0].position(), Position::new(4, 3));
    }

    #[test]
    fn when_checking_if_the_player_can_move_nothing_is_changed() {
        let board = Board::new(3);
        let before = rows(&board);

        for direction in Direction::MOVES {
            assert!(board.can_move(direction));
        }
        assert!(board.can_move(Direction::Stay));

        assert_eq!(rows(&board), before);
        assert_eq!(board.score(), 0);
        assert_eq!(board.player().position(), Position::new(1, 1));
    }

    #[test]
    fn when_the_player_walks_onto_a_pursuer_the_game_is_over() {
        let mut board = board_from("3\n0\n GP\n   \n   \n");

        board.move_player(Direction::Left);

        assert!(board.is_game_over());
        assert_eq!(board.player().glyph(), 'X');
        assert_eq!(board.grid_char(0, 1), 'X');
        // The pursuer doesn't step away once the player is caught
        assert_eq!(board.pursuers()[0].position(), Position::new(0, 1));
    }

    #[test]
    fn when_a_pursuer_reaches_the_player_the_game_is_over() {
        let mut board = board_from("3\n0\nG  \n P \n   \n");

        board.move_player(Direction::Stay);
        assert!(!board.is_game_over());
        board.move_player(Direction::Stay);

        assert!(board.is_game_over());
        assert_eq!(board.grid_char(1, 1), 'X');
    }

    #[test]
    fn when_the_player_is_caught_later_pursuers_in_the_same_turn_stay_put() {
        let mut board = board_from("3\n0\n G \n P \n G \n");

        board.move_player(Direction::Stay);

        assert!(board.is_game_over());
        assert_eq!(board.pursuers()[0].position(), Position::new(1, 1));
        assert_eq!(board.pursuers()[1].position(), Position::new(2, 1));
    }

    #[test]
    fn when_the_game_is_over_it_stays_over() {
        let mut board = board_from("3\n0\n GP\n   \n   \n");
        board.move_player(Direction::Left);
        let score = board.score();

        for direction in Direction::MOVES {
            board.move_player(direction);
            assert!(board.is_game_over());
        }

        assert_eq!(board.score(), score);
        assert_eq!(board.player().glyph(), 'X');
    }

    #[test]
    fn when_a_tiny_board_starts_with_a_pursuer_on_the_player_the_game_is_over() {
        for size in [1, 2] {
            let board = Board::new(size);

            assert!(board.is_captured());
            assert!(board.is_game_over());
            assert_eq!(board.player().glyph(), 'X');
            assert_eq!(board.grid_char(size / 2, size / 2), 'X');
        }

        assert!(!Board::new(3).is_game_over());
    }

    #[test]
    fn when_restarting_a_fresh_board_of_the_same_size_replaces_the_old_one() {
        let mut board = board_from("3\n20\n GP\n   \n   \n");
        board.move_player(Direction::Left);
        assert!(board.is_game_over());

        board.restart();

        assert!(!board.is_game_over());
        assert_eq!(board.turn(), 1);
        assert_eq!(board.score(), 0);
        assert_eq!(board.grid_size(), 3);
        assert_eq!(board.player().position(), Position::new(1, 1));
        assert_eq!(board.pursuers().len(), PURSUER_COUNT);
        assert_eq!(rows(&board), vec!["G*G", "*P*", "G*G"]);
    }

    #[test]
    fn when_moving_many_times_the_score_never_decreases() {
        let mut board = Board::new(9);
        let mut last = board.score();
        let moves = [
            Direction::Left,
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Right,
            Direction::Down,
            Direction::Stay,
        ];

        for direction in moves.iter().cycle().take(40) {
            board.move_player(*direction);
            assert!(board.score() >= last);
            assert_eq!(board.score() % DOT_REWARD, 0);
            last = board.score();
        }
    }

    #[test]
    fn when_refreshing_the_grid_entities_cover_dots_and_eaten_cells_are_blank() {
        let mut board = Board::new(5);

        board.move_player(Direction::Left);

        assert_eq!(
            rows(&board),
            vec!["*G***", "****G", "*P **", "****G", "*G***"]
        );
    }

    #[test]
    fn when_accessing_grid_cells_outside_the_board_a_blank_is_returned() {
        let mut board = Board::new(3);

        board.set_grid_char(3, 0, 'Z');
        board.set_grid_char(0, 7, 'Z');

        assert_eq!(board.grid_char(3, 0), ' ');
        assert_eq!(board.grid_char(0, 7), ' ');
        assert_eq!(board.grid().count('Z'), 0);
    }

    #[test]
    fn when_setting_a_grid_char_it_shows_until_the_next_turn() {
        let mut board = Board::new(5);

        board.set_grid_char(1, 1, 'F');
        assert_eq!(board.grid_char(1, 1), 'F');

        board.move_player(Direction::Stay);
        assert_eq!(board.grid_char(1, 1), '*');
    }

    #[test]
    fn when_displaying_a_board_score_and_padded_rows_are_shown() {
        let board = Board::new(3);

        assert_eq!(
            board.to_string(),
            "Score: 0\n  G  *  G\n  *  P  *\n  G  *  G\n"
        );
    }

    #[test]
    fn when_loading_a_board_entities_and_visited_cells_are_restored() {
        let board = board_from("4\n30\nA* B\n P  \n****\nC**D\n");

        assert_eq!(board.grid_size(), 4);
        assert_eq!(board.score(), 30);
        assert_eq!(board.player().position(), Position::new(1, 1));
        assert_eq!(board.pursuers().len(), 4);
        assert_eq!(board.pursuers()[1].glyph(), 'B');
        assert!(board.visited().is_visited(Position::new(0, 2)));
        assert!(board.visited().is_visited(Position::new(1, 3)));
        assert!(!board.visited().is_visited(Position::new(2, 0)));
        assert!(!board.visited().is_visited(Position::new(0, 0)));
        assert_eq!(rows(&board), vec!["A* B", " P  ", "****", "C**D"]);
    }

    #[test]
    fn when_loading_a_board_any_number_of_pursuers_is_kept() {
        assert_eq!(board_from("3\n0\n***\n*P*\n***\n").pursuers().len(), 0);
        assert_eq!(board_from("3\n0\nGGG\nGPG\nGGG\n").pursuers().len(), 8);
    }

    #[test]
    fn when_loading_a_board_with_a_caught_player_the_game_is_over() {
        let mut board = board_from("3\n50\n   \n X \n   \n");

        assert!(board.is_game_over());
        assert_eq!(board.grid_char(1, 1), 'X');

        board.move_player(Direction::Up);
        assert_eq!(board.player().position(), Position::new(1, 1));
    }

    #[test]
    fn when_loading_a_board_without_a_player_a_format_error_is_returned() {
        let saved = SavedBoard::parse("3\n0\nG**\n***\n**G\n").unwrap();

        assert!(matches!(
            Board::from_saved(saved),
            Err(BoardError::Format { .. })
        ));
    }

    #[test]
    fn when_loading_a_bonus_glyph_it_is_treated_as_a_dot() {
        let board = board_from("3\n0\nF  \n P \n   \n");

        assert!(!board.visited().is_visited(Position::new(0, 0)));
        assert_eq!(board.grid_char(0, 0), '*');
    }

    #[test]
    fn when_loading_a_missing_file_an_io_error_is_returned() {
        let dir = tempfile::tempdir().unwrap();

        let result = Board::load(dir.path().join("missing.board"));

        assert!(matches!(result, Err(BoardError::Io(_))));
    }

    #[test]
    fn when_saving_to_an_unwritable_path_an_io_error_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let board = Board::new(3);

        let result = board.save(dir.path().join("missing").join("out.board"));

        assert!(matches!(result, Err(BoardError::Io(_))));
    }

    #[test]
    fn when_saving_and_loading_a_board_the_state_is_reproduced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chase.board");
        let mut board = Board::new(9);
        for direction in [Direction::Left, Direction::Up, Direction::Right] {
            board.move_player(direction);
        }

        board.save(&path).unwrap();
        let loaded = Board::load(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 11);
        assert_eq!(loaded.score(), 30);
        assert_eq!(loaded.grid_size(), board.grid_size());
        assert_eq!(loaded.score(), board.score());
        assert_eq!(rows(&loaded), rows(&board));
        assert_eq!(loaded.player().position(), board.player().position());
        assert_eq!(loaded.pursuers().len(), PURSUER_COUNT);
        assert!(!loaded.is_game_over());
    }

    #[test]
    fn when_recording_a_replay_every_turn_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");
        let mut board = Board::new(5).with_replay(Some(path.clone()));

        board.move_player(Direction::Up);
        board.move_player(Direction::Left);
        board.save_replay().unwrap();

        let replay: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let turns = replay["turns"].as_array().unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1]["score"], 10);
        assert_eq!(turns[1]["events"][0]["event_type"], "Move");
        assert_eq!(turns[1]["events"][1]["event_type"], "Consume");
    }

    #[test]
    fn when_getting_the_game_state_it_matches_the_board() {
        let mut board = Board::new(5);
        board.move_player(Direction::Right);

        let state = board.state();

        assert_eq!(state.turn, 1);
        assert_eq!(state.score, 10);
        assert_eq!(state.size, 5);
        assert_eq!(state.player, Position::new(2, 3));
        assert_eq!(state.pursuers.len(), 4);
        assert_eq!(state.dots_remaining, board.dots_remaining());
        assert!(!state.game_over);
    }
}
