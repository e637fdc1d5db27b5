use crate::entities::Position;
use crate::error::Result;
use serde::Serialize;
use serde_json::json;
use std::{collections::HashMap, fs::File, io::BufWriter, path::PathBuf};

pub fn create_replay_logger(
    filename: Option<PathBuf>,
    size: usize,
    board_contents: String,
) -> Box<dyn ReplayLogger> {
    match filename {
        None => Box::new(NoOpReplayLogger {}),
        Some(filename) => Box::new(JsonReplayLogger::new(filename, size, board_contents)),
    }
}

pub trait ReplayLogger {
    #[allow(unused_variables)]
    fn log_turn(&mut self, turn: usize, score: usize, player: Position, pursuers: Vec<Position>) {}

    #[allow(unused_variables)]
    fn log_end_game(&mut self, reason: String) {}

    #[allow(unused_variables)]
    fn log_event(&mut self, turn: usize, event: Event) {}

    fn save(&self) -> Result<()> {
        Ok(())
    }

    fn log_move(
        &mut self,
        turn: usize,
        entity: &str,
        id: &str,
        location: Position,
        destination: Position,
    ) {
        self.log_event(
            turn,
            Event {
                event_type: EventType::Move,
                entity: entity.to_string(),
                entity_id: Some(id.to_string()),
                location,
                destination: Some(destination),
            },
        );
    }

    fn log_consume(&mut self, turn: usize, location: Position) {
        self.log_event(
            turn,
            Event {
                event_type: EventType::Consume,
                entity: "Dot".to_string(),
                entity_id: None,
                location,
                destination: None,
            },
        );
    }

    fn log_capture(&mut self, turn: usize, id: &str, location: Position) {
        self.log_event(
            turn,
            Event {
                event_type: EventType::Capture,
                entity: "Player".to_string(),
                entity_id: Some(id.to_string()),
                location,
                destination: None,
            },
        );
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EventType {
    Move,
    Consume,
    Capture,
}

#[derive(Debug, Serialize)]
pub struct Event {
    event_type: EventType,
    entity: String,
    entity_id: Option<String>,
    location: Position,
    destination: Option<Position>,
}

struct Turn {
    turn: usize,
    score: usize,
    player: Position,
    pursuers: Vec<Position>,
}

struct NoOpReplayLogger;
impl ReplayLogger for NoOpReplayLogger {}

struct JsonReplayLogger {
    filename: PathBuf,
    size: usize,
    board_contents: String,
    turns: Vec<Turn>,
    events: HashMap<usize, Vec<Event>>,
    finished_reason: Option<String>,
}

impl JsonReplayLogger {
    fn new(filename: PathBuf, size: usize, board_contents: String) -> JsonReplayLogger {
        JsonReplayLogger {
            filename,
            size,
            board_contents,
            turns: Vec::new(),
            events: HashMap::new(),
            finished_reason: None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let turns: Vec<_> = self
            .turns
            .iter()
            .map(|turn| {
                json!({
                    "turn": turn.turn,
                    "score": turn.score,
                    "player": turn.player,
                    "pursuers": turn.pursuers,
                    "events": self.events.get(&turn.turn).unwrap_or(&Vec::new()),
                })
            })
            .collect();

        json!({
            "board": {
                "size": self.size,
                "contents": self.board_contents,
            },
            "turns": turns,
            "finished_reason": self.finished_reason,
        })
    }
}

impl ReplayLogger for JsonReplayLogger {
    fn log_turn(&mut self, turn: usize, score: usize, player: Position, pursuers: Vec<Position>) {
        self.turns.push(Turn {
            turn,
            score,
            player,
            pursuers,
        });
    }

    fn log_end_game(&mut self, reason: String) {
        self.finished_reason = Some(reason);
    }

    fn log_event(&mut self, turn: usize, event: Event) {
        self.events.entry(turn).or_default().push(event);
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.filename)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_json()).map_err(std::io::Error::from)?;
        tracing::info!("Replay saved to {}", self.filename.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn when_no_filename_is_given_saving_does_nothing() {
        let mut logger = create_replay_logger(None, 3, String::new());
        logger.log_turn(0, 0, Position::new(1, 1), vec![]);

        assert!(logger.save().is_ok());
    }

    #[test]
    fn when_saving_a_json_replay_turns_and_events_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");
        let mut logger = create_replay_logger(Some(path.clone()), 3, "3\n0\n".to_string());

        logger.log_turn(0, 0, Position::new(1, 1), vec![Position::new(0, 0)]);
        logger.log_move(1, "Player", "p-1", Position::new(1, 1), Position::new(0, 1));
        logger.log_consume(1, Position::new(0, 1));
        logger.log_move(1, "Pursuer", "g-1", Position::new(0, 0), Position::new(0, 1));
        logger.log_capture(1, "p-1", Position::new(0, 1));
        logger.log_turn(1, 10, Position::new(0, 1), vec![Position::new(0, 1)]);
        logger.log_end_game("Caught".to_string());
        logger.save().unwrap();

        let replay: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(replay["board"]["size"], 3);
        assert_eq!(replay["finished_reason"], "Caught");
        assert_eq!(replay["turns"].as_array().unwrap().len(), 2);
        assert_eq!(replay["turns"][0]["events"].as_array().unwrap().len(), 0);

        let events = replay["turns"][1]["events"].as_array().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0]["event_type"], "Move");
        assert_eq!(events[0]["entity_id"], "p-1");
        assert_eq!(events[1]["event_type"], "Consume");
        assert_eq!(events[3]["event_type"], "Capture");
        assert_eq!(replay["turns"][1]["player"]["row"], 0);
        assert_eq!(replay["turns"][1]["score"], 10);
    }

    #[test]
    fn when_saving_to_an_unwritable_path_an_io_error_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("replay.json");
        let logger = create_replay_logger(Some(path), 3, String::new());

        assert!(matches!(logger.save(), Err(crate::BoardError::Io(_))));
    }
}
