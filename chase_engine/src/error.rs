use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("I/O Exception! {0}")]
    Io(#[from] io::Error),
    #[error("Malformed board file at line {line}: {reason}")]
    Format { line: usize, reason: String },
}

pub type Result<T> = core::result::Result<T, BoardError>;
