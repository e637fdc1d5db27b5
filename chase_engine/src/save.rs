//! The plain text board file.
//!
//! ```text
//! <size>
//! <score>
//! <row 0>
//! ...
//! <row size-1>
//! ```
//!
//! Every row holds exactly `size` glyphs when written. When read, short rows
//! are padded with dots and long rows are cut.

use crate::error::{BoardError, Result};
use crate::map::DOT_GLYPH;
use regex::Regex;
use std::fmt;

/// The largest board a file may describe.
pub const MAX_SIZE: usize = 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct SavedBoard {
    pub size: usize,
    pub score: usize,
    pub rows: Vec<Vec<char>>,
}

impl SavedBoard {
    pub fn parse(contents: &str) -> Result<SavedBoard> {
        let header = Regex::new(r"^\s*(\d+)\s*$").map_err(|e| BoardError::Format {
            line: 1,
            reason: e.to_string(),
        })?;

        let mut lines = contents.lines();
        let size = parse_header(&header, lines.next(), 1, "size")?;
        if size > MAX_SIZE {
            return Err(BoardError::Format {
                line: 1,
                reason: format!("size {size} is larger than {MAX_SIZE}"),
            });
        }
        let score = parse_header(&header, lines.next(), 2, "score")?;

        let rows = (0..size)
            .map(|_| {
                let line = lines.next().unwrap_or_default();
                let mut row: Vec<char> = line
                    .trim_end_matches('\r')
                    .chars()
                    .take(size)
                    .collect();
                row.resize(size, DOT_GLYPH);
                row
            })
            .collect();

        Ok(SavedBoard { size, score, rows })
    }
}

impl fmt::Display for SavedBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.size)?;
        writeln!(f, "{}", self.score)?;
        for row in &self.rows {
            let line: String = row.iter().collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn parse_header(header: &Regex, line: Option<&str>, number: usize, field: &str) -> Result<usize> {
    let line = line.ok_or_else(|| BoardError::Format {
        line: number,
        reason: format!("missing {field}"),
    })?;

    header
        .captures(line)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse().ok())
        .ok_or_else(|| BoardError::Format {
            line: number,
            reason: format!("expected a non-negative integer {field}, found {line:?}"),
        })
}
