//! Parsing what the player types.

use boardcast::prelude::Coord;

/// Typed while a prompt is open to dismiss it instead of answering.
pub const CANCEL: &str = "!cancel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Click(Coord),
    Quit,
    Help,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("click" | "c") => {
            let mut number = |name: &str| -> Result<usize, String> {
                let word = words.next().ok_or_else(|| format!("missing {name}"))?;
                word.parse().map_err(|_| format!("{name} must be a number, got {word:?}"))
            };
            let row = number("row")?;
            let col = number("col")?;
            Ok(Command::Click(Coord::new(row, col)))
        }
        Some("quit" | "q" | "exit") => Ok(Command::Quit),
        Some("help" | "?") => Ok(Command::Help),
        Some(other) => Err(format!("unknown command {other:?}, try `help`")),
        None => Err("empty command".to_string()),
    }
}

/// What to send back for a line typed while a prompt is open.
pub fn answer(line: &str) -> Option<String> {
    if line.trim() == CANCEL {
        None
    } else {
        Some(line.to_string())
    }
}

pub const HELP: &str = "\
commands:
  click <row> <col>   click a cell (rows and columns count from 0)
  quit                leave the game
while the server is asking a question, the next line is the answer;
type !cancel to dismiss it";
