//! Console command parsing.
//!
//! A line whose first word is a command keyword is a command; anything else
//! is free text for the current step. Indices typed by the user are 1-based
//! and come out of the parser 0-based.

use thiserror::Error;

use crate::decision::EvaluationMode;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text: title, option, criterion or conversational message.
    Text(String),
    /// Forward transition.
    Next,
    /// Backward transition.
    Back,
    /// Start over.
    Reset,
    /// Redraw the current step.
    Show,
    /// Interpreter call statistics.
    Stats,
    /// Command reference.
    Help,
    /// Leave the program.
    Quit,
    /// Remove the entry at an index of the current list.
    Remove(usize),
    /// Add the displayed suggestion at an index.
    Pick(usize),
    /// Switch evaluation mode.
    Mode(EvaluationMode),
    /// Manual score entry.
    Score {
        /// Option index.
        option: usize,
        /// Criterion index.
        criterion: usize,
        /// Raw value; the ledger clamps it.
        value: i64,
    },
    /// Manual weight entry.
    Weight {
        /// Criterion index.
        criterion: usize,
        /// Raw value; the ledger clamps it.
        value: i64,
    },
}

/// Why a command line could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The line was blank.
    #[error("Type something, or 'help' for commands")]
    Empty,
    /// Wrong number of arguments.
    #[error("Usage: {usage}")]
    Usage {
        /// Expected form.
        usage: &'static str,
    },
    /// An argument was not a number.
    #[error("'{value}' is not a number")]
    NotANumber {
        /// The argument.
        value: String,
    },
    /// Positions start at 1.
    #[error("Positions start at 1")]
    ZeroIndex,
    /// Unknown evaluation mode.
    #[error("Unknown mode '{value}'; use 'manual' or 'chat'")]
    UnknownMode {
        /// The argument.
        value: String,
    },
}

impl Command {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for a blank line or a keyword command with
    /// malformed arguments.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = words.collect();

        let bare = match keyword.as_str() {
            "next" => Some(Self::Next),
            "back" => Some(Self::Back),
            "reset" => Some(Self::Reset),
            "show" => Some(Self::Show),
            "stats" => Some(Self::Stats),
            "help" | "?" => Some(Self::Help),
            "quit" | "exit" => Some(Self::Quit),
            _ => None,
        };
        if let Some(command) = bare {
            return Ok(if args.is_empty() {
                command
            } else {
                Self::Text(line.to_string())
            });
        }

        match keyword.as_str() {
            "remove" => match args.as_slice() {
                [n] => Ok(Self::Remove(position(n)?)),
                _ => Err(CommandError::Usage { usage: "remove <n>" }),
            },
            "pick" => match args.as_slice() {
                [n] => Ok(Self::Pick(position(n)?)),
                _ => Err(CommandError::Usage { usage: "pick <n>" }),
            },
            "mode" => match args.as_slice() {
                [m] => parse_mode(m).map(Self::Mode),
                _ => Err(CommandError::Usage {
                    usage: "mode manual|chat",
                }),
            },
            "score" => match args.as_slice() {
                [o, c, v] => Ok(Self::Score {
                    option: position(o)?,
                    criterion: position(c)?,
                    value: number(v)?,
                }),
                _ => Err(CommandError::Usage {
                    usage: "score <option> <criterion> <1-5>",
                }),
            },
            "weight" => match args.as_slice() {
                [c, v] => Ok(Self::Weight {
                    criterion: position(c)?,
                    value: number(v)?,
                }),
                _ => Err(CommandError::Usage {
                    usage: "weight <criterion> <1-5>",
                }),
            },
            _ => Ok(Self::Text(line.to_string())),
        }
    }
}

fn number(text: &str) -> Result<i64, CommandError> {
    text.parse().map_err(|_| CommandError::NotANumber {
        value: text.to_string(),
    })
}

fn position(text: &str) -> Result<usize, CommandError> {
    let n: usize = text.parse().map_err(|_| CommandError::NotANumber {
        value: text.to_string(),
    })?;
    n.checked_sub(1).ok_or(CommandError::ZeroIndex)
}

fn parse_mode(text: &str) -> Result<EvaluationMode, CommandError> {
    match text.to_lowercase().as_str() {
        "manual" => Ok(EvaluationMode::Manual),
        "chat" | "conversational" => Ok(EvaluationMode::Conversational),
        _ => Err(CommandError::UnknownMode {
            value: text.to_string(),
        }),
    }
}

/// Command reference.
#[must_use]
pub const fn help_text() -> &'static str {
    r"Commands:

  <text>                 Title, option, criterion or message, depending on the step
  next                   Continue to the next step
  back                   Return to the previous step
  remove N               Remove entry N from the current list
  pick N                 Add suggestion N to the current list
  mode manual|chat       Score with numbers or describe in your own words
  score O C V            Score option O on criterion C (1-5)
  weight C V             Weight criterion C (1-5)
  show                   Redraw the current step
  stats                  Interpreter call statistics
  reset                  Start a new decision
  help                   This text
  quit                   Leave
"
}
