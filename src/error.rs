use crate::date::DateKey;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Syntax error at position {pos}: {message}")]
    Syntax { message: String, pos: usize },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("No entries on or before {date}")]
    NotFound { date: DateKey },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    InvalidDate,
    NotFound,
    UnknownCommand,
    Io,
    Render,
}

impl Error {
    pub fn syntax(message: impl Into<String>, pos: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            pos,
        }
    }

    /// Moves a syntax error's position `by` bytes to the right, for text
    /// that was parsed out of a longer line.
    pub fn offset_by(self, by: usize) -> Self {
        match self {
            Error::Syntax { message, pos } => Error::Syntax {
                message,
                pos: pos + by,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::InvalidDate(_) => ErrorKind::InvalidDate,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::UnknownCommand(_) => ErrorKind::UnknownCommand,
            Error::Io(_) => ErrorKind::Io,
            Error::Render(_) => ErrorKind::Render,
        }
    }
}
