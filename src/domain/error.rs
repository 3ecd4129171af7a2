use std::fmt::Display;

use crate::domain::PollerId;

/// Misuse of the poller or manager API. Always returned synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `position` is the 1-based index of the offending argument.
    InvalidArgument { position: u8, message: String },
    InvalidState(String),
    DuplicateId(PollerId),
}
impl Error {
    pub(crate) fn invalid_argument(position: u8, e: impl Display) -> Self {
        Error::InvalidArgument {
            position,
            message: e.to_string(),
        }
    }
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidArgument { position, message } => {
                f.write_fmt(format_args!("invalid argument #{position}: {message}"))
            }
            Error::InvalidState(message) => f.write_fmt(format_args!("invalid state: {message}")),
            Error::DuplicateId(id) => {
                f.write_fmt(format_args!("a poller with id '{id}' already exists"))
            }
        }
    }
}
impl std::error::Error for Error {}
