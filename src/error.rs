//! Failure taxonomy shared by the store, the services and the HTTP layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by repository and service operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed (e.g. `name`, `parentName`).
    #[error("{0}")]
    InvalidInput(String),

    /// Duplicate name on create, or more than one record where one was expected.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("store failure: {0}")]
    Store(#[from] rusqlite::Error),

    /// The store could not be opened; every operation fails until restart.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Coarse classification used when mapping errors onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Conflict,
    NotFound,
    Store,
    Unavailable,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Store,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Whether the message is safe to hand back to a client verbatim.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidInput | ErrorKind::Conflict | ErrorKind::NotFound
        )
    }
}
