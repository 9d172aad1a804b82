//! Errors raised by the posts service.

use thiserror::Error;

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Failure of a posts service operation.
///
/// Display strings are part of the HTTP contract: controllers send them
/// verbatim as the `message` of a 400 response.
#[derive(Error, Debug)]
pub enum PostError {
    #[error("title has to be a non-empty string of 255 characters or less")]
    InvalidTitle,

    /// No post with the requested id, or no posts at all.
    #[error("no post found with provided id")]
    NotFound,

    #[error("post id already exists")]
    Duplicate,

    /// Any other storage failure, message passed through unchanged.
    #[error("{0}")]
    Storage(#[from] sqlx::Error),

    /// A storage handle was missing when the service was constructed.
    #[error("db connection is nil")]
    MissingStorage,
}

/// Tag for branching on a [`PostError`] without matching its payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    Storage,
    Construction,
}

impl PostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTitle => ErrorKind::Validation,
            Self::NotFound => ErrorKind::NotFound,
            Self::Duplicate => ErrorKind::Duplicate,
            Self::Storage(_) => ErrorKind::Storage,
            Self::MissingStorage => ErrorKind::Construction,
        }
    }
}
