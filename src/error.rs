//! Unified error type.

use thiserror::Error;

use crate::posts::PostError;

/// The error type returned by quill's startup and serving paths.
///
/// Request-level failures (bad input, missing posts, duplicate ids) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces infrastructure failures: reading configuration, opening
/// the database, migrating it, binding a port.
#[derive(Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The posts service could not be constructed.
    #[error(transparent)]
    Posts(#[from] PostError),
}

/// Result type alias for quill's fallible infrastructure operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "io: port taken");
    }

    #[test]
    fn config_error_display() {
        let err = Error::Config("no table named `staging`".to_string());
        assert_eq!(err.to_string(), "configuration error: no table named `staging`");
    }

    #[test]
    fn posts_error_is_transparent() {
        let err: Error = PostError::MissingStorage.into();
        assert_eq!(err.to_string(), "db connection is nil");
    }
}
