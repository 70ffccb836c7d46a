//! Error types for the tickstore crate.
//!
//! The root [`Error`] is storage-agnostic; Diesel and r2d2 errors are folded
//! into [`DatabaseError`] via the [`IntoDomain`] extension trait so that
//! repositories never leak backend types to callers.

use chrono::ParseError as ChronoParseError;
use diesel::result::Error as DieselError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the store and feed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Database-agnostic error type for storage operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

/// Errors raised by the resampling feed and its cursor.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Cursor advanced past the end of the feed (count = {count})")]
    CursorOutOfRange { count: usize },

    #[error("Feed interval must be >= 1, got {0}")]
    InvalidInterval(i64),

    #[error("Unknown time zone '{0}' on exchange {1}")]
    UnknownTimeZone(String, String),
}

// === From implementations for common error types ===

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

fn map_diesel(err: DieselError) -> Error {
    match err {
        DieselError::NotFound => {
            Error::Database(DatabaseError::NotFound("Record not found".to_string()))
        }
        DieselError::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, info) => {
            Error::Database(DatabaseError::UniqueViolation(info.message().to_string()))
        }
        DieselError::DatabaseError(
            diesel::result::DatabaseErrorKind::ForeignKeyViolation,
            info,
        ) => Error::Database(DatabaseError::ForeignKeyViolation(info.message().to_string())),
        other => Error::Database(DatabaseError::QueryFailed(other.to_string())),
    }
}

impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        map_diesel(err)
    }
}

/// Extension trait for converting backend Results to domain Results.
///
/// Repositories call `.into_domain()` on Diesel/r2d2 results instead of
/// spelling the conversion out at every call site.
pub trait IntoDomain<T> {
    fn into_domain(self) -> Result<T>;
}

impl<T> IntoDomain<T> for std::result::Result<T, DieselError> {
    fn into_domain(self) -> Result<T> {
        self.map_err(map_diesel)
    }
}

impl<T> IntoDomain<T> for std::result::Result<T, r2d2::Error> {
    fn into_domain(self) -> Result<T> {
        self.map_err(|e| Error::Database(DatabaseError::PoolCreationFailed(e.to_string())))
    }
}

impl<T> IntoDomain<T> for std::result::Result<T, diesel::ConnectionError> {
    fn into_domain(self) -> Result<T> {
        self.map_err(|e| Error::Database(DatabaseError::ConnectionFailed(e.to_string())))
    }
}
