//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
///
/// ### Rejections (nothing was written)
/// - [`ErrorKind::MissingField`]
/// - [`ErrorKind::MismatchedResource`]
/// - [`ErrorKind::InvalidLink`]
///
/// ### Storage Errors
/// - [`ErrorKind::Database`], [`ErrorKind::Migration`]
/// - [`ErrorKind::MissingAnalytics`], [`ErrorKind::InvalidData`]
/// - [`ErrorKind::Hashing`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A required field was absent or blank.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A video material without a URL, or a document material with one.
    #[display("material type '{_0}' does not match its file link")]
    MismatchedResource(#[error(not(source))] String),
    #[display("invalid video link: {_0}")]
    InvalidLink(#[error(not(source))] String),
    /// The analytics singleton row has gone missing.
    #[display("analytics counter row is missing")]
    MissingAnalytics,
    #[display("password hashing failed")]
    Hashing,
    /// Stored data could not be converted to or from its model.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // SQLITE_BUSY outlasting the busy timeout is the only transient failure.
        matches!(self, Self::Database)
    }

    /// Returns `true` if the input was rejected before anything was written.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::MismatchedResource(_) | Self::InvalidLink(_))
    }
}
