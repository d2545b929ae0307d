//! Intake Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An intake error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The submission is incomplete. Nothing was written.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// The catalog refused the material metadata. Nothing was written.
    #[display("material rejected")]
    Rejected,
    #[display("issue with path generation from template")]
    Template,
    /// Every candidate path for the upload is already taken.
    #[display("no free storage path for {_0}")]
    PathConflict(#[error(not(source))] String),
    #[display("could not store uploaded file")]
    Storage,
    #[display("could not record material in catalog")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Catalog)
    }

    /// Returns `true` if the submission itself was at fault and nothing was written.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::Rejected)
    }
}
