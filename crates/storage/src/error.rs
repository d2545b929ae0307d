//! Errors raised while storing or fetching uploaded files.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No upload is stored at this path.
    #[display("no stored upload at {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The upload root (or something under it) is not accessible to us.
    #[display("access to {} denied", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    #[display("upload store I/O failed: {_0}")]
    Io(std::io::Error),
    /// Rejected before touching the store: absolute, empty, or escaping the
    /// upload root.
    #[display("unusable upload path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// The store is up but refused the operation.
    #[display("upload store unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),
}

impl ErrorKind {
    /// Transient failures; the same upload may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Unavailable(_))
    }
}
