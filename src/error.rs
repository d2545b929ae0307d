//! Binary Error Types
//!
//! Every library error is wrapped into one of these kinds, which decide the
//! message shown to the user and the process exit code.

use derive_more::{Display, Error};
use shelf_catalog::MaterialId;
use std::process::ExitCode;

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("catalog unavailable")]
    Catalog,
    #[display("upload failed")]
    Intake,
    /// The submitted material was incomplete or inconsistent; nothing was stored.
    #[display("upload rejected")]
    Rejected,
    #[display("file storage unavailable")]
    Storage,
    /// Missing or wrong administrator credentials.
    #[display("invalid administrator credentials")]
    Unauthorized,
    #[display("material not found: {_0}")]
    NotFound(#[error(not(source))] MaterialId),
    #[display("invalid argument: {_0}")]
    Usage(#[error(not(source))] &'static str),
    /// Reading a local file or writing output failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Unauthorized => ExitCode::from(1),
            Self::NotFound(_) => ExitCode::from(4),
            Self::Usage(_) => ExitCode::from(2),
            Self::Rejected => ExitCode::from(65),
            Self::Config => ExitCode::from(78),
            Self::Catalog | Self::Intake | Self::Storage | Self::Io => ExitCode::from(70),
        }
    }
}
