//! Upload intake for the materials catalog.
//!
//! An administrator's submission arrives as metadata plus either a file or a
//! video URL. Files are written to blob storage under a path rendered from a
//! configurable template; only the resulting storage-relative path (or the
//! video URL) is recorded in the catalog.

pub mod error;
mod template;
mod upload;

pub use crate::template::{DEFAULT_TEMPLATE, PathGenerator, UploadContext};
pub use crate::upload::{Intake, Submission, Upload};
