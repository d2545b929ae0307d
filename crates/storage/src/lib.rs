//! Blob storage for uploaded materials.
//!
//! The catalog never touches files itself: uploads are written through a
//! [`StorageBackend`] and only the resulting storage-relative path is handed
//! on to the catalog database.

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
