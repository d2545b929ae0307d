//! Storage path validation.
//!
//! Every path handed to a backend is relative to that backend's root. Paths
//! are normalized here and anything that could escape the root is rejected.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a storage path.
///
/// `.` components, repeated separators and trailing slashes are dropped, and
/// `..` components are resolved as long as they never climb above the root.
/// Null bytes, Windows prefixes and paths that normalize to nothing are
/// rejected with [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shelf_storage::validate_path;
///
/// assert!(validate_path("1712000000000-ds-notes.pdf").is_ok());
/// assert!(validate_path("cse/s3/1712000000000-ds-notes.pdf").is_ok());
/// assert!(validate_path("cse/../notes.pdf").is_ok());
///
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("cse/../../notes.pdf").is_err());
/// assert!(validate_path("notes\0.pdf").is_err());
///
/// assert_eq!(
///     validate_path("/cse//./s3/../s4/notes.pdf/").unwrap(),
///     Path::new("cse/s4/notes.pdf")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) => {
                // Null bytes survive Path::components() on Unix but truncate
                // the path once it reaches a syscall.
                if segment.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
                components.push(segment);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
