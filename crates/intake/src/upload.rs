//! Turning a submission into a catalogued material.

use crate::error::{ErrorKind, Result};
use crate::template::{PathGenerator, UploadContext};
use exn::ResultExt;
use shelf_catalog::{MaterialDetails, MaterialId, NewMaterial, Repository, Resource};
use shelf_storage::BackendHandle;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

/// Attempts at finding a free storage path before giving up.
const MAX_ATTEMPTS: usize = 100;

/// What an administrator submitted alongside the material's metadata.
#[derive(Clone, PartialEq, Eq)]
pub enum Submission {
    /// An uploaded file, stored under the upload root.
    Document { filename: String, data: Vec<u8> },
    /// A link to a video hosted elsewhere. Nothing is stored.
    Video { url: String },
}
impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document { filename, data } => {
                f.debug_struct("Document").field("filename", filename).field("len", &data.len()).finish()
            },
            Self::Video { url } => f.debug_struct("Video").field("url", url).finish(),
        }
    }
}

/// A successfully catalogued submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub id: MaterialId,
    /// Where the material lives: the storage-relative path of the stored
    /// document, or the video URL.
    pub resource: Resource,
}

/// Accepts submissions, stores their files and records them in the catalog.
///
/// The catalog only ever sees the final storage path (or the video URL), never
/// the uploaded bytes.
pub struct Intake {
    backend: BackendHandle,
    repo: Repository,
    paths: PathGenerator,
}
impl Intake {
    pub fn new(backend: BackendHandle, repo: Repository, paths: PathGenerator) -> Self {
        Self { backend, repo, paths }
    }

    /// Validate a submission, store its file (if any) and create the material.
    ///
    /// Everything that can be checked up front is checked before the first
    /// write. If the catalog insert still fails after the file was stored, the
    /// file is removed again on a best-effort basis.
    #[instrument(skip_all, fields(title = %details.title, backend = self.backend.name()))]
    pub async fn submit(&self, details: MaterialDetails, submission: Submission) -> Result<Upload> {
        details.validate().or_raise(|| ErrorKind::Rejected)?;
        match submission {
            Submission::Video { url } => {
                let url = url.trim();
                if url.is_empty() {
                    exn::bail!(ErrorKind::MissingField("video_url"));
                }
                let material = NewMaterial::new(details, Resource::Video(url.to_string()));
                let id = self.record(&material).await?;
                info!(id, url, "catalogued video");
                Ok(Upload { id, resource: material.resource })
            },
            Submission::Document { filename, data } => {
                if filename.trim().is_empty() {
                    exn::bail!(ErrorKind::MissingField("filename"));
                }
                if data.is_empty() {
                    exn::bail!(ErrorKind::MissingField("file"));
                }
                // Catch a type/resource mismatch before the file hits the disk.
                NewMaterial::new(details.clone(), Resource::Document(filename.clone()))
                    .validate()
                    .or_raise(|| ErrorKind::Rejected)?;

                let context = UploadContext {
                    timestamp: OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000,
                    filename,
                    department: details.department.clone(),
                    semester: details.semester.clone(),
                    scheme: details.scheme.clone(),
                    subject: details.subject.clone(),
                    material_type: details.material_type.to_string(),
                };
                let path = self.free_path(&context).await?;
                self.backend.write(Path::new(&path), &data).await.or_raise(|| ErrorKind::Storage)?;
                debug!(path = %path, size = data.len(), "stored upload");

                let material = NewMaterial::new(details, Resource::Document(path));
                match self.record(&material).await {
                    Ok(id) => {
                        info!(id, path = material.resource.link(), size = data.len(), "catalogued document");
                        Ok(Upload { id, resource: material.resource })
                    },
                    Err(err) => {
                        let path = Path::new(material.resource.link());
                        if let Err(cleanup) = self.backend.delete(path).await {
                            warn!(path = %path.display(), error = ?cleanup, "could not remove orphaned upload");
                        }
                        Err(err)
                    },
                }
            },
        }
    }

    async fn record(&self, material: &NewMaterial) -> Result<MaterialId> {
        self.repo.create(material).await.map_err(|err| {
            let kind = match err.is_rejection() {
                true => ErrorKind::Rejected,
                false => ErrorKind::Catalog,
            };
            err.raise(kind)
        })
    }

    /// Render the storage path for an upload, adding a numeric suffix if the
    /// rendered path is already taken.
    async fn free_path(&self, context: &UploadContext) -> Result<String> {
        let path = self.paths.generate(context)?;
        for attempt in 0..MAX_ATTEMPTS {
            let candidate = with_suffix(&path, attempt);
            if !self.backend.exists(Path::new(&candidate)).await.or_raise(|| ErrorKind::Storage)? {
                return Ok(candidate);
            }
        }
        exn::bail!(ErrorKind::PathConflict(path))
    }
}

/// `notes.pdf` becomes `notes-1.pdf`, `notes-2.pdf`, and so on.
fn with_suffix(path: &str, attempt: usize) -> String {
    if attempt == 0 {
        return path.to_string();
    }
    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };
    let file = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{attempt}.{ext}"),
        _ => format!("{file}-{attempt}"),
    };
    match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    }
}
