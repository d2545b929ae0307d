//! Layered configuration for shelf.
//!
//! Values are merged from, in increasing order of precedence:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. The user config file, `config.toml` in the platform config directory
//!    (e.g. `~/.config/shelf/config.toml` on Linux), if it exists.
//! 3. An explicitly requested config file (`--config`). TOML, YAML and JSON
//!    are supported, chosen by file extension.
//! 4. Environment variables prefixed with `SHELF_`, using `__` to separate
//!    nested keys: `SHELF_ADMIN__PASSWORD` sets `admin.password`.
//!
//! ```toml
//! [database]
//! path = "/var/lib/shelf/materials.db"
//!
//! [uploads]
//! root = "/var/lib/shelf/uploads"
//! template = "{{ department|slug }}/{{ timestamp }}-{{ name|slug }}{{ ext }}"
//!
//! [admin]
//! username = "admin"
//! password = "change me"
//!
//! [log]
//! level = "info"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use shelf_catalog::AdminSeed;
use shelf_intake::DEFAULT_TEMPLATE;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "SHELF_";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "shelf")
}

fn data_dir() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        // No home directory: fall back to the working directory.
        None => std::env::current_dir().unwrap_or_default().join(".shelf"),
    }
}

/// Location of the user config file, whether or not it exists.
pub fn user_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub uploads: UploadsConfig,
    pub admin: AdminConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file, created on first use.
    pub path: PathBuf,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: data_dir().join("materials.db") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Absolute directory uploaded documents are stored under.
    pub root: PathBuf,
    /// Path template for stored documents, relative to `root`.
    pub template: String,
}
impl Default for UploadsConfig {
    fn default() -> Self {
        Self { root: data_dir().join("uploads"), template: DEFAULT_TEMPLATE.to_string() }
    }
}

/// Credentials for the administrator created when the catalog is first
/// initialized. Changing them later has no effect on an existing catalog.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}
impl Default for AdminConfig {
    fn default() -> Self {
        let AdminSeed { username, password } = AdminSeed::default();
        Self { username, password }
    }
}
impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig").field("username", &self.username).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is not set.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Load configuration from every layer and validate it.
    ///
    /// `explicit` is a config file requested by the user; unlike the user
    /// config file it must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(user_config_file().as_deref(), explicit)?)
    }

    /// Build the layered [`Figment`] without extracting it.
    pub fn figment(user_file: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        Ok(Self::file_figment(user_file, explicit)?.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Defaults and config files only.
    fn file_figment(user_file: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = user_file {
            debug!(path = %path.display(), exists = path.is_file(), "user config file");
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment)
    }

    /// Extract and validate a configuration from an arbitrary [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Extract)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, at a less helpful point.
    pub fn validate(&self) -> Result<()> {
        if self.admin.username.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("admin.username must not be empty"));
        }
        if self.admin.password.is_empty() {
            exn::bail!(ErrorKind::Invalid("admin.password must not be empty"));
        }
        if self.uploads.template.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("uploads.template must not be empty"));
        }
        if !self.uploads.root.is_absolute() {
            exn::bail!(ErrorKind::Invalid("uploads.root must be an absolute path"));
        }
        if self.database.path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database.path must not be empty"));
        }
        Ok(())
    }
}
