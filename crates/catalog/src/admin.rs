//! Administrator credentials.
//!
//! Passwords are stored as Argon2id PHC strings (salt embedded) and are never
//! compared in plaintext. Hashing is deliberately slow, so it always runs on
//! the blocking thread pool.

use crate::Database;
use crate::error::{ErrorKind, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";

/// The administrator account created when a catalog is first initialized.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}
impl AdminSeed {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// Returns `true` if the seed still uses the well-known default password.
    pub fn is_builtin_default(&self) -> bool {
        self.password == DEFAULT_PASSWORD
    }
}
impl Default for AdminSeed {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}
// Keep passwords out of logs and panic messages.
impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed").field("username", &self.username).finish_non_exhaustive()
    }
}

fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt).or_raise(|| ErrorKind::Hashing)?;
    Ok(hash.to_string())
}

fn verify(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).or_raise(|| ErrorKind::InvalidData("password hash"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(err) => Err(err).or_raise(|| ErrorKind::Hashing),
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.or_raise(|| ErrorKind::Hashing)?
}

/// Credential store for the administrator role.
#[derive(Debug, Clone)]
pub struct Admins {
    pool: SqlitePool,
}
impl From<&Database> for Admins {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Admins {
    async fn stored_hash(&self, username: &str) -> Result<Option<String>> {
        sqlx::query_scalar(include_str!("../queries/get_admin_hash.sql"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable: both
    /// return `false`, and both pay for one Argon2 computation.
    #[instrument(skip(self, password))]
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let password = password.to_string();
        let Some(stored) = self.stored_hash(username).await? else {
            debug!("unknown administrator");
            blocking(move || hash(&password)).await?;
            return Ok(false);
        };
        blocking(move || verify(&password, &stored)).await
    }

    /// Replace the password of an existing administrator.
    ///
    /// Returns `false` if no administrator has that username.
    #[instrument(skip(self, new_password))]
    pub async fn set_password(&self, username: &str, new_password: &str) -> Result<bool> {
        let new_password = new_password.to_string();
        let hashed = blocking(move || hash(&new_password)).await?;
        let result = sqlx::query(include_str!("../queries/update_admin_password.sql"))
            .bind(username)
            .bind(hashed)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let updated = result.rows_affected() > 0;
        if updated {
            info!("administrator password changed");
        }
        Ok(updated)
    }

    /// Create the seed administrator if no administrator exists yet.
    ///
    /// Returns `true` if an account was created. Two cold starts racing each
    /// other can both see an empty table; the unique username makes the loser
    /// a no-op.
    #[instrument(skip(self, seed), fields(username = %seed.username))]
    pub async fn ensure_seeded(&self, seed: &AdminSeed) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_admins.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if count > 0 {
            return Ok(false);
        }
        let password = seed.password.clone();
        let hashed = blocking(move || hash(&password)).await?;
        let result = sqlx::query(include_str!("../queries/insert_admin.sql"))
            .bind(&seed.username)
            .bind(hashed)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let seeded = result.rows_affected() > 0;
        if seeded {
            info!("seeded administrator account");
            if seed.is_builtin_default() {
                warn!("administrator is using the built-in default password; change it with `shelf passwd`");
            }
        }
        Ok(seeded)
    }
}
