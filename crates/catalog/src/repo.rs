//! Queries and mutations over the materials table and the analytics counter.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Analytics, AnalyticsRow, Filters, Material, MaterialId, MaterialRow, NewMaterial};
use exn::{OptionExt, ResultExt};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{debug, instrument};

/// Repository for materials and site analytics.
///
/// Every operation is a single statement (or a single read), so concurrent
/// callers never see partial updates:
///
/// - Counters are bumped with `count = count + 1` in SQL, never read-modify-write
///   in Rust, so N concurrent increments always add exactly N.
/// - `total_uploads` is counted when analytics are read, never stored.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    // =========================================================================
    // Insert
    // =========================================================================

    /// Validate and insert a new material, returning its assigned id.
    ///
    /// Counters start at zero and `created_at` is set to now. Invalid input is
    /// rejected before anything is written; identical submissions are not
    /// deduplicated.
    #[instrument(skip(self, material), fields(title = %material.details.title))]
    pub async fn create(&self, material: &NewMaterial) -> Result<MaterialId> {
        material.validate()?;
        let details = &material.details;
        let result = sqlx::query(include_str!("../queries/insert_material.sql"))
            .bind(&details.title)
            .bind(details.description())
            .bind(&details.department)
            .bind(&details.semester)
            .bind(&details.scheme)
            .bind(&details.subject)
            .bind(details.material_type.as_str())
            .bind(material.resource.link())
            .bind(&details.contributor.name)
            .bind(&details.contributor.batch)
            .bind(&details.contributor.year)
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(result.last_insert_rowid()).or_raise(|| ErrorKind::InvalidData("material id"))
    }

    // =========================================================================
    // Get/Search
    // =========================================================================

    /// Find every material matching all of the active filters, newest first.
    ///
    /// Results are not paginated: an empty filter set returns the whole table.
    #[instrument(skip(self))]
    pub async fn search(&self, filters: &Filters) -> Result<Vec<Material>> {
        let rows: Vec<MaterialRow> = sqlx::query_as(include_str!("../queries/search_materials.sql"))
            .bind(Filters::active(&filters.department))
            .bind(Filters::active(&filters.semester))
            .bind(Filters::active(&filters.scheme))
            .bind(Filters::active(&filters.subject))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        debug!(count = rows.len(), "search complete");
        rows.into_iter().map(Material::try_from).collect()
    }

    /// Get a single material by id.
    pub async fn get(&self, id: MaterialId) -> Result<Option<Material>> {
        // Ids past i64::MAX can never have been assigned by SQLite.
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        let row: Option<MaterialRow> = sqlx::query_as(include_str!("../queries/get_material.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Material::try_from).transpose()
    }

    // =========================================================================
    // Counters
    // =========================================================================

    async fn increment(&self, query: &'static str, id: MaterialId) -> Result<bool> {
        let found = match i64::try_from(id) {
            Ok(row_id) => {
                let result = sqlx::query(query)
                    .bind(row_id)
                    .execute(&self.pool)
                    .await
                    .or_raise(|| ErrorKind::Database)?;
                result.rows_affected() > 0
            },
            Err(_) => false,
        };
        if !found {
            debug!(id, "no material to increment");
        }
        Ok(found)
    }

    /// Add one to a material's view count.
    ///
    /// Returns `false` (and changes nothing) if no material has that id.
    #[instrument(skip(self))]
    pub async fn increment_views(&self, id: MaterialId) -> Result<bool> {
        self.increment(include_str!("../queries/increment_views.sql"), id).await
    }

    /// Add one to a material's download count.
    ///
    /// Returns `false` (and changes nothing) if no material has that id.
    #[instrument(skip(self))]
    pub async fn increment_downloads(&self, id: MaterialId) -> Result<bool> {
        self.increment(include_str!("../queries/increment_downloads.sql"), id).await
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Count one site visit.
    #[instrument(skip(self))]
    pub async fn record_visit(&self) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/record_visit.sql"))
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::MissingAnalytics);
        }
        Ok(())
    }

    /// Read the visit counter alongside a live count of materials.
    #[instrument(skip(self))]
    pub async fn analytics(&self) -> Result<Analytics> {
        let row: Option<AnalyticsRow> = sqlx::query_as(include_str!("../queries/get_analytics.sql"))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.ok_or_raise(|| ErrorKind::MissingAnalytics)?.try_into()
    }
}
