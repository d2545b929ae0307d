use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use time::OffsetDateTime;

/// Site-wide counters for the admin dashboard.
///
/// `total_visits` is stored; `total_uploads` is counted from the materials
/// table on every read and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Analytics {
    pub total_visits: u64,
    pub total_uploads: u64,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub last_updated: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct AnalyticsRow {
    pub(crate) total_visits: i64,
    pub(crate) total_uploads: i64,
    pub(crate) last_updated: i64,
}
impl TryFrom<AnalyticsRow> for Analytics {
    type Error = Error;
    fn try_from(row: AnalyticsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            total_visits: u64::try_from(row.total_visits).or_raise(|| ErrorKind::InvalidData("total visits"))?,
            total_uploads: u64::try_from(row.total_uploads).or_raise(|| ErrorKind::InvalidData("total uploads"))?,
            last_updated: OffsetDateTime::from_unix_timestamp(row.last_updated)
                .or_raise(|| ErrorKind::InvalidData("last updated date"))?,
        })
    }
}
