mod analytics;
mod filters;
mod material;
mod row;

pub use self::analytics::Analytics;
pub(crate) use self::analytics::AnalyticsRow;
pub use self::filters::Filters;
pub use self::material::{Contributor, Material, MaterialDetails, MaterialId, MaterialType, NewMaterial, Resource};
pub(crate) use self::row::MaterialRow;
#[cfg(test)]
pub(crate) use self::material::tests::ds_notes;

/// Lowercase and strip everything but ASCII alphanumerics, so that
/// `"Question Paper"`, `"question-paper"` and `"QUESTIONPAPER"` compare equal.
fn sanitize(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_lowercase()).collect()
}
