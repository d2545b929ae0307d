/// Exact-match search filters.
///
/// Every field that is set must match; unset fields impose no constraint.
/// Blank values count as unset. An empty filter set matches every material:
/// whether to allow that is the caller's decision, not the catalog's.
///
/// ```
/// use shelf_catalog::Filters;
///
/// let filters = Filters::default().department("CSE").semester("S3");
/// assert!(!filters.is_empty());
/// assert!(Filters::default().subject("").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub department: Option<String>,
    pub semester: Option<String>,
    pub scheme: Option<String>,
    pub subject: Option<String>,
}
impl Filters {
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Returns `true` if no filter would constrain the search.
    pub fn is_empty(&self) -> bool {
        [&self.department, &self.semester, &self.scheme, &self.subject].into_iter().all(|f| Self::active(f).is_none())
    }

    /// The value to bind for a filter column; `None` binds as SQL `NULL`,
    /// which the search query treats as "match anything".
    pub(crate) fn active(filter: &Option<String>) -> Option<&str> {
        filter.as_deref().filter(|value| !value.is_empty())
    }
}
