use super::sanitize;
use crate::error::{ErrorKind, Result};
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::OffsetDateTime;

/// Surrogate key assigned by the database on insert.
pub type MaterialId = u64;

/// Kind of material.
///
/// The set is open: the known kinds get their own variant, anything else is
/// kept verbatim in [`MaterialType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaterialType {
    Note,
    QuestionPaper,
    /// The only kind whose file link is an external URL.
    Video,
    Other(String),
}
impl MaterialType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Note => "Note",
            Self::QuestionPaper => "Question Paper",
            Self::Video => "Video",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }
}
impl FromStr for MaterialType {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "note" | "notes" => Self::Note,
            "questionpaper" | "questionpapers" | "qp" => Self::QuestionPaper,
            "video" | "videos" => Self::Video,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}
impl Display for MaterialType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for MaterialType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where the material actually lives.
///
/// Stored as a single `file_link` column; which variant it is depends only
/// on whether the material type is [`MaterialType::Video`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Path relative to the upload storage root.
    Document(String),
    /// Absolute external URL.
    Video(String),
}
impl Resource {
    pub fn link(&self) -> &str {
        match self {
            Self::Document(path) => path,
            Self::Video(url) => url,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }

    pub(crate) fn from_stored(material_type: &MaterialType, link: String) -> Self {
        match material_type.is_video() {
            true => Self::Video(link),
            false => Self::Document(link),
        }
    }

    fn validate(&self, material_type: &MaterialType) -> Result<()> {
        if self.link().trim().is_empty() {
            exn::bail!(ErrorKind::MissingField("file_link"));
        }
        if material_type.is_video() != self.is_video() {
            exn::bail!(ErrorKind::MismatchedResource(material_type.to_string()));
        }
        if let Self::Video(url) = self {
            let url = url.trim();
            let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"));
            if rest.is_none_or(|host| host.is_empty() || host.starts_with('/')) {
                exn::bail!(ErrorKind::InvalidLink(url.to_string()));
            }
        }
        Ok(())
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for Resource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.link())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Contributor {
    #[cfg_attr(feature = "serde", serde(rename = "contributor_name"))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "contributor_batch"))]
    pub batch: String,
    #[cfg_attr(feature = "serde", serde(rename = "contributor_year"))]
    pub year: String,
}

/// Everything describing a material except where its content lives.
///
/// Intake validates this before storing any upload, so a bad submission is
/// rejected before a single byte hits the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MaterialDetails {
    pub title: String,
    pub description: Option<String>,
    pub department: String,
    pub semester: String,
    pub scheme: String,
    pub subject: String,
    pub material_type: MaterialType,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub contributor: Contributor,
}
impl MaterialDetails {
    /// Checks that every required field is present and not blank.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("title", self.title.as_str()),
            ("department", self.department.as_str()),
            ("semester", self.semester.as_str()),
            ("scheme", self.scheme.as_str()),
            ("subject", self.subject.as_str()),
            ("material_type", self.material_type.as_str()),
            ("contributor_name", self.contributor.name.as_str()),
            ("contributor_batch", self.contributor.batch.as_str()),
            ("contributor_year", self.contributor.year.as_str()),
        ];
        if let Some((field, _)) = required.into_iter().find(|(_, value)| value.trim().is_empty()) {
            exn::bail!(ErrorKind::MissingField(field));
        }
        Ok(())
    }

    /// Description with blank values collapsed to `None`.
    pub(crate) fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// A material that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMaterial {
    pub details: MaterialDetails,
    pub resource: Resource,
}
impl NewMaterial {
    pub fn new(details: MaterialDetails, resource: Resource) -> Self {
        Self { details, resource }
    }

    pub fn validate(&self) -> Result<()> {
        self.details.validate()?;
        self.resource.validate(&self.details.material_type)
    }
}

/// A catalogued material, as read back from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Material {
    pub id: MaterialId,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub details: MaterialDetails,
    #[cfg_attr(feature = "serde", serde(rename = "file_link"))]
    pub resource: Resource,
    pub view_count: u64,
    pub download_count: u64,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    pub(crate) fn ds_notes() -> NewMaterial {
        NewMaterial::new(
            MaterialDetails {
                title: "DS Notes".to_string(),
                description: None,
                department: "CSE".to_string(),
                semester: "S3".to_string(),
                scheme: "2019".to_string(),
                subject: "Data Structures".to_string(),
                material_type: MaterialType::Note,
                contributor: Contributor {
                    name: "A. Student".to_string(),
                    batch: "2021-25".to_string(),
                    year: "2024".to_string(),
                },
            },
            Resource::Document("/uploads/123-ds.pdf".to_string()),
        )
    }

    #[rstest]
    #[case("Note", MaterialType::Note)]
    #[case("notes", MaterialType::Note)]
    #[case("Question Paper", MaterialType::QuestionPaper)]
    #[case("question-paper", MaterialType::QuestionPaper)]
    #[case("QP", MaterialType::QuestionPaper)]
    #[case("Video", MaterialType::Video)]
    #[case(" Lab Manual ", MaterialType::Other("Lab Manual".to_string()))]
    fn test_parse_material_type(#[case] input: &str, #[case] expected: MaterialType) {
        assert_eq!(input.parse::<MaterialType>().unwrap(), expected);
    }

    #[rstest]
    #[case(MaterialType::Note, "Note")]
    #[case(MaterialType::QuestionPaper, "Question Paper")]
    #[case(MaterialType::Video, "Video")]
    #[case(MaterialType::Other("Lab Manual".to_string()), "Lab Manual")]
    fn test_material_type_display_round_trips(#[case] material_type: MaterialType, #[case] text: &str) {
        assert_eq!(material_type.to_string(), text);
        assert_eq!(text.parse::<MaterialType>().unwrap(), material_type);
    }

    #[test]
    fn test_valid_document() {
        assert!(ds_notes().validate().is_ok());
    }

    #[rstest]
    #[case::title(|m: &mut NewMaterial| m.details.title = String::new(), "title")]
    #[case::blank_department(|m: &mut NewMaterial| m.details.department = "   ".to_string(), "department")]
    #[case::semester(|m: &mut NewMaterial| m.details.semester = String::new(), "semester")]
    #[case::scheme(|m: &mut NewMaterial| m.details.scheme = String::new(), "scheme")]
    #[case::subject(|m: &mut NewMaterial| m.details.subject = String::new(), "subject")]
    #[case::material_type(|m: &mut NewMaterial| m.details.material_type = MaterialType::Other(String::new()), "material_type")]
    #[case::contributor_name(|m: &mut NewMaterial| m.details.contributor.name = String::new(), "contributor_name")]
    #[case::contributor_batch(|m: &mut NewMaterial| m.details.contributor.batch = String::new(), "contributor_batch")]
    #[case::contributor_year(|m: &mut NewMaterial| m.details.contributor.year = String::new(), "contributor_year")]
    #[case::file_link(|m: &mut NewMaterial| m.resource = Resource::Document(String::new()), "file_link")]
    fn test_missing_field(#[case] mutate: fn(&mut NewMaterial), #[case] field: &str) {
        let mut material = ds_notes();
        mutate(&mut material);
        let err = material.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingField(f) if *f == field));
    }

    #[test]
    fn test_description_is_optional() {
        let mut material = ds_notes();
        material.details.description = Some("  ".to_string());
        assert!(material.validate().is_ok());
        assert_eq!(material.details.description(), None);
        material.details.description = Some("Unit 1 to 5".to_string());
        assert_eq!(material.details.description(), Some("Unit 1 to 5"));
    }

    #[test]
    fn test_video_type_requires_video_resource() {
        let mut material = ds_notes();
        material.details.material_type = MaterialType::Video;
        let err = material.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::MismatchedResource(t) if t == "Video"));
    }

    #[test]
    fn test_document_type_rejects_video_resource() {
        let mut material = ds_notes();
        material.resource = Resource::Video("https://youtu.be/abc".to_string());
        let err = material.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::MismatchedResource(t) if t == "Note"));
    }

    #[rstest]
    #[case("https://youtu.be/abc", true)]
    #[case("http://example.com/lecture", true)]
    #[case("youtu.be/abc", false)]
    #[case("https://", false)]
    #[case("ftp://example.com/lecture.mp4", false)]
    #[case("/uploads/lecture.mp4", false)]
    fn test_video_links(#[case] url: &str, #[case] valid: bool) {
        let mut material = ds_notes();
        material.details.material_type = MaterialType::Video;
        material.resource = Resource::Video(url.to_string());
        assert_eq!(material.validate().is_ok(), valid);
    }

    #[test]
    fn test_resource_from_stored() {
        let video = Resource::from_stored(&MaterialType::Video, "https://youtu.be/abc".to_string());
        assert!(video.is_video());
        let document = Resource::from_stored(&MaterialType::QuestionPaper, "qp.pdf".to_string());
        assert_eq!(document, Resource::Document("qp.pdf".to_string()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_shape() {
        let NewMaterial { details, resource } = ds_notes();
        let material = Material {
            id: 1,
            details,
            resource,
            view_count: 2,
            download_count: 0,
            created_at: OffsetDateTime::from_unix_timestamp(1_704_067_200).unwrap(),
        };
        let json = serde_json::to_value(&material).unwrap();
        assert_eq!(json["material_type"], "Note");
        assert_eq!(json["file_link"], "/uploads/123-ds.pdf");
        assert_eq!(json["contributor_name"], "A. Student");
        assert_eq!(json["description"], serde_json::Value::Null);
        assert_eq!(json["view_count"], 2);
        assert_eq!(json["created_at"], "2024-01-01T00:00:00Z");
    }
}
