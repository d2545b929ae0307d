use crate::error::{Error, ErrorKind};
use crate::models::{Contributor, Material, MaterialDetails, MaterialType, Resource};
use exn::ResultExt;
use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct MaterialRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    #[sqlx(default)]
    pub(crate) description: Option<String>,
    pub(crate) department: String,
    pub(crate) semester: String,
    pub(crate) scheme: String,
    pub(crate) subject: String,
    pub(crate) material_type: String,
    pub(crate) file_link: String,
    pub(crate) contributor_name: String,
    pub(crate) contributor_batch: String,
    pub(crate) contributor_year: String,
    pub(crate) view_count: i64,
    pub(crate) download_count: i64,
    pub(crate) created_at: i64,
}
impl TryFrom<MaterialRow> for Material {
    type Error = Error;
    fn try_from(row: MaterialRow) -> Result<Self, Self::Error> {
        let Ok(material_type) = row.material_type.parse::<MaterialType>();
        let resource = Resource::from_stored(&material_type, row.file_link);
        Ok(Self {
            id: u64::try_from(row.id).or_raise(|| ErrorKind::InvalidData("material id"))?,
            details: MaterialDetails {
                title: row.title,
                description: row.description,
                department: row.department,
                semester: row.semester,
                scheme: row.scheme,
                subject: row.subject,
                material_type,
                contributor: Contributor {
                    name: row.contributor_name,
                    batch: row.contributor_batch,
                    year: row.contributor_year,
                },
            },
            resource,
            view_count: u64::try_from(row.view_count).or_raise(|| ErrorKind::InvalidData("view count"))?,
            download_count: u64::try_from(row.download_count).or_raise(|| ErrorKind::InvalidData("download count"))?,
            created_at: OffsetDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("creation date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(material_type: &str, file_link: &str) -> MaterialRow {
        MaterialRow {
            id: 7,
            title: "Compiler Design Module 3".to_string(),
            description: Some("Syntax directed translation".to_string()),
            department: "CSE".to_string(),
            semester: "S6".to_string(),
            scheme: "2019".to_string(),
            subject: "Compiler Design".to_string(),
            material_type: material_type.to_string(),
            file_link: file_link.to_string(),
            contributor_name: "B. Student".to_string(),
            contributor_batch: "2020-24".to_string(),
            contributor_year: "2023".to_string(),
            view_count: 12,
            download_count: 3,
            created_at: 1_704_067_200,
        }
    }

    #[test]
    fn test_row_to_model() {
        let model = Material::try_from(make_row("Question Paper", "1704067200000-cd-qp.pdf")).unwrap();
        assert_eq!(model.id, 7);
        assert_eq!(model.details.material_type, MaterialType::QuestionPaper);
        assert_eq!(model.resource, Resource::Document("1704067200000-cd-qp.pdf".to_string()));
        assert_eq!(model.view_count, 12);
        assert_eq!(model.created_at.unix_timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_video_row_has_video_resource() {
        let model = Material::try_from(make_row("Video", "https://youtu.be/abc")).unwrap();
        assert!(model.resource.is_video());
    }

    #[test]
    fn test_negative_counter_is_invalid() {
        let mut row = make_row("Note", "notes.pdf");
        row.view_count = -1;
        let err = Material::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("view count")));
    }
}
