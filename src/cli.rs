use clap::{Args, Parser, Subcommand};
use shelf_catalog::{Contributor, Filters, MaterialDetails, MaterialId, MaterialType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shelf", version)]
#[command(about = "Catalog of notes, question papers and lecture videos", long_about = None)]
pub(crate) struct Cli {
    /// Config file (TOML, YAML or JSON), layered over the user config file
    #[arg(short, long, global = true, env = "SHELF_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Create the catalog database and the seed administrator
    Init,

    /// Find materials by department, semester, scheme and subject
    Search {
        #[command(flatten)]
        filters: FilterArgs,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a document or video to the catalog (administrators only)
    Upload {
        #[command(flatten)]
        admin: AdminArgs,
        #[command(flatten)]
        details: DetailsArgs,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show a material and count a view
    View {
        id: MaterialId,
        /// Print the material as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a material and count a download
    Download {
        id: MaterialId,
        /// Where to copy a stored document (defaults to its stored file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count a visit to the site
    Visit,

    /// Show site statistics (administrators only)
    Stats {
        #[command(flatten)]
        admin: AdminArgs,
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check administrator credentials
    Login {
        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Change an administrator's password (administrators only)
    Passwd {
        #[command(flatten)]
        admin: AdminArgs,
        #[arg(long, env = "SHELF_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

#[derive(Args)]
pub(crate) struct AdminArgs {
    #[arg(short, long, env = "SHELF_USERNAME")]
    pub(crate) username: String,
    #[arg(short, long, env = "SHELF_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

#[derive(Args)]
pub(crate) struct FilterArgs {
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    semester: Option<String>,
    #[arg(long)]
    scheme: Option<String>,
    #[arg(long)]
    subject: Option<String>,
}
impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Self { department: args.department, semester: args.semester, scheme: args.scheme, subject: args.subject }
    }
}

#[derive(Args)]
pub(crate) struct DetailsArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    department: String,
    #[arg(long)]
    semester: String,
    #[arg(long)]
    scheme: String,
    #[arg(long)]
    subject: String,
    /// Note, Question Paper, Video, or anything else
    #[arg(long = "type", value_name = "TYPE")]
    material_type: MaterialType,
    #[arg(long)]
    contributor_name: String,
    #[arg(long)]
    contributor_batch: String,
    #[arg(long)]
    contributor_year: String,
}
impl From<DetailsArgs> for MaterialDetails {
    fn from(args: DetailsArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            department: args.department,
            semester: args.semester,
            scheme: args.scheme,
            subject: args.subject,
            material_type: args.material_type,
            contributor: Contributor {
                name: args.contributor_name,
                batch: args.contributor_batch,
                year: args.contributor_year,
            },
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub(crate) struct SourceArgs {
    /// Document to upload
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Link to a hosted video
    #[arg(long)]
    pub(crate) video_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upload() {
        let cli = Cli::try_parse_from([
            "shelf", "upload", "-u", "admin", "-p", "admin123", "--title", "DS Notes", "--department", "CSE",
            "--semester", "S3", "--scheme", "2019", "--subject", "Data Structures", "--type", "notes",
            "--contributor-name", "A. Student", "--contributor-batch", "2021-25", "--contributor-year", "2024",
            "--file", "/tmp/ds.pdf",
        ])
        .unwrap();
        let Command::Upload { admin, details, source } = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(admin.username, "admin");
        let details = MaterialDetails::from(details);
        assert_eq!(details.material_type, MaterialType::Note);
        assert_eq!(details.description, None);
        assert_eq!(source.file, Some(PathBuf::from("/tmp/ds.pdf")));
        assert_eq!(source.video_url, None);
    }

    #[rstest]
    #[case::both_sources(&["--file", "/tmp/ds.pdf", "--video-url", "https://youtu.be/abc"])]
    #[case::no_source(&[])]
    fn test_upload_needs_exactly_one_source(#[case] source: &[&str]) {
        let mut args = vec![
            "shelf", "upload", "-u", "admin", "-p", "pw", "--title", "t", "--department", "d", "--semester", "s",
            "--scheme", "s", "--subject", "s", "--type", "Video", "--contributor-name", "n", "--contributor-batch",
            "b", "--contributor-year", "y",
        ];
        args.extend_from_slice(source);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_search_filters() {
        let cli = Cli::try_parse_from(["shelf", "search", "--department", "CSE", "--semester", "S3"]).unwrap();
        let Command::Search { filters, json } = cli.command else {
            panic!("expected search");
        };
        assert!(!json);
        let filters = Filters::from(filters);
        assert_eq!(filters, Filters::default().department("CSE").semester("S3"));
    }
}
