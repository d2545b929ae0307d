//! Storage path templating for uploaded documents.
//!
//! Converts an upload's metadata into a storage-relative path using a
//! configurable [upon] template. The template syntax follows upon's
//! Mustache-like conventions (`{{ variable }}`, `{{ value|formatter }}`),
//! extended with path-safe helpers:
//!
//! - **`slug`**: converts strings to URL-safe slugs, stripping quotation marks
//!   first to avoid artifacts like leading/trailing hyphens.
//! - **`truncate`**: truncates strings to a maximum byte length at a character
//!   boundary, usable as either `truncate(value, n)` or `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Variable        | Description                                                      |
//! |-----------------|------------------------------------------------------------------|
//! | `timestamp`     | Upload time in Unix milliseconds                                 |
//! | `name`          | Original filename without directories or extension               |
//! | `ext`           | Lowercased extension including the dot (e.g. `".pdf"`), or empty |
//! | `department`    | Department tag of the material                                   |
//! | `semester`      | Semester tag of the material                                     |
//! | `scheme`        | Scheme tag of the material                                       |
//! | `subject`       | Subject of the material                                          |
//! | `material_type` | Material type (e.g. `"Question Paper"`)                          |
//!
//! # Example
//!
//! ```
//! use shelf_intake::{PathGenerator, UploadContext};
//!
//! let generator: PathGenerator = "{{ department|slug }}/{{ timestamp }}-{{ name|slug }}{{ ext }}".parse().unwrap();
//! let context = UploadContext {
//!     timestamp: 1_712_000_000_000,
//!     filename: "DS Notes (Module 1).PDF".to_string(),
//!     department: "CSE".to_string(),
//!     ..UploadContext::default()
//! };
//! assert_eq!(generator.generate(&context).unwrap(), "cse/1712000000000-ds-notes-module-1.pdf");
//! ```

use crate::error::{Error, ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use shelf_storage::validate_path;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// Default template: `<millis>-<slugified name><ext>`, flat under the upload root.
pub const DEFAULT_TEMPLATE: &str = "{{ timestamp }}-{{ name|slug }}{{ ext }}";

/// Everything a path template can refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadContext {
    pub timestamp: i128,
    /// Filename as submitted; any directories in it are ignored.
    pub filename: String,
    pub department: String,
    pub semester: String,
    pub scheme: String,
    pub subject: String,
    pub material_type: String,
}
impl UploadContext {
    fn file_name(&self) -> &Path {
        // Browsers on Windows have been known to submit full client paths.
        let name = self.filename.rsplit(['/', '\\']).next().unwrap_or_default();
        Path::new(name)
    }

    /// Original filename without directories or extension.
    pub fn name(&self) -> String {
        self.file_name().file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// Lowercased extension with its leading dot, or an empty string.
    ///
    /// Anything but ASCII alphanumerics is dropped, so an extension can never
    /// smuggle separators into the rendered path.
    pub fn ext(&self) -> String {
        let ext: String = self
            .file_name()
            .extension()
            .map(|ext| ext.to_string_lossy())
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match ext.is_empty() {
            true => ext,
            false => format!(".{ext}"),
        }
    }
}

/// Generates storage paths from an [`UploadContext`] and a template string.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at creation time rather than at render time. The
/// compiled template is reusable across many [`generate`](Self::generate) calls.
///
/// Generated paths are normalized (trimmed, deduplicated separators) and
/// validated by [`shelf_storage::validate_path`] to prevent directory traversal.
pub struct PathGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
    source: String,
}
impl FromStr for PathGenerator {
    type Err = Error;

    /// Compiles the given template string into a reusable [`PathGenerator`].
    ///
    /// Returns [`ErrorKind::Template`] if the template is blank or its syntax
    /// is invalid.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().is_empty() {
            exn::bail!(ErrorKind::Template);
        }
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        // Compile the template early so we can fail-fast in construction.
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template, source: s.to_string() })
    }
}
impl std::fmt::Debug for PathGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathGenerator").field("template", &self.source).finish()
    }
}
impl PathGenerator {
    /// Renders the template for the given upload, returning a normalized
    /// storage-relative path.
    #[instrument(skip_all, fields(filename = %context.filename))]
    pub fn generate(&self, context: &UploadContext) -> Result<String> {
        let path = self
            .template
            .render(&self.engine, Self::parameters(context))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Self::normalize(path)
    }

    /// Trims each path segment, joins them with `/`, then validates via
    /// [`shelf_storage::validate_path`].
    fn normalize(s: impl Into<String>) -> Result<String> {
        let path = s.into().trim().split('/').map(str::trim).collect::<Vec<_>>().join("/");
        validate_path(&path).or_raise(|| ErrorKind::Template).and_then(|p| {
            p.to_str().map(|p| p.to_string())
            // Infallible: input was String, so won't fail. Here for completeness.
            .ok_or_raise(|| ErrorKind::Template)
        })
    }

    fn parameters(context: &UploadContext) -> upon::Value {
        let name = context.name();
        // A name made only of punctuation would slug down to nothing.
        let name = match name.chars().any(char::is_alphanumeric) {
            true => name,
            false => "upload".to_string(),
        };
        upon::value! {
            timestamp: context.timestamp.to_string(),
            name: name,
            ext: context.ext(),
            department: context.department.as_str(),
            semester: context.semester.as_str(),
            scheme: context.scheme.as_str(),
            subject: context.subject.as_str(),
            material_type: context.material_type.as_str(),
        }
    }
}

/// Custom [`upon`] extensions for path-safe string manipulation.
mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Custom formatter that converts strings to URL-safe slugs.
    ///
    /// Strips quotation marks before slugifying to avoid awkward slug output
    /// like `"hello"` becoming `-hello-`.
    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                // Various quotation marks: '"''""„"`«»
                let marks = [
                    '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}',
                    '\u{0060}', '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
                ];
                let stripped: String = s.chars().filter(|c| !marks.contains(c)).collect();
                write!(f, "{}", slugify!(&stripped))?
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Truncates a string to a maximum byte length at a character boundary.
    fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_string()
    }

    /// Registers the `slug` formatter and `truncate` function on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("slug", slug_formatter);
        engine.add_function("truncate", truncate_to_char_boundary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn default_generator() -> PathGenerator {
        DEFAULT_TEMPLATE.parse().unwrap()
    }

    fn make_context(filename: &str) -> UploadContext {
        UploadContext {
            timestamp: 1_712_000_000_000,
            filename: filename.to_string(),
            department: "CSE".to_string(),
            semester: "S3".to_string(),
            scheme: "2019".to_string(),
            subject: "Data Structures".to_string(),
            material_type: "Question Paper".to_string(),
        }
    }

    #[test]
    fn test_default_template() {
        let generator = default_generator();
        let path = generator.generate(&make_context("DS Notes.pdf")).unwrap();
        assert_eq!(path, "1712000000000-ds-notes.pdf");
    }

    #[test]
    fn test_debug_shows_template() {
        assert!(format!("{:?}", default_generator()).contains("{{ timestamp }}"));
    }

    #[rstest]
    #[case("notes.pdf", "notes", ".pdf")]
    #[case("Notes.PDF", "Notes", ".pdf")]
    #[case("archive.tar.gz", "archive.tar", ".gz")]
    #[case("README", "README", "")]
    #[case("C:\\Users\\student\\ds.pdf", "ds", ".pdf")]
    #[case("../../etc/passwd", "passwd", "")]
    #[case("weird.p/df", "df", "")]
    fn test_name_and_ext(#[case] filename: &str, #[case] name: &str, #[case] ext: &str) {
        let context = make_context(filename);
        assert_eq!(context.name(), name);
        assert_eq!(context.ext(), ext);
    }

    #[test]
    fn test_nested_template() {
        let generator: PathGenerator =
            "{{ department|slug }}/{{ semester|slug }}/{{ subject|slug }}/{{ timestamp }}-{{ name|slug }}{{ ext }}"
                .parse()
                .unwrap();
        let path = generator.generate(&make_context("Linked Lists.pdf")).unwrap();
        assert_eq!(path, "cse/s3/data-structures/1712000000000-linked-lists.pdf");
    }

    #[test]
    fn test_material_type_variable() {
        let generator: PathGenerator = "{{ material_type|slug }}/{{ name|slug }}{{ ext }}".parse().unwrap();
        let path = generator.generate(&make_context("ds.pdf")).unwrap();
        assert_eq!(path, "question-paper/ds.pdf");
    }

    #[test]
    fn test_traversal_in_filename_is_harmless() {
        let generator = default_generator();
        let path = generator.generate(&make_context("../../etc/passwd")).unwrap();
        assert_eq!(path, "1712000000000-passwd");
    }

    #[test]
    fn test_traversal_in_metadata_is_rejected() {
        let generator: PathGenerator = "{{ department }}/{{ name|slug }}{{ ext }}".parse().unwrap();
        let mut context = make_context("ds.pdf");
        context.department = "../..".to_string();
        let err = generator.generate(&context).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[test]
    fn test_punctuation_only_name() {
        let generator = default_generator();
        let path = generator.generate(&make_context("???.pdf")).unwrap();
        assert_eq!(path, "1712000000000-upload.pdf");
    }

    #[test]
    fn test_slug_strips_quotes() {
        let generator = default_generator();
        let path = generator.generate(&make_context("\"Hello\" World's 'Test'.pdf")).unwrap();
        assert_eq!(path, "1712000000000-hello-worlds-test.pdf");
    }

    #[test]
    fn test_truncate_classic_function() {
        let generator: PathGenerator = "{{ truncate(subject, 10)|slug }}".parse().unwrap();
        // "Data Struc" truncated to 10 bytes, then slugified
        assert_eq!(generator.generate(&make_context("ds.pdf")).unwrap(), "data-struc");
    }

    #[test]
    fn test_truncate_filter_function() {
        let generator: PathGenerator = "{{ subject|truncate: 10|slug }}".parse().unwrap();
        assert_eq!(generator.generate(&make_context("ds.pdf")).unwrap(), "data-struc");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("{{ unclosed")]
    fn test_invalid_templates(#[case] template: &str) {
        let err = template.parse::<PathGenerator>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }
}
