//! Compatibility-mode normalization.
//!
//! [`normalize`] looks at one input document. Documents without legacy
//! compatibility settings pass through untouched; documents with them get a
//! temporary working copy whose settings part declares the modern layout
//! version instead. Failures are reported in the returned
//! [`NormalizationOutcome`], never as an `Err`, so the caller decides
//! whether one bad input ends the run.

use crate::container::{insert_before_root_end, relationships_part_name, OoxmlContainer, PartEdits};
use crate::detect::{self, WordFormat, SETTINGS_CONTENT_TYPE, SETTINGS_RELATIONSHIP_TYPE};
use crate::docx::settings::{self, CompatSettings};
use crate::error::{Error, Result};
use crate::options::NormalizeOptions;
use quick_xml::events::BytesStart;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info};

const EMPTY_RELATIONSHIPS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"/>";

/// Result of normalizing one input document.
#[derive(Debug)]
pub struct NormalizationOutcome {
    /// The input as given.
    pub input: PathBuf,
    /// The document to hand to the merge engine: the input itself, or the
    /// normalized working copy.
    pub resolved_location: PathBuf,
    /// Whether a normalized working copy was created.
    pub was_modified: bool,
    /// Human-readable cause, present iff normalization failed.
    pub error_detail: Option<String>,
    temp_file: Option<TempPath>,
}

impl NormalizationOutcome {
    fn unchanged(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            resolved_location: input.to_path_buf(),
            was_modified: false,
            error_detail: None,
            temp_file: None,
        }
    }

    fn normalized(input: &Path, copy: TempPath) -> Self {
        Self {
            input: input.to_path_buf(),
            resolved_location: copy.to_path_buf(),
            was_modified: true,
            error_detail: None,
            temp_file: Some(copy),
        }
    }

    fn failed(input: &Path, error: &Error) -> Self {
        Self {
            input: input.to_path_buf(),
            resolved_location: input.to_path_buf(),
            was_modified: false,
            error_detail: Some(error.to_string()),
            temp_file: None,
        }
    }

    /// Whether the input can be merged.
    pub fn succeeded(&self) -> bool {
        self.error_detail.is_none()
    }

    /// Take ownership of the working copy.
    ///
    /// While the outcome holds the copy, dropping the outcome deletes it.
    /// After this call the returned [`TempPath`] controls its lifetime.
    pub fn take_temp_file(&mut self) -> Option<TempPath> {
        self.temp_file.take()
    }
}

/// A validated word-processing package.
struct Package {
    container: OoxmlContainer,
    main_part: String,
    format: WordFormat,
    settings_part: Option<String>,
}

impl Package {
    fn open(path: &Path) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        let main_part = detect::main_document_part(&container)?;
        let format = detect::word_format(&container, &main_part)?;
        let settings_part = detect::settings_part(&container, &main_part)?;
        Ok(Self {
            container,
            main_part,
            format,
            settings_part,
        })
    }

    fn compat_settings(&self, target_version: u32) -> Result<CompatSettings> {
        match &self.settings_part {
            Some(part) => settings::inspect(&self.container.read_xml(part)?, target_version),
            None => Ok(CompatSettings::default()),
        }
    }
}

/// Normalize one input document.
///
/// # Example
///
/// ```no_run
/// use docmerge::normalize::normalize;
/// use docmerge::NormalizeOptions;
///
/// let outcome = normalize("legacy.docx", &NormalizeOptions::default());
/// if outcome.was_modified {
///     println!("merging {}", outcome.resolved_location.display());
/// }
/// ```
pub fn normalize(input: impl AsRef<Path>, options: &NormalizeOptions) -> NormalizationOutcome {
    let input = input.as_ref();
    match try_normalize(input, options) {
        Ok(None) => {
            debug!(path = %input.display(), "no legacy compatibility mode");
            NormalizationOutcome::unchanged(input)
        }
        Ok(Some((copy, report))) => {
            info!(
                path = %input.display(),
                copy = %copy.display(),
                flags = ?report.legacy_flags,
                "normalized legacy compatibility mode"
            );
            NormalizationOutcome::normalized(input, copy)
        }
        Err(e) => {
            debug!(path = %input.display(), error = %e, "normalization failed");
            NormalizationOutcome::failed(input, &e)
        }
    }
}

/// Report the compatibility settings of a document without modifying it.
pub fn inspect_file(path: impl AsRef<Path>, target_version: u32) -> Result<CompatSettings> {
    Package::open(path.as_ref())?.compat_settings(target_version)
}

fn try_normalize(
    input: &Path,
    options: &NormalizeOptions,
) -> Result<Option<(TempPath, CompatSettings)>> {
    let package = Package::open(input)?;
    let report = package.compat_settings(options.compat_version)?;
    if !report.has_legacy_mode() {
        return Ok(None);
    }

    // Any early return below drops `copy`, which deletes the file.
    let copy = create_working_copy(package.format, options)?;
    fs::copy(input, &copy)?;

    let working = Package::open(&copy)?;
    let mut edits = PartEdits::new();
    let (settings_part, settings_xml) = ensure_settings_part(&working, &mut edits)?;
    let rewritten = settings::rewrite(&settings_xml, options.compat_version)?;
    edits.insert(settings_part, rewritten.into_bytes());
    working.container.save(&copy, &edits)?;

    Ok(Some((copy, report)))
}

fn create_working_copy(format: WordFormat, options: &NormalizeOptions) -> Result<TempPath> {
    let suffix = format!(".{}", format.extension());
    let mut builder = tempfile::Builder::new();
    builder.prefix("docmerge-").suffix(&suffix);

    let file = match &options.temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    Ok(file.into_temp_path())
}

/// Return the settings part name and contents, creating the part if the
/// package has none.
///
/// A created part is registered in `[Content_Types].xml` and in the main
/// document's relationships; those rewrites are recorded in `edits`.
fn ensure_settings_part(package: &Package, edits: &mut PartEdits) -> Result<(String, String)> {
    if let Some(part) = &package.settings_part {
        return Ok((part.clone(), package.container.read_xml(part)?));
    }

    let part = OoxmlContainer::resolve_path(&package.main_part, "settings.xml");

    let types = package.container.read_xml("[Content_Types].xml")?;
    if detect::content_type_of(&types, &part)?.as_deref() != Some(SETTINGS_CONTENT_TYPE) {
        let part_name = format!("/{}", part);
        let mut entry = BytesStart::new("Override");
        entry.push_attribute(("PartName", part_name.as_str()));
        entry.push_attribute(("ContentType", SETTINGS_CONTENT_TYPE));
        edits.insert(
            "[Content_Types].xml".to_string(),
            insert_before_root_end(&types, entry)?.into_bytes(),
        );
    }

    let rels_part = relationships_part_name(&package.main_part);
    let rels = package.container.read_relationships(&package.main_part)?;
    let rels_xml = match package.container.read_xml(&rels_part) {
        Ok(xml) => xml,
        Err(Error::MissingComponent(_)) => EMPTY_RELATIONSHIPS.to_string(),
        Err(e) => return Err(e),
    };
    let id = rels.next_free_id();
    let mut entry = BytesStart::new("Relationship");
    entry.push_attribute(("Id", id.as_str()));
    entry.push_attribute(("Type", SETTINGS_RELATIONSHIP_TYPE));
    entry.push_attribute(("Target", "settings.xml"));
    edits.insert(rels_part, insert_before_root_end(&rels_xml, entry)?.into_bytes());

    Ok((part, settings::empty_settings()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleDocument;

    fn options(dir: &Path) -> NormalizeOptions {
        NormalizeOptions::default().with_temp_dir(dir)
    }

    fn dir_is_empty(dir: &Path) -> bool {
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_document_without_compat_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = dir.path().join("plain.docx");
        SampleDocument::new("Plain").write_to(&input).unwrap();

        let outcome = normalize(&input, &options(work.path()));
        assert!(outcome.succeeded());
        assert!(!outcome.was_modified);
        assert_eq!(outcome.resolved_location, input);
        assert!(dir_is_empty(work.path()));
    }

    #[test]
    fn test_document_without_settings_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bare.docx");
        SampleDocument::new("Bare")
            .without_settings()
            .write_to(&input)
            .unwrap();

        let outcome = normalize(&input, &NormalizeOptions::default());
        assert!(outcome.succeeded());
        assert!(!outcome.was_modified);
    }

    #[test]
    fn test_strict_document_without_compat_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = dir.path().join("strict.docx");
        SampleDocument::new("Strict").strict().write_to(&input).unwrap();

        let outcome = normalize(&input, &options(work.path()));
        assert_eq!(outcome.error_detail, None);
        assert!(!outcome.was_modified);
        assert_eq!(outcome.resolved_location, input);
        assert!(dir_is_empty(work.path()));
    }

    #[test]
    fn test_strict_legacy_document_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = dir.path().join("strict-legacy.docx");
        SampleDocument::new("Strict")
            .strict()
            .with_legacy_compat(12)
            .with_forms_protection()
            .write_to(&input)
            .unwrap();

        let outcome = normalize(&input, &options(work.path()));
        assert_eq!(outcome.error_detail, None);
        assert!(outcome.was_modified);

        let report = inspect_file(&outcome.resolved_location, 16).unwrap();
        assert!(!report.has_legacy_mode());
        assert_eq!(report.compatibility_mode, Some(16));
        assert!(!report.forms_protection);
    }

    #[test]
    fn test_legacy_document_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = dir.path().join("legacy.docx");
        SampleDocument::new("Legacy")
            .with_paragraph("Old layout")
            .with_legacy_compat(14)
            .with_forms_protection()
            .write_to(&input)
            .unwrap();
        let original = fs::read(&input).unwrap();

        let outcome = normalize(&input, &options(work.path()));
        assert!(outcome.succeeded());
        assert!(outcome.was_modified);
        assert_ne!(outcome.resolved_location, input);
        assert!(outcome.resolved_location.exists());
        assert!(outcome.resolved_location.starts_with(work.path()));
        assert_eq!(
            outcome.resolved_location.extension().and_then(|e| e.to_str()),
            Some("docx")
        );

        // The original is never touched.
        assert_eq!(fs::read(&input).unwrap(), original);

        let report = inspect_file(&outcome.resolved_location, 16).unwrap();
        assert!(!report.has_legacy_mode());
        assert_eq!(report.compatibility_mode, Some(16));
        assert!(!report.forms_protection);

        assert_eq!(
            crate::extract_text(&outcome.resolved_location).unwrap(),
            "Legacy\nOld layout\n"
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("legacy.docx");
        SampleDocument::new("Legacy")
            .with_legacy_compat(11)
            .write_to(&input)
            .unwrap();

        let first = normalize(&input, &options(dir.path()));
        assert!(first.was_modified);

        let second = normalize(&first.resolved_location, &options(dir.path()));
        assert!(second.succeeded());
        assert!(!second.was_modified);
        assert_eq!(second.resolved_location, first.resolved_location);
    }

    #[test]
    fn test_dropping_outcome_deletes_copy() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = dir.path().join("legacy.docx");
        SampleDocument::new("Legacy")
            .with_legacy_compat(14)
            .write_to(&input)
            .unwrap();

        let outcome = normalize(&input, &options(work.path()));
        let copy = outcome.resolved_location.clone();
        assert!(copy.exists());
        drop(outcome);
        assert!(!copy.exists());
    }

    #[test]
    fn test_taken_copy_outlives_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("legacy.docx");
        SampleDocument::new("Legacy")
            .with_legacy_compat(14)
            .write_to(&input)
            .unwrap();

        let mut outcome = normalize(&input, &options(dir.path()));
        let temp = outcome.take_temp_file().unwrap();
        drop(outcome);
        assert!(temp.exists());
        temp.close().unwrap();
    }

    #[test]
    fn test_invalid_input_fails_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.docx");
        fs::write(&input, b"this is not a zip package").unwrap();

        let outcome = normalize(&input, &options(work.path()));
        assert!(!outcome.succeeded());
        assert!(!outcome.was_modified);
        assert_eq!(outcome.resolved_location, input);
        assert_eq!(outcome.error_detail.as_deref(), Some("Unknown file format"));
        assert!(dir_is_empty(work.path()));
    }

    #[test]
    fn test_missing_input_fails() {
        let outcome = normalize("does/not/exist.docx", &NormalizeOptions::default());
        assert!(!outcome.succeeded());
        assert!(outcome.error_detail.unwrap().starts_with("I/O error"));
    }

    #[test]
    fn test_settings_part_is_created_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.docx");
        SampleDocument::new("Bare")
            .without_settings()
            .write_to(&path)
            .unwrap();

        let package = Package::open(&path).unwrap();
        let mut edits = PartEdits::new();
        let (part, xml) = ensure_settings_part(&package, &mut edits).unwrap();
        assert_eq!(part, "word/settings.xml");
        edits.insert(part, settings::rewrite(&xml, 16).unwrap().into_bytes());
        package.container.save(&path, &edits).unwrap();

        let reopened = Package::open(&path).unwrap();
        assert_eq!(reopened.settings_part.as_deref(), Some("word/settings.xml"));
        let types = reopened.container.read_xml("[Content_Types].xml").unwrap();
        assert_eq!(
            detect::content_type_of(&types, "word/settings.xml")
                .unwrap()
                .as_deref(),
            Some(SETTINGS_CONTENT_TYPE)
        );
        let rels = reopened
            .container
            .read_relationships("word/document.xml")
            .unwrap();
        assert!(rels.find_by_type_suffix("/settings").is_some());
        assert_eq!(reopened.compat_settings(16).unwrap().compatibility_mode, Some(16));
    }
}
