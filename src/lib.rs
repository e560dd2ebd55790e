//! # docmerge
//!
//! Merge Word documents into one, with compatibility-mode normalization.
//!
//! Inputs are concatenated in order. The first document is the template:
//! its styles, settings and section layout carry over to the output.
//! Before merging, inputs saved in a legacy compatibility mode are
//! normalized on a temporary working copy so their layout flags do not leak
//! into the merged document. Originals are never modified.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmerge::{merge, MergeOptions, MergeRequest};
//!
//! // Merge with defaults (fail on the first unusable input)
//! let request = MergeRequest::new(["intro.docx", "body.docx"], "combined.docx");
//! let report = merge(&request)?;
//! println!("Merged {} documents", report.merged.len());
//!
//! // Skip unusable inputs instead of failing
//! let request = MergeRequest::new(["a.docx", "b.docx", "c.docx"], "out.docx")
//!     .with_options(MergeOptions::new().with_fail_fast(false));
//! let report = merge(&request)?;
//! for skipped in &report.skipped {
//!     eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
//! }
//! # Ok::<(), docmerge::Error>(())
//! ```
//!
//! ## Normalization only
//!
//! ```no_run
//! use docmerge::{normalize, NormalizeOptions};
//!
//! let outcome = normalize("legacy.docx", &NormalizeOptions::default());
//! assert!(outcome.succeeded());
//! println!("use {}", outcome.resolved_location.display());
//! ```
//!
//! ## Custom merge engines
//!
//! The merge step is a [`MergeEngine`]; [`merge_with`] runs the same
//! validation, normalization and cleanup around any implementation.

pub mod container;
pub mod detect;
pub mod docx;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod options;
pub mod orchestrator;
pub mod sample;

// Re-exports
pub use container::{OoxmlContainer, PartEdits, Relationship, Relationships};
pub use detect::WordFormat;
pub use docx::CompatSettings;
pub use engine::{BodyMerger, MergeEngine, MergeSource};
pub use error::{Error, Result};
pub use normalize::{inspect_file, normalize, NormalizationOutcome};
pub use options::{MergeOptions, NormalizeOptions};
pub use orchestrator::{merge, merge_with, MergeReport, MergeRequest, SkippedInput};

use std::path::{Path, PathBuf};

/// Extract the visible text of a document.
///
/// # Example
///
/// ```no_run
/// let text = docmerge::extract_text("merged.docx")?;
/// println!("{}", text);
/// # Ok::<(), docmerge::Error>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let container = OoxmlContainer::open(path)?;
    let main_part = detect::main_document_part(&container)?;
    docx::document_text(&container.read_xml(&main_part)?)
}

/// Determine which kind of word-processing package a file is.
///
/// # Example
///
/// ```no_run
/// let format = docmerge::detect_format("report.docm")?;
/// println!("{}", format);
/// # Ok::<(), docmerge::Error>(())
/// ```
pub fn detect_format(path: impl AsRef<Path>) -> Result<WordFormat> {
    let container = OoxmlContainer::open(path)?;
    let main_part = detect::main_document_part(&container)?;
    detect::word_format(&container, &main_part)
}

/// Merge `inputs` into `output` with default options.
///
/// # Example
///
/// ```no_run
/// docmerge::merge_files(["a.docx", "b.docx"], "merged.docx")?;
/// # Ok::<(), docmerge::Error>(())
/// ```
pub fn merge_files<I, P>(inputs: I, output: impl Into<PathBuf>) -> Result<MergeReport>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    merge(&MergeRequest::new(inputs, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleDocument;

    #[test]
    fn test_extract_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        SampleDocument::new("Heading")
            .with_paragraph("First")
            .with_paragraph("Second")
            .write_to(&path)
            .unwrap();
        assert_eq!(extract_text(&path).unwrap(), "Heading\nFirst\nSecond\n");
    }

    #[test]
    fn test_detect_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        SampleDocument::new("Heading").write_to(&path).unwrap();
        let format = detect_format(&path).unwrap();
        assert_eq!(format, WordFormat::Document);
        assert_eq!(format.to_string(), "Word Document");
    }

    #[test]
    fn test_merge_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.docx");
        let b = dir.path().join("b.docx");
        SampleDocument::new("One").write_to(&a).unwrap();
        SampleDocument::new("Two").write_to(&b).unwrap();

        let output = dir.path().join("out.docx");
        let report = merge_files([&a, &b], &output).unwrap();
        assert_eq!(report.merged, vec![a, b]);
        assert!(output.exists());
    }
}
