//! Error types for the docmerge library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docmerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while normalizing or merging documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a ZIP-based document package.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The package is valid OOXML but not a word-processing document.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing or writing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required document part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The merge request itself is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An input document does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A single input could not be normalized.
    #[error("Failed to process {}: {detail}", path.display())]
    Normalization {
        /// The offending input.
        path: PathBuf,
        /// Human-readable cause.
        detail: String,
    },

    /// Every input was skipped because none could be normalized.
    #[error("No valid input documents: all {0} inputs failed to process")]
    NoValidInput(usize),

    /// The merge engine failed to produce the output document.
    #[error("Merge failed: {0}")]
    MergeEngine(String),

    /// Error serializing a report.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}
