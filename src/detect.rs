//! Package validation for word-processing documents.
//!
//! Locates the main document part and the settings part, and determines
//! which flavour of word-processing package (document, template, with or
//! without macros) a container holds.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const MACRO_DOCUMENT_CONTENT_TYPE: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
const TEMPLATE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
const MACRO_TEMPLATE_CONTENT_TYPE: &str =
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";

/// Content type of the settings part.
pub const SETTINGS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";

/// Relationship type linking the main document part to its settings part.
pub const SETTINGS_RELATIONSHIP_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

/// Flavour of word-processing package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFormat {
    /// Word document (.docx)
    Document,
    /// Macro-enabled Word document (.docm)
    MacroDocument,
    /// Word template (.dotx)
    Template,
    /// Macro-enabled Word template (.dotm)
    MacroTemplate,
}

impl WordFormat {
    /// Returns the container file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            WordFormat::Document => "docx",
            WordFormat::MacroDocument => "docm",
            WordFormat::Template => "dotx",
            WordFormat::MacroTemplate => "dotm",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            WordFormat::Document => "Word Document",
            WordFormat::MacroDocument => "Word Macro-Enabled Document",
            WordFormat::Template => "Word Template",
            WordFormat::MacroTemplate => "Word Macro-Enabled Template",
        }
    }

    /// Map a main-part content type onto a format.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim() {
            DOCUMENT_CONTENT_TYPE => Some(WordFormat::Document),
            MACRO_DOCUMENT_CONTENT_TYPE => Some(WordFormat::MacroDocument),
            TEMPLATE_CONTENT_TYPE => Some(WordFormat::Template),
            MACRO_TEMPLATE_CONTENT_TYPE => Some(WordFormat::MacroTemplate),
            _ => None,
        }
    }
}

impl std::fmt::Display for WordFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Locate the main document part through the package relationships.
///
/// Falls back to `word/document.xml` when the package has no
/// `officeDocument` relationship.
pub fn main_document_part(container: &OoxmlContainer) -> Result<String> {
    let rels = container.read_package_relationships()?;
    let part = match rels.find_by_type_suffix("/officeDocument") {
        Some(rel) => OoxmlContainer::resolve_path("", &rel.target),
        None => "word/document.xml".to_string(),
    };

    if !container.exists(&part) {
        return Err(Error::MissingComponent(part));
    }
    Ok(part)
}

/// Locate the settings part owned by `main_part`, if any.
pub fn settings_part(container: &OoxmlContainer, main_part: &str) -> Result<Option<String>> {
    let rels = container.read_relationships(main_part)?;
    let candidate = match rels.find_by_type_suffix("/settings") {
        Some(rel) => OoxmlContainer::resolve_path(main_part, &rel.target),
        None => OoxmlContainer::resolve_path(main_part, "settings.xml"),
    };

    Ok(container.exists(&candidate).then_some(candidate))
}

/// Determine the word-processing format of `main_part`.
///
/// Packages whose main part is not a word-processing part (workbooks,
/// presentations) are rejected with [`Error::UnsupportedFormat`].
pub fn word_format(container: &OoxmlContainer, main_part: &str) -> Result<WordFormat> {
    let content_types = container
        .read_xml("[Content_Types].xml")
        .map_err(|_| Error::MissingComponent("[Content_Types].xml".to_string()))?;

    match content_type_of(&content_types, main_part)? {
        Some(content_type) => WordFormat::from_content_type(&content_type)
            .ok_or(Error::UnsupportedFormat(content_type)),
        None => Err(Error::InvalidData(format!(
            "no content type registered for /{}",
            main_part
        ))),
    }
}

/// Resolve the content type of a part from `[Content_Types].xml`.
///
/// An `Override` for the part wins over a `Default` for its extension.
pub fn content_type_of(content_types: &str, part: &str) -> Result<Option<String>> {
    let part_name = format!("/{}", part.trim_start_matches('/'));
    let extension = part.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());

    let mut by_override = None;
    let mut by_default = None;

    let mut reader = Reader::from_str(content_types);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) => {
                let local = e.name().local_name();
                let mut key = None;
                let mut content_type = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"PartName" | b"Extension" => key = Some(value),
                        b"ContentType" => content_type = Some(value),
                        _ => {}
                    }
                }

                match (local.as_ref(), key) {
                    (b"Override", Some(name)) if name.eq_ignore_ascii_case(&part_name) => {
                        by_override = content_type;
                    }
                    (b"Default", Some(ext))
                        if Some(ext.to_ascii_lowercase()) == extension =>
                    {
                        by_default = content_type;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(by_override.or(by_default))
}
