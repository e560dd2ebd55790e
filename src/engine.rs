//! Merge engines.
//!
//! The orchestrator hands an ordered list of documents to a [`MergeEngine`]
//! and treats it as a black box. [`BodyMerger`] is the engine used by
//! default.

use crate::container::{OoxmlContainer, PartEdits};
use crate::detect;
use crate::docx::body::{append_bodies, extract_body};
use crate::error::{Error, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One document handed to a merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSource {
    /// Package to read; always a valid word-processing document.
    pub path: PathBuf,
    /// Keep this document in its own section, laid out like the first one.
    pub keep_sections: bool,
}

/// Combines an ordered list of documents into one output document.
///
/// The first source is the template: the output carries its styles,
/// settings, headers, footers and section layout. Implementations must
/// keep source order and must not leave a partial file at `output` when
/// they fail.
pub trait MergeEngine {
    /// Merge `sources` into `output`.
    fn merge(&self, sources: &[MergeSource], output: &Path) -> Result<()>;
}

/// Default engine: appends the body content of every source to the body
/// of the first one.
///
/// Only the main document part of later sources is read. Their drawings,
/// embedded objects, notes and comments reference parts that the template
/// package does not have and are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyMerger;

impl BodyMerger {
    /// Create the default engine.
    pub fn new() -> Self {
        Self
    }

    fn read_main_part(path: &Path) -> Result<(OoxmlContainer, String, String)> {
        let container = OoxmlContainer::open(path)?;
        let main_part = detect::main_document_part(&container)?;
        let xml = container.read_xml(&main_part)?;
        Ok((container, main_part, xml))
    }
}

impl MergeEngine for BodyMerger {
    fn merge(&self, sources: &[MergeSource], output: &Path) -> Result<()> {
        let (template, rest) = sources
            .split_first()
            .ok_or_else(|| Error::InvalidArgument("no documents to merge".to_string()))?;

        let (container, main_part, base_xml) = Self::read_main_part(&template.path)?;

        let mut fragments = Vec::with_capacity(rest.len());
        for source in rest {
            let (_, _, xml) = Self::read_main_part(&source.path)?;
            let fragment = extract_body(&xml)?;
            debug!(
                path = %source.path.display(),
                bytes = fragment.content.len(),
                "appending document body"
            );
            fragments.push((fragment, source.keep_sections));
        }

        let merged = append_bodies(&base_xml, &fragments)?;
        let mut edits = PartEdits::new();
        edits.insert(main_part, merged.into_bytes());
        write_atomically(&container, output, &edits, &template.path)
    }
}

/// Write the package next to `output` and rename it into place.
///
/// The output takes the permissions of the file it replaces, or of the
/// template when it is new.
fn write_atomically(
    container: &OoxmlContainer,
    output: &Path,
    edits: &PartEdits,
    template: &Path,
) -> Result<()> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut staged = tempfile::Builder::new()
        .prefix(".docmerge-")
        .suffix(".partial")
        .tempfile_in(dir)?;
    {
        let mut writer = container.write_to(BufWriter::new(staged.as_file_mut()), edits)?;
        writer.flush()?;
    }
    let permissions = match fs::metadata(output) {
        Ok(metadata) => metadata.permissions(),
        Err(_) => fs::metadata(template)?.permissions(),
    };
    staged.as_file().set_permissions(permissions)?;
    staged.persist(output).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
