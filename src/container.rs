//! ZIP container abstraction for OOXML packages.
//!
//! Reading goes through [`OoxmlContainer`]; rewriting re-emits the package
//! with [`OoxmlContainer::write_to`], raw-copying every entry that is not
//! being replaced so untouched parts stay byte-identical.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Replacement or new part contents, keyed by part name (no leading `/`).
pub type PartEdits = BTreeMap<String, Vec<u8>>;

/// A relationship entry from a .rels file.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Map from relationship ID to relationship data
    pub by_id: HashMap<String, Relationship>,
    /// Map from relationship type to list of relationships
    pub by_type: HashMap<String, Vec<Relationship>>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the first internal relationship whose type URI ends with `suffix`.
    ///
    /// Transitional and strict OOXML use different type URI prefixes for the
    /// same relationship (`.../officeDocument/2006/relationships/settings` vs
    /// `.../officeDocument/relationships/settings`), so lookups match on the
    /// trailing segment.
    pub fn find_by_type_suffix(&self, suffix: &str) -> Option<&Relationship> {
        let mut matches: Vec<&Relationship> = self
            .by_type
            .iter()
            .filter(|(rel_type, _)| rel_type.ends_with(suffix))
            .flat_map(|(_, rels)| rels.iter())
            .filter(|rel| !rel.external)
            .collect();
        // HashMap order is unstable; pick deterministically.
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.into_iter().next()
    }

    /// Return an ID not used by any relationship in this collection.
    pub fn next_free_id(&self) -> String {
        let mut n = self.by_id.len() + 1;
        loop {
            let candidate = format!("rId{}", n);
            if !self.by_id.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.by_type
            .entry(rel.rel_type.clone())
            .or_default()
            .push(rel.clone());
        self.by_id.insert(rel.id.clone(), rel);
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// Once UTF-16 XML has been decoded into a Rust `String`, the declaration
/// still claims UTF-16 and quick-xml would try to re-decode it.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// Word writes UTF-8, but settings parts produced by older tools are
/// occasionally UTF-16.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec()).map_err(|e| Error::Encoding(e.to_string()));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let content = decode_utf16(rest, u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let content = decode_utf16(rest, u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        // BOM-less UTF-16: ASCII markup leaves a null in every other byte.
        Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
            decode_utf16(bytes, u16::from_le_bytes).map(|s| fix_xml_encoding_declaration(&s))
        }
        Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
            decode_utf16(bytes, u16::from_be_bytes).map(|s| fix_xml_encoding_declaration(&s))
        }
        Err(e) => Err(Error::Encoding(e.to_string())),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Convert writer output back into a `String`.
pub(crate) fn xml_into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::Encoding(e.to_string()))
}

/// Insert `element` as the last child of the root element of `xml`.
///
/// Used to register new entries in `[Content_Types].xml` and `.rels` parts.
/// An empty root (`<Types/>`) is expanded into a start/end pair.
pub fn insert_before_root_end(xml: &str, element: BytesStart<'_>) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut inserted = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && !inserted {
                    writer.write_event(Event::Empty(element.borrow()))?;
                    inserted = true;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) if depth == 0 && !inserted => {
                let end = e.to_end().into_owned();
                writer.write_event(Event::Start(e))?;
                writer.write_event(Event::Empty(element.borrow()))?;
                writer.write_event(Event::End(end))?;
                inserted = true;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !inserted {
        return Err(Error::InvalidData("XML part has no root element".to_string()));
    }
    xml_into_string(writer.into_inner())
}

/// Build the `.rels` part name for a package part.
pub fn relationships_part_name(part_path: &str) -> String {
    if part_path.is_empty() || part_path == "/" {
        return "_rels/.rels".to_string();
    }
    match part_path.rsplit_once('/') {
        Some((parent, filename)) => format!("{}/_rels/{}.rels", parent, filename),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// OOXML container abstraction over a ZIP archive.
///
/// The whole package is held in memory, so a container opened from a path
/// can be saved back over the same path.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docmerge::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("document.docx")?;
    /// # Ok::<(), docmerge::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if !crate::detect::is_zip_file(&data) {
            return Err(Error::UnknownFormat);
        }
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part from the archive as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a binary part from the archive.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == path);
        found
    }

    /// List all parts in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Read and parse the relationships of a part.
    ///
    /// A missing `.rels` part yields an empty collection.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        self.parse_relationships(&relationships_part_name(part_path))
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.parse_relationships("_rels/.rels")
    }

    fn parse_relationships(&self, rels_path: &str) -> Result<Relationships> {
        let content = match self.read_xml(rels_path) {
            Ok(c) => c,
            Err(Error::MissingComponent(_)) => return Ok(Relationships::new()),
            Err(e) => return Err(e),
        };

        if content.trim().is_empty() {
            return Ok(Relationships::new());
        }

        let mut rels = Relationships::new();
        let mut reader = Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event()? {
                Event::Empty(e) | Event::Start(e)
                    if e.name().local_name().as_ref() == b"Relationship" =>
                {
                    let mut rel = Relationship {
                        id: String::new(),
                        rel_type: String::new(),
                        target: String::new(),
                        external: false,
                    };

                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = value,
                            b"TargetMode" => rel.external = value.eq_ignore_ascii_case("external"),
                            _ => {}
                        }
                    }

                    if !rel.id.is_empty() {
                        rels.add(rel);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(rels)
    }

    /// Re-emit the package into `writer`, applying `edits`.
    ///
    /// Entries named in `edits` are written with the new contents in their
    /// original position; every other entry is copied raw (no recompression).
    /// Edits naming parts that do not exist yet are appended at the end.
    pub fn write_to<W: Write + Seek>(&self, writer: W, edits: &PartEdits) -> Result<W> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let mut archive = self.archive.borrow_mut();
        let mut zip = zip::ZipWriter::new(writer);
        let mut written = Vec::new();

        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            let name = file.name().to_string();
            match edits.get(&name) {
                Some(contents) => {
                    drop(file);
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(contents)?;
                    written.push(name);
                }
                None => zip.raw_copy_file(file)?,
            }
        }

        for (name, contents) in edits {
            if !written.contains(name) {
                zip.start_file(name.as_str(), options)?;
                zip.write_all(contents)?;
            }
        }

        Ok(zip.finish()?)
    }

    /// Re-emit the package into memory, applying `edits`.
    pub fn to_bytes(&self, edits: &PartEdits) -> Result<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()), edits)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path`, applying `edits`.
    ///
    /// The package lives in memory, so `path` may be the file it was
    /// opened from.
    pub fn save(&self, path: impl AsRef<Path>, edits: &PartEdits) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = self.write_to(BufWriter::new(file), edits)?;
        writer.flush()?;
        Ok(())
    }

    /// Resolve a relationship target relative to the part that owns it.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_path = Path::new(base);
        let base_dir = base_path.parent().unwrap_or(Path::new(""));

        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}
