//! Sample document generation.
//!
//! Builds small but complete `.docx` packages for the CLI `--create-test`
//! flag, the test suite and the benchmarks.

use crate::docx::settings::{COMPATIBILITY_MODE, WORDML_NS, WORDML_STRICT_NS, WORD_SCHEMA_URI};
use crate::error::Result;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const PACKAGE_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
const CORE_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const STRICT_RELATIONSHIPS_NS: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships";

/// Builder for a minimal word-processing document.
#[derive(Debug, Clone)]
pub struct SampleDocument {
    title: String,
    paragraphs: Vec<String>,
    legacy_compat: Option<u32>,
    forms_protection: bool,
    settings: bool,
    strict: bool,
}

impl SampleDocument {
    /// Start a document whose first paragraph is `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            paragraphs: Vec::new(),
            legacy_compat: None,
            forms_protection: false,
            settings: true,
            strict: false,
        }
    }

    /// Append a body paragraph.
    pub fn with_paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    /// Add a legacy `w:compat` block declaring compatibility mode `version`.
    pub fn with_legacy_compat(mut self, version: u32) -> Self {
        self.legacy_compat = Some(version);
        self
    }

    /// Restrict editing to form fields.
    pub fn with_forms_protection(mut self) -> Self {
        self.forms_protection = true;
        self
    }

    /// Leave out the settings part entirely.
    pub fn without_settings(mut self) -> Self {
        self.settings = false;
        self
    }

    /// Use the Strict OOXML namespaces instead of the Transitional ones.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn wordml_ns(&self) -> &'static str {
        if self.strict {
            WORDML_STRICT_NS
        } else {
            WORDML_NS
        }
    }

    fn relationships_ns(&self) -> &'static str {
        if self.strict {
            STRICT_RELATIONSHIPS_NS
        } else {
            RELATIONSHIPS_NS
        }
    }

    /// Build the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut parts = vec![
            ("[Content_Types].xml", self.content_types()),
            ("_rels/.rels", self.package_relationships()),
            ("docProps/core.xml", self.core_properties()),
            ("word/_rels/document.xml.rels", self.document_relationships()),
            ("word/document.xml", self.document_xml()),
        ];
        if self.settings {
            parts.push(("word/settings.xml", self.settings_xml()));
        }

        for (name, contents) in parts {
            zip.start_file(name, options)?;
            zip.write_all(contents.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the package to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn package_relationships(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="{}" Target="docProps/core.xml"/>
</Relationships>"#,
            PACKAGE_RELATIONSHIPS_NS,
            self.relationships_ns(),
            CORE_PROPERTIES_REL
        )
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
"#,
        );
        if self.settings {
            xml.push_str(
                r#"  <Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>
"#,
            );
        }
        xml.push_str("</Types>");
        xml
    }

    fn core_properties(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>{}</dc:title>
  <dc:creator>docmerge</dc:creator>
</cp:coreProperties>"#,
            escape(self.title.as_str())
        )
    }

    fn document_relationships(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">\n",
            PACKAGE_RELATIONSHIPS_NS
        );
        if self.settings {
            xml.push_str(&format!(
                "  <Relationship Id=\"rId1\" Type=\"{}/settings\" Target=\"settings.xml\"/>\n",
                self.relationships_ns()
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn document_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{}\" xmlns:r=\"{}\">\n  <w:body>\n",
            self.wordml_ns(),
            self.relationships_ns()
        );

        xml.push_str(&format!(
            "    <w:p><w:r><w:rPr><w:b/><w:sz w:val=\"32\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\n",
            escape(self.title.as_str())
        ));
        for paragraph in &self.paragraphs {
            xml.push_str(&format!(
                "    <w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\n",
                escape(paragraph.as_str())
            ));
        }

        xml.push_str(concat!(
            "    <w:sectPr>",
            "<w:pgSz w:w=\"12240\" w:h=\"15840\"/>",
            "<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/>",
            "</w:sectPr>\n",
            "  </w:body>\n</w:document>"
        ));
        xml
    }

    fn settings_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:settings xmlns:w=\"{}\">\n  <w:zoom w:percent=\"100\"/>\n",
            self.wordml_ns()
        );
        if self.forms_protection {
            xml.push_str("  <w:documentProtection w:edit=\"forms\" w:enforcement=\"1\"/>\n");
        }
        xml.push_str("  <w:defaultTabStop w:val=\"720\"/>\n");
        if let Some(version) = self.legacy_compat {
            xml.push_str(&format!(
                concat!(
                    "  <w:compat>\n",
                    "    <w:doNotExpandShiftReturn/>\n",
                    "    <w:useWord2002TableStyleRules/>\n",
                    "    <w:compatSetting w:name=\"{}\" w:uri=\"{}\" w:val=\"{}\"/>\n",
                    "  </w:compat>\n"
                ),
                COMPATIBILITY_MODE, WORD_SCHEMA_URI, version
            ));
        }
        xml.push_str("</w:settings>");
        xml
    }
}

/// Write the standard sample set into `dir`.
///
/// Two plain documents and one carrying legacy compatibility settings and
/// forms protection. Returns the written paths in merge order.
pub fn create_test_set(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let documents = [
        (
            "test1.docx",
            SampleDocument::new("Document 1")
                .with_paragraph("This is the first test document.")
                .with_paragraph("It uses the modern layout rules."),
        ),
        (
            "test2.docx",
            SampleDocument::new("Document 2")
                .with_paragraph("This is the second test document.")
                .with_paragraph("Its content follows the first document."),
        ),
        (
            "test3_legacy_compat.docx",
            SampleDocument::new("Legacy Document")
                .with_paragraph("This document was saved in compatibility mode.")
                .with_legacy_compat(14)
                .with_forms_protection(),
        ),
    ];

    let mut paths = Vec::with_capacity(documents.len());
    for (name, document) in documents {
        let path = dir.join(name);
        document.write_to(&path)?;
        paths.push(path);
    }
    Ok(paths)
}
