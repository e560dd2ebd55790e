//! Compatibility settings in `word/settings.xml`.
//!
//! Word records the version whose layout rules a document follows in a
//! `w:compat` element. Legacy documents carry behaviour switches
//! (`w:doNotExpandShiftReturn`, `w:useWord2002TableStyleRules`, ...) or an
//! outdated `compatibilityMode` marker there. [`inspect`] reports what a
//! settings part contains and [`rewrite`] replaces it with a single modern
//! marker.

use crate::container::xml_into_string;
use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use std::io::Write;

/// WordprocessingML main namespace.
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// WordprocessingML main namespace in Strict OOXML packages.
pub const WORDML_STRICT_NS: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

/// Namespace URI used by `w:compatSetting` entries written by Word.
pub const WORD_SCHEMA_URI: &str = "http://schemas.microsoft.com/office/word";

/// Name of the compat setting that records the layout version.
pub const COMPATIBILITY_MODE: &str = "compatibilityMode";

/// Compatibility mode written into normalized documents.
pub const MODERN_COMPAT_VERSION: u32 = 16;

/// What a settings part says about compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatSettings {
    /// Number of `w:compat` elements directly under `w:settings`.
    pub compat_elements: usize,
    /// Legacy behaviour switches found inside `w:compat`.
    ///
    /// Plain switches are listed by local name; an outdated mode marker is
    /// listed as `compatibilityMode=<value>`.
    pub legacy_flags: Vec<String>,
    /// Value of the `compatibilityMode` marker, when present and numeric.
    pub compatibility_mode: Option<u32>,
    /// Whether `w:documentProtection` restricts editing to form fields.
    pub forms_protection: bool,
}

impl CompatSettings {
    /// True when the document would be laid out with legacy rules.
    pub fn has_legacy_mode(&self) -> bool {
        !self.legacy_flags.is_empty()
    }
}

/// Empty settings part, used when a package has none.
pub fn empty_settings() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:settings xmlns:w=\"{}\"/>",
        WORDML_NS
    )
}

/// The WordprocessingML namespace `ns` is bound to, Transitional or Strict.
fn wordml_namespace(ns: &ResolveResult<'_>) -> Option<&'static str> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => [WORDML_NS, WORDML_STRICT_NS]
            .into_iter()
            .find(|candidate| *uri == candidate.as_bytes()),
        _ => None,
    }
}

fn is_wordml(ns: &ResolveResult<'_>) -> bool {
    wordml_namespace(ns).is_some()
}

fn attribute(e: &BytesStart<'_>, local_name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local_name)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn is_forms_protection(e: &BytesStart<'_>) -> bool {
    attribute(e, b"edit").as_deref() == Some("forms")
}

/// Classify one child of `w:compat`.
///
/// Returns the legacy flag it represents (`None` for the modern marker) and
/// the compatibility mode it declares, if any.
fn legacy_flag(e: &BytesStart<'_>, target_version: u32) -> (Option<String>, Option<u32>) {
    let local = String::from_utf8_lossy(e.name().local_name().as_ref()).to_string();
    if local != "compatSetting" {
        return (Some(local), None);
    }

    let name = attribute(e, b"name").unwrap_or_default();
    let uri = attribute(e, b"uri").unwrap_or_default();
    let value = attribute(e, b"val").unwrap_or_default();
    if name != COMPATIBILITY_MODE || uri != WORD_SCHEMA_URI {
        let flag = if name.is_empty() { local } else { name };
        return (Some(flag), None);
    }

    match value.trim().parse::<u32>() {
        Ok(version) if version >= target_version => (None, Some(version)),
        Ok(version) => (Some(format!("{}={}", COMPATIBILITY_MODE, version)), Some(version)),
        Err(_) => (Some(format!("{}={}", COMPATIBILITY_MODE, value)), None),
    }
}


#[derive(Default)]
struct Inspector {
    report: CompatSettings,
    in_compat: bool,
}

impl Inspector {
    fn element(
        &mut self,
        depth: usize,
        wordml: bool,
        e: &BytesStart<'_>,
        target_version: u32,
    ) -> Result<()> {
        let local = e.name().local_name();
        match depth {
            0 if !(wordml && local.as_ref() == b"settings") => {
                return Err(Error::InvalidData(
                    "settings part root is not w:settings".to_string(),
                ));
            }
            1 if wordml && local.as_ref() == b"compat" => {
                self.report.compat_elements += 1;
                self.in_compat = true;
            }
            1 if wordml && local.as_ref() == b"documentProtection" => {
                self.report.forms_protection |= is_forms_protection(e);
            }
            2 if self.in_compat => {
                let (flag, mode) = legacy_flag(e, target_version);
                self.report.legacy_flags.extend(flag);
                if mode.is_some() {
                    self.report.compatibility_mode = mode;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Inspect a settings part.
///
/// `target_version` is the compatibility mode considered modern: a
/// `compatibilityMode` marker at or above it is not a legacy flag, so a
/// part produced by [`rewrite`] inspects clean.
pub fn inspect(xml: &str, target_version: u32) -> Result<CompatSettings> {
    let mut reader = NsReader::from_str(xml);
    let mut inspector = Inspector::default();
    let mut depth = 0usize;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let wordml = is_wordml(&ns);
        match event {
            Event::Start(e) => {
                inspector.element(depth, wordml, &e, target_version)?;
                depth += 1;
            }
            Event::Empty(e) => {
                inspector.element(depth, wordml, &e, target_version)?;
                if depth == 1 {
                    inspector.in_compat = false;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    inspector.in_compat = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(inspector.report)
}

/// Prefix to use for new elements, and the namespace to declare with it.
fn root_prefix(
    e: &BytesStart<'_>,
    namespace: Option<&'static str>,
) -> Result<(String, Option<&'static str>)> {
    let name = e.name();
    let namespace = match namespace {
        Some(namespace) if name.local_name().as_ref() == b"settings" => namespace,
        _ => {
            return Err(Error::InvalidData(
                "settings part root is not w:settings".to_string(),
            ))
        }
    };
    Ok(match name.prefix() {
        Some(prefix) => (String::from_utf8_lossy(prefix.as_ref()).to_string(), None),
        // Default namespace: attributes need a bound prefix.
        None => ("w".to_string(), Some(namespace)),
    })
}

/// Elements under `w:settings` that normalization removes.
fn is_dropped(e: &BytesStart<'_>) -> bool {
    match e.name().local_name().as_ref() {
        b"compat" => true,
        b"documentProtection" => is_forms_protection(e),
        _ => false,
    }
}

fn is_compat(e: &BytesStart<'_>) -> bool {
    e.name().local_name().as_ref() == b"compat"
}

fn write_marker<W: Write>(
    writer: &mut Writer<W>,
    prefix: &str,
    declare_ns: Option<&str>,
    version: u32,
) -> Result<()> {
    let compat_name = format!("{}:compat", prefix);
    let mut compat = BytesStart::new(compat_name.as_str());
    if let Some(namespace) = declare_ns {
        compat.push_attribute((format!("xmlns:{}", prefix).as_str(), namespace));
    }

    let version = version.to_string();
    let mut setting = BytesStart::new(format!("{}:compatSetting", prefix));
    setting.push_attribute((format!("{}:name", prefix).as_str(), COMPATIBILITY_MODE));
    setting.push_attribute((format!("{}:uri", prefix).as_str(), WORD_SCHEMA_URI));
    setting.push_attribute((format!("{}:val", prefix).as_str(), version.as_str()));

    writer.write_event(Event::Start(compat))?;
    writer.write_event(Event::Empty(setting))?;
    writer.write_event(Event::End(BytesEnd::new(compat_name.as_str())))?;
    Ok(())
}

/// Rewrite a settings part for modern layout.
///
/// Every `w:compat` element is removed, forms-only `w:documentProtection`
/// is removed (other protection modes stay), and a single `w:compat`
/// holding a `compatibilityMode` marker for `target_version` is written in
/// place of the first removed `w:compat`, or as the last child of
/// `w:settings` when there was none.
pub fn rewrite(xml: &str, target_version: u32) -> Result<String> {
    let mut reader = NsReader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut skipping = 0usize;
    let mut prefix = String::from("w");
    let mut declare_ns = None;
    let mut marker_written = false;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let namespace = wordml_namespace(&ns);
        let wordml = namespace.is_some();
        match event {
            Event::Start(e) => {
                if skipping > 0 {
                    skipping += 1;
                    continue;
                }
                if depth == 0 {
                    (prefix, declare_ns) = root_prefix(&e, namespace)?;
                }
                if depth == 1 && wordml && is_dropped(&e) {
                    if is_compat(&e) && !marker_written {
                        write_marker(&mut writer, &prefix, declare_ns, target_version)?;
                        marker_written = true;
                    }
                    skipping = 1;
                    continue;
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                if skipping > 0 {
                    continue;
                }
                if depth == 0 {
                    (prefix, declare_ns) = root_prefix(&e, namespace)?;
                    let end = e.to_end().into_owned();
                    writer.write_event(Event::Start(e))?;
                    write_marker(&mut writer, &prefix, declare_ns, target_version)?;
                    writer.write_event(Event::End(end))?;
                    marker_written = true;
                    continue;
                }
                if depth == 1 && wordml && is_dropped(&e) {
                    if is_compat(&e) && !marker_written {
                        write_marker(&mut writer, &prefix, declare_ns, target_version)?;
                        marker_written = true;
                    }
                    continue;
                }
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) => {
                if skipping > 0 {
                    skipping -= 1;
                    continue;
                }
                depth = depth.saturating_sub(1);
                if depth == 0 && !marker_written {
                    write_marker(&mut writer, &prefix, declare_ns, target_version)?;
                    marker_written = true;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => {
                if skipping == 0 {
                    writer.write_event(other)?;
                }
            }
        }
    }

    if !marker_written {
        return Err(Error::InvalidData("settings part is empty".to_string()));
    }
    xml_into_string(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:zoom w:percent="100"/>
  <w:documentProtection w:edit="forms" w:enforcement="1"/>
  <w:defaultTabStop w:val="720"/>
  <w:compat>
    <w:doNotExpandShiftReturn/>
    <w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="14"/>
  </w:compat>
  <w:rsids><w:rsidRoot w:val="00A1"/></w:rsids>
</w:settings>"#;

    #[test]
    fn test_inspect_legacy() {
        let report = inspect(LEGACY, MODERN_COMPAT_VERSION).unwrap();
        assert!(report.has_legacy_mode());
        assert_eq!(report.compat_elements, 1);
        assert_eq!(
            report.legacy_flags,
            vec!["doNotExpandShiftReturn", "compatibilityMode=14"]
        );
        assert_eq!(report.compatibility_mode, Some(14));
        assert!(report.forms_protection);
    }

    #[test]
    fn test_inspect_without_compat() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:zoom w:percent="90"/></w:settings>"#;
        let report = inspect(xml, MODERN_COMPAT_VERSION).unwrap();
        assert!(!report.has_legacy_mode());
        assert_eq!(report.compat_elements, 0);
    }

    #[test]
    fn test_empty_compat_is_not_legacy() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:compat/><w:compat></w:compat></w:settings>"#;
        let report = inspect(xml, MODERN_COMPAT_VERSION).unwrap();
        assert_eq!(report.compat_elements, 2);
        assert!(!report.has_legacy_mode());
    }

    #[test]
    fn test_modern_marker_is_not_legacy() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="16"/></w:compat></w:settings>"#;
        let report = inspect(xml, MODERN_COMPAT_VERSION).unwrap();
        assert!(!report.has_legacy_mode());
        assert_eq!(report.compatibility_mode, Some(16));
    }

    #[test]
    fn test_other_compat_settings_are_flags() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:compat><w:compatSetting w:name="overrideTableStyleFontSizeAndJustification" w:uri="http://schemas.microsoft.com/office/word" w:val="1"/></w:compat></w:settings>"#;
        let report = inspect(xml, MODERN_COMPAT_VERSION).unwrap();
        assert_eq!(
            report.legacy_flags,
            vec!["overrideTableStyleFontSizeAndJustification"]
        );
    }

    #[test]
    fn test_nested_elements_are_not_counted() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:compat><w:unknown><w:inner/></w:unknown></w:compat></w:settings>"#;
        let report = inspect(xml, MODERN_COMPAT_VERSION).unwrap();
        assert_eq!(report.legacy_flags, vec!["unknown"]);
    }

    #[test]
    fn test_foreign_root_rejected() {
        let result = inspect("<settings/>", MODERN_COMPAT_VERSION);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_rewrite_legacy() {
        let out = rewrite(LEGACY, MODERN_COMPAT_VERSION).unwrap();

        assert!(!out.contains("doNotExpandShiftReturn"));
        assert!(!out.contains("documentProtection"));
        assert!(out.contains(r#"<w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="16"/></w:compat>"#));
        assert!(out.contains(r#"<w:zoom w:percent="100"/>"#));
        assert!(out.contains(r#"<w:rsidRoot w:val="00A1"/>"#));
        assert_eq!(out.matches("<w:compat>").count(), 1);

        // The marker takes the place of the removed compat element.
        let compat = out.find("<w:compat>").unwrap();
        assert!(out.find("w:defaultTabStop").unwrap() < compat);
        assert!(compat < out.find("w:rsids").unwrap());

        let report = inspect(&out, MODERN_COMPAT_VERSION).unwrap();
        assert!(!report.has_legacy_mode());
        assert!(!report.forms_protection);
    }

    #[test]
    fn test_rewrite_keeps_other_protection() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:documentProtection w:edit="readOnly" w:enforcement="1"/><w:compat><w:useFELayout/></w:compat></w:settings>"#;
        let out = rewrite(xml, MODERN_COMPAT_VERSION).unwrap();
        assert!(out.contains(r#"<w:documentProtection w:edit="readOnly" w:enforcement="1"/>"#));
        assert!(!out.contains("useFELayout"));
    }

    #[test]
    fn test_rewrite_merges_multiple_compat_elements() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:compat><w:a/></w:compat><w:zoom/><w:compat><w:b/></w:compat></w:settings>"#;
        let out = rewrite(xml, 15).unwrap();
        assert_eq!(
            out,
            r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat><w:zoom/></w:settings>"#
        );
    }

    #[test]
    fn test_rewrite_empty_settings() {
        let out = rewrite(&empty_settings(), MODERN_COMPAT_VERSION).unwrap();
        assert!(out.contains(r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:compat>"#));
        assert!(out.ends_with("</w:compat></w:settings>"));
    }

    #[test]
    fn test_rewrite_appends_when_no_compat() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:zoom/></w:settings>"#;
        let out = rewrite(xml, MODERN_COMPAT_VERSION).unwrap();
        assert!(out.starts_with(r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:zoom/><w:compat>"#));
    }

    #[test]
    fn test_rewrite_default_namespace() {
        let xml = r#"<settings xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><compat><balanceSingleByteDoubleByteWidth/></compat></settings>"#;
        let out = rewrite(xml, MODERN_COMPAT_VERSION).unwrap();
        assert!(out.contains(r#"<w:compat xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#));
        assert!(!inspect(&out, MODERN_COMPAT_VERSION)
            .unwrap()
            .has_legacy_mode());
    }

    #[test]
    fn test_inspect_strict_without_compat() {
        let xml = r#"<w:settings xmlns:w="http://purl.oclc.org/ooxml/wordprocessingml/main"><w:zoom w:percent="100"/></w:settings>"#;
        let report = inspect(xml, MODERN_COMPAT_VERSION).unwrap();
        assert!(!report.has_legacy_mode());
        assert_eq!(report.compat_elements, 0);
    }

    #[test]
    fn test_inspect_strict_legacy() {
        let xml = r#"<w:settings xmlns:w="http://purl.oclc.org/ooxml/wordprocessingml/main"><w:documentProtection w:edit="forms"/><w:compat><w:doNotExpandShiftReturn/></w:compat></w:settings>"#;
        let report = inspect(xml, MODERN_COMPAT_VERSION).unwrap();
        assert_eq!(report.legacy_flags, vec!["doNotExpandShiftReturn"]);
        assert!(report.forms_protection);
    }

    #[test]
    fn test_rewrite_strict_default_namespace() {
        let xml = r#"<settings xmlns="http://purl.oclc.org/ooxml/wordprocessingml/main"><compat><useFELayout/></compat></settings>"#;
        let out = rewrite(xml, MODERN_COMPAT_VERSION).unwrap();
        assert!(out.contains(r#"<w:compat xmlns:w="http://purl.oclc.org/ooxml/wordprocessingml/main">"#));
        assert!(!out.contains("useFELayout"));
        assert!(!inspect(&out, MODERN_COMPAT_VERSION)
            .unwrap()
            .has_legacy_mode());
    }

    #[test]
    fn test_rewrite_is_stable() {
        let once = rewrite(LEGACY, MODERN_COMPAT_VERSION).unwrap();
        let twice = rewrite(&once, MODERN_COMPAT_VERSION).unwrap();
        assert_eq!(once, twice);
    }
}
