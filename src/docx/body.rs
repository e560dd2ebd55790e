//! Body concatenation for main document parts.
//!
//! The first document acts as the template: its `w:document` root, its
//! final `w:sectPr` and every part it references stay as they are. Bodies of
//! later documents are lifted out with [`extract_body`] and spliced in front
//! of the template's final section properties by [`append_bodies`].

use crate::container::xml_into_string;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Elements that only make sense together with the relationships or
/// auxiliary parts of their own package.
const RELATIONSHIP_BOUND: &[&[u8]] = &[
    b"sectPr",
    b"drawing",
    b"pict",
    b"object",
    b"AlternateContent",
    b"altChunk",
    b"subDoc",
    b"footnoteReference",
    b"endnoteReference",
    b"commentReference",
    b"commentRangeStart",
    b"commentRangeEnd",
];

/// Body content of a document, ready to be appended to another package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyFragment {
    /// Serialized children of `w:body`, final section properties excluded.
    pub content: String,
    /// `xmlns:*` declarations of the source root element.
    pub namespaces: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeBody,
    /// Inside `w:body`, which is open at this depth.
    InBody(usize),
    AfterBody,
}

fn is_relationship_bound(e: &BytesStart<'_>) -> bool {
    RELATIONSHIP_BOUND.contains(&e.name().local_name().as_ref())
}

/// A hyperlink pointing at an external target through `r:id`.
fn is_related_hyperlink(e: &BytesStart<'_>) -> bool {
    e.name().local_name().as_ref() == b"hyperlink"
        && e.attributes()
            .flatten()
            .any(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id")
}

fn namespace_declarations(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.attributes()
        .flatten()
        .filter(|attr| attr.key.as_ref().starts_with(b"xmlns:"))
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                String::from_utf8_lossy(&attr.value).to_string(),
            )
        })
        .collect()
}

fn is_body(e: &BytesStart<'_>) -> bool {
    e.name().local_name().as_ref() == b"body"
}

fn is_section_properties(e: &BytesStart<'_>) -> bool {
    e.name().local_name().as_ref() == b"sectPr"
}

/// Lift the body content out of a main document part.
///
/// Relationship-bound content (drawings, embedded objects, note and comment
/// references, section properties) is dropped because its targets do not
/// exist in the receiving package. Hyperlinks with an `r:id` are unwrapped
/// so their text survives.
pub fn extract_body(xml: &str) -> Result<BodyFragment> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut namespaces = Vec::new();
    let mut position = Position::BeforeBody;
    let mut depth = 0usize;
    let mut skipping = 0usize;
    let mut unwrapped: Vec<usize> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if skipping > 0 {
                    skipping += 1;
                    continue;
                }
                if depth == 0 {
                    namespaces = namespace_declarations(&e);
                }
                depth += 1;
                match position {
                    Position::BeforeBody if is_body(&e) => position = Position::InBody(depth),
                    Position::InBody(_) if is_relationship_bound(&e) => {
                        depth -= 1;
                        skipping = 1;
                    }
                    Position::InBody(_) if is_related_hyperlink(&e) => unwrapped.push(depth),
                    Position::InBody(_) => writer.write_event(Event::Start(e))?,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if skipping > 0 {
                    continue;
                }
                if depth == 0 {
                    namespaces = namespace_declarations(&e);
                }
                match position {
                    Position::BeforeBody if is_body(&e) => position = Position::AfterBody,
                    Position::InBody(_) if is_relationship_bound(&e) => {}
                    Position::InBody(_) => writer.write_event(Event::Empty(e))?,
                    _ => {}
                }
            }
            Event::End(e) => {
                if skipping > 0 {
                    skipping -= 1;
                    continue;
                }
                match position {
                    Position::InBody(body_depth) if body_depth == depth => {
                        position = Position::AfterBody;
                    }
                    Position::InBody(_) if unwrapped.last() == Some(&depth) => {
                        unwrapped.pop();
                    }
                    Position::InBody(_) => writer.write_event(Event::End(e))?,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            other => {
                if skipping == 0 && matches!(position, Position::InBody(_)) {
                    writer.write_event(other)?;
                }
            }
        }
    }

    Ok(BodyFragment {
        content: xml_into_string(writer.into_inner())?,
        namespaces,
    })
}

/// Layout facts about the template document.
#[derive(Debug, Default)]
struct TemplateLayout {
    /// Prefix of the `w:body` element, used for inserted paragraphs.
    prefix: Option<String>,
    /// Serialized final `w:sectPr`.
    section: Option<String>,
}

fn template_layout(xml: &str) -> Result<TemplateLayout> {
    let mut reader = Reader::from_str(xml);
    let mut layout = TemplateLayout::default();
    let mut capture: Option<Writer<Vec<u8>>> = None;
    let mut body_depth = None;
    let mut depth = 0usize;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) => {
                if body_depth.is_none() && is_body(e) {
                    body_depth = Some(depth + 1);
                    layout.prefix = e
                        .name()
                        .prefix()
                        .map(|p| String::from_utf8_lossy(p.as_ref()).to_string());
                } else if body_depth == Some(depth) && is_section_properties(e) {
                    capture = Some(Writer::new(Vec::new()));
                }
                depth += 1;
            }
            Event::Empty(e) if body_depth == Some(depth) && is_section_properties(e) => {
                layout.section = Some(format!("<{}/>", String::from_utf8_lossy(e)));
                continue;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }

        if let Some(writer) = capture.as_mut() {
            writer.write_event(event)?;
            if body_depth == Some(depth) {
                if let Some(done) = capture.take() {
                    layout.section = Some(xml_into_string(done.into_inner())?);
                }
            }
        }
    }

    Ok(layout)
}

fn is_paragraph(e: &BytesStart<'_>) -> bool {
    e.name().local_name().as_ref() == b"p"
}

fn is_paragraph_properties(e: &BytesStart<'_>) -> bool {
    e.name().local_name().as_ref() == b"pPr"
}

/// `w:pPrChange` must stay the last child of `w:pPr`.
fn is_properties_change(e: &BytesStart<'_>) -> bool {
    e.name().local_name().as_ref() == b"pPrChange"
}

fn element_prefix(e: &BytesStart<'_>) -> String {
    e.name()
        .prefix()
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}

/// Ordinal of the last top-level element of `content`, if it is a
/// paragraph that does not already end a section.
fn last_paragraph(content: &str) -> Result<Option<usize>> {
    let mut reader = Reader::from_str(content);
    let mut depth = 0usize;
    let mut ordinal = 0usize;
    let mut last: Option<(usize, bool)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 {
                    ordinal += 1;
                    last = Some((ordinal, is_paragraph(&e)));
                } else if is_section_properties(&e) {
                    if let Some(last) = last.as_mut() {
                        last.1 = false;
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    ordinal += 1;
                    last = Some((ordinal, is_paragraph(&e)));
                } else if is_section_properties(&e) {
                    if let Some(last) = last.as_mut() {
                        last.1 = false;
                    }
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(last.and_then(|(ordinal, paragraph)| paragraph.then_some(ordinal)))
}

enum Attach {
    Pending,
    /// Inside the target paragraph, before its first child.
    FirstChild(String),
    /// Inside the target paragraph's `w:pPr`.
    InProperties,
    Done,
}

fn write_properties(writer: &mut Writer<Vec<u8>>, prefix: &str, section: &str) -> Result<()> {
    write!(writer.get_mut(), "<{prefix}pPr>{section}</{prefix}pPr>")?;
    Ok(())
}

/// Make `content` end a section laid out by `section`.
///
/// The section properties go into the last paragraph. When `content` does
/// not end with a paragraph that can take them, a paragraph carrying only
/// the section properties is appended.
fn end_section(content: &str, section: &str, layout: &TemplateLayout) -> Result<String> {
    let Some(target) = last_paragraph(content)? else {
        let p = layout
            .prefix
            .as_deref()
            .map(|prefix| format!("{}:", prefix))
            .unwrap_or_default();
        return Ok(format!("{content}<{p}p><{p}pPr>{section}</{p}pPr></{p}p>"));
    };

    let mut reader = Reader::from_str(content);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut ordinal = 0usize;
    let mut state = Attach::Pending;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 {
                    ordinal += 1;
                }
                match &state {
                    Attach::Pending if depth == 0 && ordinal == target => {
                        state = Attach::FirstChild(element_prefix(&e));
                    }
                    Attach::FirstChild(prefix) if depth == 1 => {
                        if is_paragraph_properties(&e) {
                            state = Attach::InProperties;
                        } else {
                            write_properties(&mut writer, prefix, section)?;
                            state = Attach::Done;
                        }
                    }
                    Attach::InProperties if depth == 2 && is_properties_change(&e) => {
                        writer.get_mut().write_all(section.as_bytes())?;
                        state = Attach::Done;
                    }
                    _ => {}
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    ordinal += 1;
                }
                match &state {
                    Attach::Pending if depth == 0 && ordinal == target => {
                        let prefix = element_prefix(&e);
                        let end = e.to_end().into_owned();
                        writer.write_event(Event::Start(e))?;
                        write_properties(&mut writer, &prefix, section)?;
                        writer.write_event(Event::End(end))?;
                        state = Attach::Done;
                        continue;
                    }
                    Attach::FirstChild(_) if depth == 1 && is_paragraph_properties(&e) => {
                        let end = e.to_end().into_owned();
                        writer.write_event(Event::Start(e))?;
                        writer.get_mut().write_all(section.as_bytes())?;
                        writer.write_event(Event::End(end))?;
                        state = Attach::Done;
                        continue;
                    }
                    Attach::FirstChild(prefix) if depth == 1 => {
                        write_properties(&mut writer, prefix, section)?;
                        state = Attach::Done;
                    }
                    Attach::InProperties if depth == 2 && is_properties_change(&e) => {
                        writer.get_mut().write_all(section.as_bytes())?;
                        state = Attach::Done;
                    }
                    _ => {}
                }
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match &state {
                    Attach::FirstChild(prefix) if depth == 0 => {
                        write_properties(&mut writer, prefix, section)?;
                        state = Attach::Done;
                    }
                    Attach::InProperties if depth == 1 => {
                        writer.get_mut().write_all(section.as_bytes())?;
                        state = Attach::Done;
                    }
                    _ => {}
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    xml_into_string(writer.into_inner())
}

/// Concatenate the template's body content with every fragment.
///
/// A fragment whose flag is set starts a new section: the content before
/// it ends with a copy of the template's final section properties.
fn join_bodies(
    template: String,
    fragments: &[(BodyFragment, bool)],
    layout: &TemplateLayout,
) -> Result<String> {
    let mut joined = String::new();
    let mut previous = template;
    for (fragment, keep_sections) in fragments {
        if let (true, Some(section)) = (*keep_sections, layout.section.as_deref()) {
            previous = end_section(&previous, section, layout)?;
        }
        joined.push_str(&previous);
        previous = fragment.content.clone();
    }
    joined.push_str(&previous);
    Ok(joined)
}

/// Append `fragments` to the body of the template document `base_xml`.
///
/// Fragments are inserted in order in front of the template's final
/// `w:sectPr`. When a fragment's flag is set, the content before it ends a
/// section with a copy of the template's final section properties, so the
/// appended content starts a new section with the template's layout.
/// Namespace declarations used by fragments and missing from the template
/// root are added to it.
pub fn append_bodies(base_xml: &str, fragments: &[(BodyFragment, bool)]) -> Result<String> {
    let layout = template_layout(base_xml)?;
    let mut reader = Reader::from_str(base_xml);
    let mut writer = Writer::new(Vec::new());
    // Template body content, held back until the insertion point.
    let mut body: Option<Writer<Vec<u8>>> = None;
    let mut body_depth = None;
    let mut depth = 0usize;
    let mut inserted = false;

    let insert = |writer: &mut Writer<Vec<u8>>, body: &mut Option<Writer<Vec<u8>>>| {
        let template = match body.take() {
            Some(held) => xml_into_string(held.into_inner())?,
            None => String::new(),
        };
        let joined = join_bodies(template, fragments, &layout)?;
        writer.get_mut().write_all(joined.as_bytes())?;
        Ok::<(), Error>(())
    };

    loop {
        let event = reader.read_event()?;
        let at_body_level = !inserted && body_depth == Some(depth);
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    let root = with_namespaces(e, fragments);
                    writer.write_event(Event::Start(root))?;
                } else if at_body_level && is_section_properties(&e) {
                    insert(&mut writer, &mut body)?;
                    inserted = true;
                    writer.write_event(Event::Start(e))?;
                } else if let Some(held) = body.as_mut() {
                    held.write_event(Event::Start(e))?;
                } else {
                    if body_depth.is_none() && is_body(&e) {
                        body_depth = Some(depth + 1);
                        body = Some(Writer::new(Vec::new()));
                    }
                    writer.write_event(Event::Start(e))?;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if at_body_level && is_section_properties(&e) {
                    insert(&mut writer, &mut body)?;
                    inserted = true;
                    writer.write_event(Event::Empty(e))?;
                } else if let Some(held) = body.as_mut() {
                    held.write_event(Event::Empty(e))?;
                } else if body_depth.is_none() && depth > 0 && is_body(&e) {
                    // Empty template body: expand it around the fragments.
                    let end = e.to_end().into_owned();
                    writer.write_event(Event::Start(e))?;
                    insert(&mut writer, &mut body)?;
                    inserted = true;
                    writer.write_event(Event::End(end))?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                if at_body_level {
                    insert(&mut writer, &mut body)?;
                    inserted = true;
                }
                depth = depth.saturating_sub(1);
                match body.as_mut() {
                    Some(held) => held.write_event(Event::End(e))?,
                    None => writer.write_event(Event::End(e))?,
                }
            }
            Event::Eof => break,
            other => match body.as_mut() {
                Some(held) => held.write_event(other)?,
                None => writer.write_event(other)?,
            },
        }
    }

    if !inserted {
        return Err(Error::MissingComponent("w:body".to_string()));
    }
    xml_into_string(writer.into_inner())
}

fn with_namespaces<'a>(root: BytesStart<'a>, fragments: &[(BodyFragment, bool)]) -> BytesStart<'a> {
    let declared: Vec<Vec<u8>> = root
        .attributes()
        .flatten()
        .map(|attr| attr.key.as_ref().to_vec())
        .collect();

    let mut root = root;
    let mut added: Vec<&str> = Vec::new();
    for (key, value) in fragments.iter().flat_map(|(f, _)| f.namespaces.iter()) {
        if declared.iter().any(|d| d == key.as_bytes()) || added.contains(&key.as_str()) {
            continue;
        }
        root.push_attribute((key.as_str(), value.as_str()));
        added.push(key);
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    fn document(body: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W}><w:body>{body}</w:body></w:document>"#)
    }

    const SECTION: &str = r#"<w:sectPr><w:headerReference w:type="default" r:id="rId7"/><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#;

    #[test]
    fn test_extract_body_drops_final_section() {
        let xml = document(&format!("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>{SECTION}"));
        let fragment = extract_body(&xml).unwrap();
        assert_eq!(fragment.content, "<w:p><w:r><w:t>Hello</w:t></w:r></w:p>");
        assert_eq!(fragment.namespaces.len(), 2);
        assert_eq!(fragment.namespaces[0].0, "xmlns:w");
    }

    #[test]
    fn test_extract_body_drops_relationship_bound_content() {
        let xml = document(concat!(
            r#"<w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r>"#,
            r#"<w:r><w:t>Text</w:t><w:footnoteReference w:id="1"/></w:r>"#,
            r#"<w:hyperlink r:id="rId9"><w:r><w:t>Link</w:t></w:r></w:hyperlink>"#,
            r#"<w:hyperlink w:anchor="top"><w:r><w:t>Anchor</w:t></w:r></w:hyperlink></w:p>"#,
        ));
        let fragment = extract_body(&xml).unwrap();
        assert_eq!(
            fragment.content,
            concat!(
                "<w:p><w:r></w:r><w:r><w:t>Text</w:t></w:r>",
                "<w:r><w:t>Link</w:t></w:r>",
                r#"<w:hyperlink w:anchor="top"><w:r><w:t>Anchor</w:t></w:r></w:hyperlink></w:p>"#
            )
        );
    }

    #[test]
    fn test_extract_empty_body() {
        let xml = format!(r#"<w:document {W}><w:body/></w:document>"#);
        assert_eq!(extract_body(&xml).unwrap().content, "");
    }

    #[test]
    fn test_append_keeps_order_and_template_section() {
        let base = document(&format!("<w:p><w:r><w:t>A</w:t></w:r></w:p>{SECTION}"));
        let b = extract_body(&document("<w:p><w:r><w:t>B</w:t></w:r></w:p>")).unwrap();
        let c = extract_body(&document("<w:p><w:r><w:t>C</w:t></w:r></w:p>")).unwrap();

        let merged = append_bodies(&base, &[(b, false), (c, false)]).unwrap();
        let a_at = merged.find(">A<").unwrap();
        let b_at = merged.find(">B<").unwrap();
        let c_at = merged.find(">C<").unwrap();
        let sect_at = merged.find("<w:sectPr>").unwrap();
        assert!(a_at < b_at && b_at < c_at && c_at < sect_at);
        assert_eq!(merged.matches("<w:sectPr>").count(), 1);
    }

    #[test]
    fn test_append_with_section_breaks() {
        let base = document(&format!("<w:p><w:r><w:t>A</w:t></w:r></w:p>{SECTION}"));
        let b = extract_body(&document("<w:p><w:r><w:t>B</w:t></w:r></w:p>")).unwrap();

        let merged = append_bodies(&base, &[(b, true)]).unwrap();
        let expected_break =
            format!("<w:p><w:pPr>{SECTION}</w:pPr><w:r><w:t>A</w:t></w:r></w:p><w:p><w:r><w:t>B</w:t>");
        assert!(merged.contains(&expected_break), "{merged}");
        assert_eq!(merged.matches("<w:sectPr>").count(), 2);
        assert_eq!(merged.matches("<w:p>").count(), 2);
    }

    #[test]
    fn test_section_break_joins_existing_paragraph_properties() {
        let base = document(&format!(
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:pPrChange w:id="1"><w:pPr/></w:pPrChange></w:pPr><w:r><w:t>A</w:t></w:r></w:p>{SECTION}"#
        ));
        let b = extract_body(&document("<w:p><w:r><w:t>B</w:t></w:r></w:p>")).unwrap();
        let c = extract_body(&document(r#"<w:p><w:pPr/></w:p>"#)).unwrap();
        let d = extract_body(&document("<w:p><w:r><w:t>D</w:t></w:r></w:p>")).unwrap();

        let merged = append_bodies(&base, &[(b, true), (c, true), (d, true)]).unwrap();
        assert!(merged.contains(&format!(
            r#"<w:pPr><w:jc w:val="center"/>{SECTION}<w:pPrChange w:id="1">"#
        )));
        assert!(merged.contains(&format!(
            "<w:p><w:pPr>{SECTION}</w:pPr><w:r><w:t>B</w:t></w:r></w:p>"
        )));
        assert!(merged.contains(&format!("<w:p><w:pPr>{SECTION}</w:pPr></w:p><w:p><w:r><w:t>D</w:t>")));
        assert_eq!(merged.matches("<w:sectPr>").count(), 4);
    }

    #[test]
    fn test_section_break_after_table_uses_own_paragraph() {
        let base = document(&format!(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc></w:tr></w:tbl>{SECTION}"
        ));
        let b = extract_body(&document("<w:p><w:r><w:t>B</w:t></w:r></w:p>")).unwrap();

        let merged = append_bodies(&base, &[(b, true)]).unwrap();
        assert!(merged.contains(&format!(
            "</w:tbl><w:p><w:pPr>{SECTION}</w:pPr></w:p><w:p><w:r><w:t>B</w:t>"
        )));
        assert!(merged.contains("<w:tc><w:p><w:r><w:t>A</w:t>"));
    }

    #[test]
    fn test_empty_paragraph_takes_section_break() {
        let base = document(&format!("<w:p/>{SECTION}"));
        let b = extract_body(&document("<w:p><w:r><w:t>B</w:t></w:r></w:p>")).unwrap();

        let merged = append_bodies(&base, &[(b, true)]).unwrap();
        assert!(merged.contains(&format!(
            "<w:body><w:p><w:pPr>{SECTION}</w:pPr></w:p><w:p><w:r><w:t>B</w:t>"
        )));
    }

    #[test]
    fn test_append_without_template_section() {
        let base = document("<w:p><w:r><w:t>A</w:t></w:r></w:p>");
        let b = extract_body(&document("<w:p><w:r><w:t>B</w:t></w:r></w:p>")).unwrap();

        let merged = append_bodies(&base, &[(b, true)]).unwrap();
        assert!(merged.ends_with(
            "<w:p><w:r><w:t>A</w:t></w:r></w:p><w:p><w:r><w:t>B</w:t></w:r></w:p></w:body></w:document>"
        ));
    }

    #[test]
    fn test_append_declares_missing_namespaces() {
        let base = document("<w:p/>");
        let other = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml"><w:body><w:p w14:paraId="1"/></w:body></w:document>"#;
        let fragment = extract_body(other).unwrap();

        let merged = append_bodies(&base, &[(fragment, false)]).unwrap();
        assert!(merged.contains(r#"xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml">"#));
        assert_eq!(merged.matches("xmlns:w=").count(), 1);
    }

    #[test]
    fn test_append_into_empty_body() {
        let base = format!(r#"<w:document {W}><w:body/></w:document>"#);
        let b = extract_body(&document("<w:p/>")).unwrap();
        let merged = append_bodies(&base, &[(b, true)]).unwrap();
        assert!(merged.ends_with("<w:body><w:p/></w:body></w:document>"));
    }
}
