//! Visible text of a main document part.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extract the visible text of a main document part.
///
/// Paragraphs end with a newline; `w:tab` and `w:br` become a tab and a
/// newline. Deleted text and field instructions are not visible and are
/// skipped.
pub fn document_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Event::Empty(e) => match e.name().local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" | b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let unescaped = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) if in_text => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::End(e) => match e.name().local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
