//! Owned element tree built from `quick-xml` pull events.
//!
//! Only what section lookup needs is kept: qualified and local names,
//! attributes, child elements and the concatenated descendant text.

use super::error::DocumentFault;
use quick_xml::{
    Reader,
    escape::resolve_predefined_entity,
    events::{BytesStart, Event},
};
use std::fmt::Display;

/// A parsed XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    local_name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Qualified name, including any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Attribute value by qualified name, already unescaped.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of all descendants, in document order.
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a complete document and return its root element.
pub fn parse(content: &str) -> Result<Element, DocumentFault> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = Reader::from_str(content);
    let mut tree = TreeBuilder::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| malformed(&reader, err))?;

        match event {
            Event::Start(start) => {
                tree.flush_text();
                let element = open_element(&start, &reader)?;
                tree.stack.push(element);
            }
            Event::Empty(start) => {
                tree.flush_text();
                let element = open_element(&start, &reader)?;
                tree.close(element)?;
            }
            Event::End(_) => {
                tree.flush_text();
                // quick-xml already rejects mismatched end tags
                let element = tree
                    .stack
                    .pop()
                    .ok_or_else(|| malformed(&reader, "unexpected end tag"))?;
                tree.close(element)?;
            }
            Event::Text(text) => {
                let text = std::str::from_utf8(&text).map_err(|err| malformed(&reader, err))?;
                tree.push_text(text)?;
            }
            Event::GeneralRef(reference) => {
                let name =
                    std::str::from_utf8(&reference).map_err(|err| malformed(&reader, err))?;
                let resolved = resolve_reference(name)
                    .ok_or_else(|| DocumentFault::UnknownEntity(name.to_string()))?;
                tree.push_text(&resolved)?;
            }
            Event::CData(cdata) => {
                tree.flush_text();
                let text = std::str::from_utf8(&cdata).map_err(|err| malformed(&reader, err))?;
                match tree.stack.last_mut() {
                    Some(current) => current.text.push_str(text),
                    None => return Err(DocumentFault::TextOutsideRoot),
                }
            }
            Event::Eof => break,
            // Comments, processing instructions, declarations and doctypes
            // carry no configuration data but still split text runs.
            _ => tree.flush_text(),
        }
    }

    if let Some(open) = tree.stack.last() {
        return Err(DocumentFault::Unclosed(open.name.clone()));
    }
    tree.root.ok_or(DocumentFault::NoRoot)
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
    /// Pending run of adjacent text and references.
    run: String,
}

impl TreeBuilder {
    fn push_text(&mut self, text: &str) -> Result<(), DocumentFault> {
        if self.stack.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(DocumentFault::TextOutsideRoot);
        }
        self.run.push_str(text);
        Ok(())
    }

    /// Attach the pending text run to the open element.
    ///
    /// Whitespace-only runs are formatting between elements and are dropped.
    fn flush_text(&mut self) {
        if self.run.is_empty() {
            return;
        }
        let run = std::mem::take(&mut self.run);
        if run.trim().is_empty() {
            return;
        }
        if let Some(current) = self.stack.last_mut() {
            current.text.push_str(&run);
        }
    }

    fn close(&mut self, element: Element) -> Result<(), DocumentFault> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.text.push_str(&element.text);
                parent.children.push(element);
            }
            None if self.root.is_some() => return Err(DocumentFault::MultipleRoots),
            None => self.root = Some(element),
        }
        Ok(())
    }
}

fn open_element(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, DocumentFault> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|err| malformed(reader, err))?
        .to_string();
    let local_name = std::str::from_utf8(start.local_name().as_ref())
        .map_err(|err| malformed(reader, err))?
        .to_string();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| malformed(reader, err))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|err| malformed(reader, err))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|err| malformed(reader, err))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        local_name,
        attributes,
        ..Default::default()
    })
}

/// Resolve a predefined entity (`amp`) or character reference (`#65`, `#x41`).
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

fn malformed(reader: &Reader<&[u8]>, err: impl Display) -> DocumentFault {
    DocumentFault::Malformed {
        position: reader.error_position(),
        message: err.to_string(),
    }
}

// ============================================================================
// tests
// ============================================================================
