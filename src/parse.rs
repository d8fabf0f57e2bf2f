use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::tree::{Document, NodeId};

/// Reads and parses an XML file into an arena [`Document`].
///
/// Namespace prefixes on tag names are stripped during the build, before any
/// name-based lookup can run against the tree. A malformed document is a hard
/// error naming the input path; no partial tree is returned.
pub fn load_document(path: &Path) -> Result<Document> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    parse_document(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn parse_document(raw: &str) -> Result<Document> {
    let mut reader = Reader::from_str(raw);
    let mut document: Option<Document> = None;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .with_context(|| format!("malformed XML at byte {position}"))?;

        match event {
            Event::Start(start) => {
                let id = open_element(&mut document, &stack, &start)?;
                stack.push(id);
            }
            Event::Empty(start) => {
                open_element(&mut document, &stack, &start)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .with_context(|| format!("invalid text content at byte {position}"))?;
                append_text(&mut document, &stack, &value);
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                append_text(&mut document, &stack, &value);
            }
            // Comments, processing instructions, doctype and the XML
            // declaration are not part of the record model.
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) | Event::Decl(_) => {}
            Event::Eof => break,
        }
    }

    match document {
        Some(doc) => Ok(doc),
        None => bail!("document contains no root element"),
    }
}

fn open_element(
    document: &mut Option<Document>,
    stack: &[NodeId],
    start: &BytesStart<'_>,
) -> Result<NodeId> {
    let tag = local_name(start.name().as_ref());
    let attributes = collect_attributes(start)?;

    if let (Some(parent), Some(doc)) = (stack.last().copied(), document.as_mut()) {
        let id = doc.new_element(&tag, attributes);
        doc.append_child(parent, id);
        return Ok(id);
    }

    if document.is_some() {
        bail!("document has more than one root element");
    }

    let mut doc = Document::new(&tag);
    let root = doc.root();
    doc.set_attributes(root, attributes);
    *document = Some(doc);
    Ok(root)
}

fn append_text(document: &mut Option<Document>, stack: &[NodeId], value: &str) {
    // Inter-element whitespace carries no data and would fight the
    // pretty-printer, so only non-blank text survives.
    if value.trim().is_empty() {
        return;
    }
    let Some(parent) = stack.last().copied() else {
        return;
    };
    if let Some(doc) = document.as_mut() {
        let text = doc.new_text(value);
        doc.append_child(parent, text);
    }
}

fn collect_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.context("malformed attribute")?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        if is_namespace_declaration(&key) {
            continue;
        }
        let value = attribute
            .unescape_value()
            .with_context(|| format!("invalid value for attribute '{key}'"))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn local_name(qualified: &[u8]) -> String {
    let name = String::from_utf8_lossy(qualified);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.into_owned(),
    }
}

fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}
