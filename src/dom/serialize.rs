//! Tree re-serialization.
//!
//! Output is stable but not byte-identical to the input: empty elements
//! always self-close and escaping is normalized by quick-xml's writer.
//! What is guaranteed is the structural round trip — reparsing the output
//! yields a tree equal to the one that was serialized.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

use super::{Document, Element, Node};
use crate::InlineError;

/// Render the full document (prolog, comments, elements) back to bytes.
pub fn serialize_document(doc: &Document) -> Result<Vec<u8>, InlineError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    for node in &doc.nodes {
        write_node(&mut writer, node)?;
    }
    Ok(writer.into_inner().into_inner())
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &Node) -> Result<(), InlineError> {
    match node {
        Node::Element(el) => write_element(writer, el),
        Node::Text(text) => write_event(writer, Event::Text(BytesText::new(text))),
        Node::CData(content) => {
            if content.contains("]]>") {
                // Cannot appear inside a CDATA section; fall back to escaped text.
                write_event(writer, Event::Text(BytesText::new(content)))
            } else {
                write_event(writer, Event::CData(BytesCData::new(content.as_str())))
            }
        }
        Node::Misc(event) => write_event(writer, event.clone()),
    }
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, el: &Element) -> Result<(), InlineError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (name, value) in el.attributes.iter() {
        start.push_attribute((name, value));
    }

    if el.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    write_event(writer, Event::End(BytesEnd::new(el.name.as_str())))
}

fn write_event(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    event: Event<'_>,
) -> Result<(), InlineError> {
    writer
        .write_event(event)
        .map_err(|e| InlineError::Serialize(e.to_string()))
}
