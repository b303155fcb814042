//! XML-mode document parsing.
//!
//! Strict XML, no HTML recovery heuristics: quick-xml's reader rejects
//! mismatched tags and mangled markup, and everything it accepts is kept
//! verbatim — unknown namespaces, prefixed attribute names, prolog events.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Attributes, Document, Element, Node};
use crate::InlineError;

/// Parse raw bytes into a [`Document`].
///
/// Entities are decoded: predefined (`&lt;` etc.) and numeric character
/// references become their characters, unknown general references stay in
/// the text verbatim. Attribute and child order is preserved exactly.
pub fn parse_document(bytes: &[u8]) -> Result<Document, InlineError> {
    let text =
        std::str::from_utf8(bytes).map_err(|e| InlineError::parse_at(e.valid_up_to() as u64, e))?;
    let mut reader = Reader::from_str(text);

    let mut nodes: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                stack.push(element_from_start(&start, position)?);
            }
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start, position)?;
                push_node(&mut stack, &mut nodes, Node::Element(element));
            }
            Ok(Event::End(_)) => {
                // The reader already checked that the name matches.
                let element = stack
                    .pop()
                    .ok_or_else(|| InlineError::parse_at(position, "unexpected closing tag"))?;
                push_node(&mut stack, &mut nodes, Node::Element(element));
            }
            Ok(Event::Text(t)) => {
                let decoded = match t.decode() {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                push_text(&mut stack, &mut nodes, &decoded);
            }
            Ok(Event::GeneralRef(r)) => {
                let name = String::from_utf8_lossy(&r).into_owned();
                push_text(&mut stack, &mut nodes, &resolve_reference(&name));
            }
            Ok(Event::CData(c)) => {
                let content = String::from_utf8_lossy(&c).into_owned();
                push_node(&mut stack, &mut nodes, Node::CData(content));
            }
            Ok(
                event @ (Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_)),
            ) => {
                push_node(&mut stack, &mut nodes, Node::Misc(event.into_owned()));
            }
            Ok(Event::Eof) => {
                if let Some(open) = stack.last() {
                    return Err(InlineError::parse_at(
                        position,
                        format!("unclosed element `{}`", open.name),
                    ));
                }
                break;
            }
            Err(e) => {
                return Err(InlineError::parse_at(reader.error_position(), e));
            }
        }
    }

    Ok(Document { nodes })
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, InlineError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Attributes::default();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| InlineError::parse_at(position, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(cow) => cow.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attributes.set(key, value);
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Attach a finished node to the innermost open element, or to the document
/// if none is open.
fn push_node(stack: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

/// Append character data, merging with a preceding text node so entity
/// references split into separate reader events form one node.
fn push_text(stack: &mut [Element], nodes: &mut Vec<Node>, text: &str) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => nodes,
    };
    if let Some(Node::Text(existing)) = siblings.last_mut() {
        existing.push_str(text);
    } else {
        siblings.push(Node::Text(text.to_string()));
    }
}

/// Resolve a general entity reference by name.
///
/// Predefined and numeric character references decode; anything else is
/// preserved verbatim, the same way the document parser treats namespaces
/// it does not know about.
fn resolve_reference(name: &str) -> String {
    match name {
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "amp" => "&".to_string(),
        "apos" => "'".to_string(),
        "quot" => "\"".to_string(),
        _ => {
            if let Some(code) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                if let Some(ch) = u32::from_str_radix(code, 16).ok().and_then(char::from_u32) {
                    return ch.to_string();
                }
            } else if let Some(code) = name.strip_prefix('#')
                && let Some(ch) = code.parse::<u32>().ok().and_then(char::from_u32)
            {
                return ch.to_string();
            }
            format!("&{name};")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_element(doc: &Document, name: &str) -> Element {
        let (_, _, el) = doc.find_element(name).unwrap();
        el.clone()
    }

    #[test]
    fn test_parses_root_and_children_in_order() {
        let doc = parse_document(
            br#"<svg width="10" height="20"><g id="a"><path d="M0 0"/></g><rect/></svg>"#,
        )
        .unwrap();
        let svg = only_element(&doc, "svg");
        assert_eq!(svg.name, "svg");
        let attrs: Vec<_> = svg.attributes.iter().collect();
        assert_eq!(attrs, vec![("width", "10"), ("height", "20")]);
        let children: Vec<_> = svg.child_elements().map(|el| el.name.clone()).collect();
        assert_eq!(children, vec!["g", "rect"]);
    }

    #[test]
    fn test_preserves_namespaced_names() {
        let doc = parse_document(
            br##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##,
        )
        .unwrap();
        let svg = only_element(&doc, "svg");
        assert_eq!(
            svg.attributes.get("xmlns:xlink"),
            Some("http://www.w3.org/1999/xlink")
        );
        let use_el = only_element(&doc, "use");
        assert_eq!(use_el.attributes.get("xlink:href"), Some("#a"));
    }

    #[test]
    fn test_decodes_entities() {
        let doc = parse_document(br#"<svg><title>a &lt; b &amp; c &#65;</title></svg>"#).unwrap();
        let title = only_element(&doc, "title");
        assert_eq!(title.children, vec![Node::Text("a < b & c A".into())]);
    }

    #[test]
    fn test_keeps_unknown_entities_verbatim() {
        assert_eq!(resolve_reference("nbsp"), "&nbsp;");
        assert_eq!(resolve_reference("#x41"), "A");
        assert_eq!(resolve_reference("#66"), "B");
    }

    #[test]
    fn test_preserves_prolog_and_comments() {
        let doc = parse_document(b"<?xml version=\"1.0\"?><!-- icon --><svg/>").unwrap();
        assert_eq!(doc.nodes.len(), 3);
        assert!(matches!(doc.nodes[0], Node::Misc(Event::Decl(_))));
        assert!(matches!(doc.nodes[1], Node::Misc(Event::Comment(_))));
        assert!(matches!(doc.nodes[2], Node::Element(_)));
    }

    #[test]
    fn test_empty_input_yields_empty_document() {
        let doc = parse_document(b"").unwrap();
        assert!(doc.nodes.is_empty());
        assert!(doc.find_element("svg").is_none());
    }

    #[test]
    fn test_mismatched_tags_fail() {
        let err = parse_document(b"<svg><g></svg>").unwrap_err();
        assert!(matches!(err, InlineError::Parse { .. }));
    }

    #[test]
    fn test_unclosed_element_fails() {
        let err = parse_document(b"<svg><g>").unwrap_err();
        assert!(matches!(err, InlineError::Parse { .. }));
    }

    #[test]
    fn test_whitespace_text_preserved() {
        let doc = parse_document(b"<svg>\n  <g/>\n</svg>").unwrap();
        let svg = only_element(&doc, "svg");
        assert_eq!(svg.children.len(), 3);
        assert_eq!(svg.children[0], Node::Text("\n  ".into()));
        assert_eq!(svg.children[2], Node::Text("\n".into()));
    }

    #[test]
    fn test_cdata_preserved() {
        let doc = parse_document(b"<svg><style><![CDATA[a < b]]></style></svg>").unwrap();
        let style = only_element(&doc, "style");
        assert_eq!(style.children, vec![Node::CData("a < b".into())]);
    }
}
