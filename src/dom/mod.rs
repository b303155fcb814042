//! Order-preserving XML element tree.
//!
//! # Modules
//!
//! - [`parse`]: bytes -> [`Document`] via quick-xml (XML mode, no recovery)
//! - [`serialize`]: [`Document`] -> bytes with the structural round-trip
//!   guarantee (reparsing the output yields an equal tree)
//!
//! The tree is owned by a single parse-serialize lifecycle; it is built per
//! `inline` call and dropped after serialization. Attributes and children
//! keep insertion order exactly as encountered, which is what makes the
//! round-trip property hold for untouched elements.

mod parse;
mod serialize;

pub use parse::parse_document;
pub use serialize::serialize_document;

use quick_xml::events::Event;

/// A full parsed document: the root element plus any surrounding prolog,
/// comments, or processing instructions, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data with entities decoded. Unknown entity references are
    /// kept verbatim as `&name;` text.
    Text(String),
    /// A CDATA section, preserved as a section on output.
    CData(String),
    /// Anything we carry through untouched: XML declaration, DOCTYPE,
    /// processing instructions, comments.
    Misc(Event<'static>),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An element with ordered attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    /// Child elements in document order (text and misc nodes skipped).
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Resolve a path of child-node indices to an element, if every step
    /// lands on one.
    pub fn element_at(&self, path: &ElementPath) -> Option<&Element> {
        let mut current = self;
        for &index in &path.0 {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    /// Mutable variant of [`Element::element_at`].
    pub fn element_at_mut(&mut self, path: &ElementPath) -> Option<&mut Element> {
        let mut current = self;
        for &index in &path.0 {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }
}

/// Insertion-ordered attribute list.
///
/// An ordered `Vec` rather than a hash map: attribute order must survive
/// the round trip, and SVG elements carry few enough attributes that a
/// linear scan wins anyway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set `name` to `value`, overwriting in place if present so the
    /// original position is kept.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Path from a root element to a descendant, as child-node indices.
///
/// Match results are paths instead of references so selection (immutable)
/// and merging (mutable) never hold borrows into the tree at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath(pub Vec<usize>);

impl ElementPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl Document {
    /// First element named `name` in document order, at any depth.
    ///
    /// Returns the element together with its path relative to the top-level
    /// node that contains it.
    pub fn find_element(&self, name: &str) -> Option<(usize, ElementPath, &Element)> {
        fn descend<'a>(
            el: &'a Element,
            name: &str,
            path: ElementPath,
        ) -> Option<(ElementPath, &'a Element)> {
            if el.name == name {
                return Some((path, el));
            }
            for (index, child) in el.children.iter().enumerate() {
                if let Some(child_el) = child.as_element()
                    && let Some(found) = descend(child_el, name, path.child(index))
                {
                    return Some(found);
                }
            }
            None
        }

        for (top, node) in self.nodes.iter().enumerate() {
            if let Some(el) = node.as_element()
                && let Some((path, found)) = descend(el, name, ElementPath::root())
            {
                return Some((top, path, found));
            }
        }
        None
    }

    /// Mutable lookup for a `(top-level index, path)` pair previously
    /// returned by [`Document::find_element`].
    pub fn element_at_mut(&mut self, top: usize, path: &ElementPath) -> Option<&mut Element> {
        self.nodes.get_mut(top)?.as_element_mut()?.element_at_mut(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut path = Element::new("path");
        path.attributes.set("d", "M0 0");
        let mut g = Element::new("g");
        g.children.push(Node::Element(path));
        let mut svg = Element::new("svg");
        svg.children.push(Node::Text("\n".into()));
        svg.children.push(Node::Element(g));
        Document {
            nodes: vec![Node::Element(svg)],
        }
    }

    #[test]
    fn test_attribute_order_and_overwrite() {
        let mut attrs = Attributes::default();
        attrs.set("width", "10");
        attrs.set("height", "20");
        attrs.set("width", "30");
        let collected: Vec<_> = attrs.iter().collect();
        assert_eq!(collected, vec![("width", "30"), ("height", "20")]);
    }

    #[test]
    fn test_find_element_at_depth() {
        let doc = sample();
        let (top, path, el) = doc.find_element("path").unwrap();
        assert_eq!(top, 0);
        assert_eq!(el.name, "path");
        // svg -> children[1] (g) -> children[0] (path)
        assert_eq!(path, ElementPath(vec![1, 0]));
    }

    #[test]
    fn test_find_element_missing() {
        let doc = sample();
        assert!(doc.find_element("rect").is_none());
    }

    #[test]
    fn test_element_path_resolution() {
        let mut doc = sample();
        let (top, path, _) = doc.find_element("path").unwrap();
        let el = doc.element_at_mut(top, &path).unwrap();
        el.attributes.set("fill", "red");
        let (_, _, el) = doc.find_element("path").unwrap();
        assert_eq!(el.attributes.get("fill"), Some("red"));
        assert_eq!(el.attributes.get("d"), Some("M0 0"));
    }
}
