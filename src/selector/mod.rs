//! CSS structural selector matching over the element tree.
//!
//! # Modules
//!
//! - [`parse`]: selector string -> [`SelectorList`]
//! - [`matching`]: right-to-left chain matching + document-order selection
//!
//! Supported forms: tag, `*`, `.class`, `#id`, `[attr]` with the
//! `= ~= |= ^= $= *=` operators, the descendant (space) and child (`>`)
//! combinators, and comma-separated alternation. No pseudo-classes and no
//! cascade: this is tree matching for attribute overrides, not a style
//! engine. Matching is case-sensitive, as XML tag and attribute names are.

mod matching;
mod parse;

pub(crate) use matching::{AttrOp, AttrSelector, Combinator, CompoundSelector, SelectorChain};

use thiserror::Error;

use crate::dom::{Element, ElementPath};

/// A selector string that could not be parsed.
#[derive(Debug, Clone, Error)]
#[error("invalid selector `{selector}`: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

/// A parsed comma-list of selector chains.
#[derive(Debug, Clone)]
pub struct SelectorList {
    chains: Vec<SelectorChain>,
}

impl SelectorList {
    /// Parse a selector string, e.g. `"g > path.accent, #mark [fill]"`.
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        parse::parse_selector_list(selector)
    }

    /// All elements under (and including) `root` matched by any chain, in
    /// document order, without duplicates.
    pub fn select(&self, root: &Element) -> Vec<ElementPath> {
        let mut matches = Vec::new();
        let mut ancestors: Vec<&Element> = Vec::new();
        self.walk(root, ElementPath::root(), &mut ancestors, &mut matches);
        matches
    }

    fn walk<'a>(
        &self,
        element: &'a Element,
        path: ElementPath,
        ancestors: &mut Vec<&'a Element>,
        matches: &mut Vec<ElementPath>,
    ) {
        if self
            .chains
            .iter()
            .any(|chain| chain.matches(element, ancestors))
        {
            matches.push(path.clone());
        }

        ancestors.push(element);
        for (index, child) in element.children.iter().enumerate() {
            if let Some(child_el) = child.as_element() {
                self.walk(child_el, path.child(index), ancestors, matches);
            }
        }
        ancestors.pop();
    }
}
