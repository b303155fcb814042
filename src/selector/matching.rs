//! Selector chain matching.
//!
//! A chain matches the way CSS engines evaluate: the rightmost compound
//! against the candidate element, then the remaining compounds right to
//! left against the candidate's ancestor stack.

use crate::dom::Element;

/// One compound selector, e.g. `path.accent[fill=red]`.
#[derive(Debug, Clone)]
pub(crate) struct CompoundSelector {
    /// Tag name; `None` or `*` matches any tag.
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
}

impl CompoundSelector {
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && tag != "*"
            && *tag != element.name
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.attributes.get("id") != Some(id.as_str())
        {
            return false;
        }
        for class in &self.classes {
            let has = element
                .attributes
                .get("class")
                .is_some_and(|v| v.split_whitespace().any(|c| c == class));
            if !has {
                return false;
            }
        }
        self.attrs.iter().all(|attr| attr.matches(element))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AttrSelector {
    pub name: String,
    pub op: AttrOp,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrOp {
    Exists,
    Equals,
    /// `~=`: whitespace-list membership.
    Includes,
    /// `|=`: exact or `value-` prefix.
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl AttrSelector {
    fn matches(&self, element: &Element) -> bool {
        let Some(value) = element.attributes.get(&self.name) else {
            return false;
        };
        let expected = self.value.as_deref();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => expected.is_some_and(|v| value == v),
            AttrOp::Includes => {
                expected.is_some_and(|v| value.split_whitespace().any(|part| part == v))
            }
            AttrOp::DashMatch => {
                expected.is_some_and(|v| value == v || value.strip_prefix(v).is_some_and(|rest| rest.starts_with('-')))
            }
            AttrOp::Prefix => expected.is_some_and(|v| value.starts_with(v)),
            AttrOp::Suffix => expected.is_some_and(|v| value.ends_with(v)),
            AttrOp::Substring => expected.is_some_and(|v| value.contains(v)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

/// A full selector chain: compounds joined by combinators.
///
/// `combinators[i]` sits between `parts[i]` and `parts[i + 1]`.
#[derive(Debug, Clone)]
pub(crate) struct SelectorChain {
    pub parts: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl SelectorChain {
    /// Whether `element`, with the given ancestor stack (outermost first),
    /// matches this chain.
    pub fn matches(&self, element: &Element, ancestors: &[&Element]) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        last.matches(element) && Self::ancestors_match(rest, &self.combinators, ancestors)
    }

    /// Matches the remaining compounds right to left against the ancestor
    /// stack. A `Descendant` step tries every remaining ancestor position,
    /// deepest first, so a failed `Child` step further left can fall back
    /// to an outer binding.
    fn ancestors_match(
        parts: &[CompoundSelector],
        combinators: &[Combinator],
        ancestors: &[&Element],
    ) -> bool {
        let Some((part, rest)) = parts.split_last() else {
            return true;
        };
        let Some((combinator, rest_combinators)) = combinators.split_last() else {
            return false;
        };
        match combinator {
            Combinator::Child => {
                let Some((parent, higher)) = ancestors.split_last() else {
                    return false;
                };
                part.matches(parent) && Self::ancestors_match(rest, rest_combinators, higher)
            }
            Combinator::Descendant => (0..ancestors.len()).rev().any(|i| {
                part.matches(ancestors[i])
                    && Self::ancestors_match(rest, rest_combinators, &ancestors[..i])
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, attrs: &[(&str, &str)]) -> Element {
        let mut el = Element::new(name);
        for (k, v) in attrs {
            el.attributes.set(*k, *v);
        }
        el
    }

    fn compound(tag: Option<&str>) -> CompoundSelector {
        CompoundSelector {
            tag: tag.map(String::from),
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        }
    }

    #[test]
    fn test_compound_tag_and_class() {
        let el = element("path", &[("class", "a b")]);
        let mut sel = compound(Some("path"));
        sel.classes.push("b".into());
        assert!(sel.matches(&el));
        sel.classes.push("c".into());
        assert!(!sel.matches(&el));
    }

    #[test]
    fn test_attr_ops() {
        let el = element("path", &[("fill", "red-ish"), ("class", "a b")]);
        let check = |name: &str, op: AttrOp, value: Option<&str>| {
            AttrSelector {
                name: name.into(),
                op,
                value: value.map(String::from),
            }
            .matches(&el)
        };
        assert!(check("fill", AttrOp::Exists, None));
        assert!(!check("stroke", AttrOp::Exists, None));
        assert!(check("fill", AttrOp::Equals, Some("red-ish")));
        assert!(check("class", AttrOp::Includes, Some("b")));
        assert!(!check("class", AttrOp::Includes, Some("ab")));
        assert!(check("fill", AttrOp::DashMatch, Some("red")));
        assert!(!check("fill", AttrOp::DashMatch, Some("re")));
        assert!(check("fill", AttrOp::Prefix, Some("red")));
        assert!(check("fill", AttrOp::Suffix, Some("ish")));
        assert!(check("fill", AttrOp::Substring, Some("d-i")));
    }

    #[test]
    fn test_child_requires_direct_parent() {
        let chain = SelectorChain {
            parts: vec![compound(Some("svg")), compound(Some("path"))],
            combinators: vec![Combinator::Child],
        };
        let svg = element("svg", &[]);
        let g = element("g", &[]);
        let path = element("path", &[]);
        assert!(chain.matches(&path, &[&svg]));
        assert!(!chain.matches(&path, &[&svg, &g]));
    }

    #[test]
    fn test_descendant_skips_levels() {
        let chain = SelectorChain {
            parts: vec![compound(Some("svg")), compound(Some("path"))],
            combinators: vec![Combinator::Descendant],
        };
        let svg = element("svg", &[]);
        let g = element("g", &[]);
        let path = element("path", &[]);
        assert!(chain.matches(&path, &[&svg, &g]));
        assert!(!chain.matches(&path, &[&g]));
        assert!(!chain.matches(&path, &[]));
    }

    #[test]
    fn test_child_step_backtracks_descendant_binding() {
        // svg > g path against <svg><g><g><path/></g></g></svg>: the
        // nearest g is not a child of svg, the outer one is.
        let chain = SelectorChain {
            parts: vec![
                compound(Some("svg")),
                compound(Some("g")),
                compound(Some("path")),
            ],
            combinators: vec![Combinator::Child, Combinator::Descendant],
        };
        let svg = element("svg", &[]);
        let outer = element("g", &[]);
        let inner = element("g", &[]);
        let path = element("path", &[]);
        assert!(chain.matches(&path, &[&svg, &outer, &inner]));

        let div = element("defs", &[]);
        assert!(!chain.matches(&path, &[&div, &outer, &inner]));
    }
}
