//! Attribute merging onto selector matches.

use crate::InlineError;
use crate::dom::Element;
use crate::selector::SelectorList;
use crate::value::StyleOverrides;

/// Apply every `(selector, attributes)` pair to the subtree rooted at
/// `root`, in the order supplied.
///
/// Each matched element gets each attribute set on it, overwriting an
/// existing value for the same key and leaving every other attribute
/// untouched. Later pairs win over earlier ones on overlapping matches.
/// A selector that matches nothing is a silent no-op.
pub fn apply_overrides(root: &mut Element, overrides: &StyleOverrides) -> Result<(), InlineError> {
    for (selector, attributes) in overrides {
        let list = SelectorList::parse(selector)?;
        // Select immutably first, then mutate through paths.
        let matches = list.select(root);
        for path in &matches {
            let Some(element) = root.element_at_mut(path) else {
                continue;
            };
            for (name, value) in attributes {
                element.attributes.set(name.clone(), value.clone());
            }
        }
    }
    Ok(())
}
