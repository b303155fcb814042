//! Host value boundary and the value converter.
//!
//! A style-sheet compiler hands override maps to the inliner in its own
//! nested value representation. [`Value`] is the thin adapter this crate
//! requires at that boundary: scalars, RGBA colors, and ordered key/value
//! maps. The converter turns the outer map into [`StyleOverrides`], the
//! ordered `(selector, attribute set)` sequence the merge step consumes.

use crate::InlineError;

/// A host style-language value, reduced to the shapes the inliner needs.
///
/// Maps preserve insertion order; key order in the outer map is the merge
/// order and is significant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string-like scalar.
    Str(String),
    /// A numeric scalar. Rendered with `Display` (`1.0` becomes `1`).
    Num(f64),
    /// A boolean scalar, rendered as `true`/`false`.
    Bool(bool),
    /// A color with 0-255 channels and a fractional alpha.
    Color { r: u8, g: u8, b: u8, a: f64 },
    /// An ordered key/value map; keys are scalars, values recurse.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Convenience constructor for string values.
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Whether this value is a map with at least one entry.
    pub fn is_non_empty_map(&self) -> bool {
        matches!(self, Value::Map(entries) if !entries.is_empty())
    }

    /// Render a scalar to its attribute-string form.
    ///
    /// Colors become `rgba(r,g,b,a)`; maps are not scalars and fail with
    /// [`InlineError::UnsupportedValueType`].
    fn scalar_string(&self) -> Result<String, InlineError> {
        match self {
            Value::Str(s) => Ok(s.clone()),
            Value::Num(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Color { r, g, b, a } => Ok(format!("rgba({r},{g},{b},{a})")),
            Value::Map(_) => Err(InlineError::UnsupportedValueType(
                "expected a scalar, found a map".into(),
            )),
        }
    }
}

/// Ordered `(selector, attributes)` pairs, in the order the host supplied
/// them. Later pairs overwrite same-named attributes on overlapping matches.
pub type StyleOverrides = Vec<(String, Vec<(String, String)>)>;

/// Convert the host's override map into [`StyleOverrides`].
///
/// The outer value must be a map of `selector -> attribute map`; each
/// attribute value must be a scalar (colors render as `rgba(...)`). Any
/// other shape is an [`InlineError::UnsupportedValueType`].
pub fn to_style_overrides(value: &Value) -> Result<StyleOverrides, InlineError> {
    let Value::Map(entries) = value else {
        return Err(InlineError::UnsupportedValueType(
            "style overrides must be a map of selector -> attributes".into(),
        ));
    };

    let mut overrides = Vec::with_capacity(entries.len());
    for (key, attrs) in entries {
        let selector = key.scalar_string()?;
        let Value::Map(attr_entries) = attrs else {
            return Err(InlineError::UnsupportedValueType(format!(
                "attributes for selector `{selector}` must be a map"
            )));
        };

        let mut attributes = Vec::with_capacity(attr_entries.len());
        for (name, val) in attr_entries {
            attributes.push((name.scalar_string()?, val.scalar_string()?));
        }
        overrides.push((selector, attributes));
    }

    Ok(overrides)
}
