//! Error types for the inlining pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::selector::SelectorError;

/// Errors surfaced by [`Inliner::inline`](crate::Inliner::inline).
///
/// Every variant is fatal for the call it occurs in: nothing is retried and
/// there is no partial result. A selector that matches nothing is *not* an
/// error (it is a no-op by design of the merge step).
#[derive(Debug, Error)]
pub enum InlineError {
    /// The source file could not be read.
    #[error("failed to read SVG file `{0}`")]
    FileRead(PathBuf, #[source] std::io::Error),

    /// The byte stream is not a well-formed XML document.
    #[error("XML parse error at position {position}: {message}")]
    Parse { position: u64, message: String },

    /// The parsed document contains no `svg` element.
    ///
    /// Raised for empty documents as well: style overrides are meaningless
    /// without an `svg` root, so both cases fail the same way.
    #[error("document has no `svg` root element")]
    MissingRootElement,

    /// The host supplied a value shape the converter does not recognize
    /// in that position (e.g. a scalar where an attribute map is expected).
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// The writer failed while re-serializing the tree. Unreachable with an
    /// in-memory sink, but the writer API is fallible.
    #[error("failed to serialize SVG document: {0}")]
    Serialize(String),

    /// A selector string could not be parsed.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// The external optimizer reported a failure, surfaced verbatim.
    #[error("SVG optimizer failed: {0}")]
    Optimizer(anyhow::Error),
}

impl InlineError {
    /// Build a [`InlineError::Parse`] from any quick-xml error at a known
    /// reader position.
    pub(crate) fn parse_at(position: u64, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            position,
            message: err.to_string(),
        }
    }
}
