//! Inliner configuration.
//!
//! Constructed once per base-path/options pair and shared read-only across
//! all `inline` calls; nothing here is mutated after construction.
//!
//! # Example
//!
//! ```
//! use inline_svg::{Encoding, InlineOptions};
//!
//! let options = InlineOptions {
//!     optimize: true,
//!     encoding: Encoding::Uri,
//! };
//! assert!(options.optimize);
//! ```

use serde::{Deserialize, Serialize};

/// Data-URI payload encoding
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Standard base64, emitted as `;base64,<data>`.
    #[default]
    Base64,
    /// Percent-encoded text, emitted as `,<data>`. Accepts `url` as an
    /// alias when deserialized, matching the stylesheet-facing option.
    #[serde(alias = "url")]
    Uri,
}

impl Encoding {
    /// The marker placed between the media type and the payload.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Base64 => ";base64,",
            Self::Uri => ",",
        }
    }
}

/// Options for a constructed inliner
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineOptions {
    /// Run the configured optimizer over the file bytes before any other
    /// processing. Default: `false`.
    pub optimize: bool,
    /// Payload encoding for the resulting data URI. Default: base64.
    pub encoding: Encoding,
}
