//! Data-URI encoding of the final SVG bytes.
//!
//! Two modes, selected by [`Encoding`]:
//!
//! - base64: standard alphabet, `;base64,` marker
//! - uri: newline-stripped percent-encoding with a fixed set of sequences
//!   restored to literal characters for compactness
//!
//! The uri substitution table is load-bearing for downstream compatibility
//! and must stay exactly: `%20`→space, `%3D`→`=`, `%3A`→`:`, `%2F`→`/`,
//! `%22`→`'`. The double quote maps to a literal *single* quote so the
//! payload stays safe inside the quoted CSS string.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::InlineError;
use crate::config::Encoding;

/// The set `encodeURIComponent` leaves unescaped: alphanumerics and
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A quoted CSS string value, the host-facing result wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssString(String);

impl CssString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CssString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode SVG bytes as a `url("data:image/svg+xml...")` CSS value.
pub fn to_data_uri(bytes: &[u8], encoding: Encoding) -> Result<CssString, InlineError> {
    let data = match encoding {
        Encoding::Base64 => STANDARD.encode(bytes),
        Encoding::Uri => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| InlineError::parse_at(e.valid_up_to() as u64, e))?;
            percent_encode_component(&text.replace('\n', ""))
        }
    };
    Ok(CssString(format!(
        "url(\"data:image/svg+xml{}{}\")",
        encoding.marker(),
        data
    )))
}

fn percent_encode_component(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT)
        .to_string()
        .replace("%20", " ")
        .replace("%3D", "=")
        .replace("%3A", ":")
        .replace("%2F", "/")
        .replace("%22", "'")
}
