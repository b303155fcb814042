//! SVG data-URI inliner for style-sheet pipelines.
//!
//! Turns an SVG file into a ready-to-embed `url("data:image/svg+xml...")`
//! CSS value, optionally rewriting element attributes through CSS selectors
//! and optionally running the bytes through an optimizer first.
//!
//! # Modules
//!
//! - [`dom`]: order-preserving XML tree, parse + serialize
//! - [`selector`]: structural CSS selector matching over that tree
//! - [`merge`]: selector-driven attribute overrides
//! - [`encode`]: base64 / percent data-URI rendering
//! - [`optimize`]: callback-style optimizer adapted to a blocking call
//! - [`value`]: the host style-language value boundary
//!
//! # Pipeline
//!
//! ```text
//! path ──► read ──► [optimize] ──► parse ──► select ──► merge ──► serialize ──► encode
//!                        │                                                        ▲
//!                        └──────────────── no overrides ──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use inline_svg::{InlineOptions, Inliner, Value};
//!
//! let inliner = Inliner::new("assets/icons", InlineOptions::default());
//! let overrides = Value::Map(vec![(
//!     Value::str("path"),
//!     Value::Map(vec![(Value::str("fill"), Value::str("currentColor"))]),
//! )]);
//! let css = inliner.inline("arrow.svg", Some(&overrides))?;
//! println!("background-image: {css};");
//! # Ok::<(), inline_svg::InlineError>(())
//! ```
//!
//! One call is one complete pipeline run: configuration is immutable and
//! shared, everything else is call-local, and nothing is cached across
//! calls. The only suspension point is the optimizer wait, which blocks
//! the calling thread (see [`optimize`]).

mod config;
mod error;

pub mod dom;
pub mod encode;
pub mod merge;
pub mod optimize;
pub mod selector;
pub mod value;

pub use config::{Encoding, InlineOptions};
pub use encode::CssString;
pub use error::InlineError;
pub use optimize::{OptimizeCallback, Optimizer, UsvgOptimizer, run_blocking};
pub use selector::{SelectorError, SelectorList};
pub use value::{StyleOverrides, Value, to_style_overrides};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The inliner: a base directory, fixed options, and an optimizer backend.
///
/// Construct once per base-path/options pair and call
/// [`inline`](Inliner::inline) per asset. Shared read-only; concurrent
/// calls don't contend on anything.
pub struct Inliner {
    base: PathBuf,
    options: InlineOptions,
    optimizer: Arc<dyn Optimizer>,
}

impl Inliner {
    /// Create an inliner resolving paths against `base`. When
    /// `options.optimize` is set, the built-in [`UsvgOptimizer`] is used
    /// unless [`with_optimizer`](Inliner::with_optimizer) swaps it out.
    pub fn new(base: impl Into<PathBuf>, options: InlineOptions) -> Self {
        Self {
            base: base.into(),
            options,
            optimizer: Arc::new(UsvgOptimizer),
        }
    }

    /// Replace the optimizer backend.
    pub fn with_optimizer(mut self, optimizer: Arc<dyn Optimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Inline `path` (relative to the base directory) as a data URI.
    ///
    /// With non-empty `overrides`, the document is parsed, each
    /// `(selector, attributes)` pair is merged onto its matches in order,
    /// and the re-serialized tree is encoded. Without overrides the raw
    /// (possibly optimized) file bytes are encoded directly — no parse, no
    /// well-formedness requirement.
    pub fn inline(
        &self,
        path: impl AsRef<Path>,
        overrides: Option<&Value>,
    ) -> Result<CssString, InlineError> {
        let resolved = self.base.join(path.as_ref());
        let mut content =
            fs::read(&resolved).map_err(|e| InlineError::FileRead(resolved.clone(), e))?;

        if self.options.optimize {
            content = optimize::run_blocking(self.optimizer.as_ref(), content)?;
        }

        if let Some(value) = overrides
            && value.is_non_empty_map()
        {
            let style = value::to_style_overrides(value)?;
            content = apply_style(&content, &style)?;
        } else if let Some(value) = overrides
            && !matches!(value, Value::Map(_))
        {
            return Err(InlineError::UnsupportedValueType(
                "style overrides must be a map of selector -> attributes".into(),
            ));
        }

        encode::to_data_uri(&content, self.options.encoding)
    }
}

/// Parse, merge, re-serialize.
fn apply_style(bytes: &[u8], style: &StyleOverrides) -> Result<Vec<u8>, InlineError> {
    let mut doc = dom::parse_document(bytes)?;
    let location = doc
        .find_element("svg")
        .map(|(top, path, _)| (top, path))
        .ok_or(InlineError::MissingRootElement)?;
    let root = doc
        .element_at_mut(location.0, &location.1)
        .ok_or(InlineError::MissingRootElement)?;

    merge::apply_overrides(root, style)?;
    dom::serialize_document(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use std::io::Write;

    fn write_svg(dir: &tempfile::TempDir, name: &str, content: &[u8]) {
        let mut file = fs::File::create(dir.path().join(name)).unwrap();
        file.write_all(content).unwrap();
    }

    fn decode_base64(css: &CssString) -> Vec<u8> {
        let payload = css
            .as_str()
            .strip_prefix("url(\"data:image/svg+xml;base64,")
            .unwrap()
            .strip_suffix("\")")
            .unwrap();
        STANDARD.decode(payload).unwrap()
    }

    fn overrides(selector: &str, attrs: &[(&str, &str)]) -> Value {
        Value::Map(vec![(
            Value::str(selector),
            Value::Map(
                attrs
                    .iter()
                    .map(|(k, v)| (Value::str(*k), Value::str(*v)))
                    .collect(),
            ),
        )])
    }

    #[test]
    fn test_without_overrides_encodes_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        // Not even well-formed XML: without overrides nothing parses it.
        let content: &[u8] = b"<svg><broken";
        write_svg(&dir, "icon.svg", content);

        let inliner = Inliner::new(dir.path(), InlineOptions::default());
        let css = inliner.inline("icon.svg", None).unwrap();
        assert_eq!(decode_base64(&css), content);
    }

    #[test]
    fn test_uri_mode_exact_output() {
        let dir = tempfile::tempdir().unwrap();
        write_svg(&dir, "icon.svg", b"<svg/>");

        let options = InlineOptions {
            optimize: false,
            encoding: Encoding::Uri,
        };
        let css = Inliner::new(dir.path(), options)
            .inline("icon.svg", None)
            .unwrap();
        assert_eq!(css.as_str(), r#"url("data:image/svg+xml,%3Csvg/%3E")"#);
    }

    #[test]
    fn test_overrides_merge_into_matches() {
        let dir = tempfile::tempdir().unwrap();
        write_svg(
            &dir,
            "icon.svg",
            br#"<svg><path d="M0 0" fill="black"/><circle r="5"/></svg>"#,
        );

        let inliner = Inliner::new(dir.path(), InlineOptions::default());
        let css = inliner
            .inline("icon.svg", Some(&overrides("path", &[("fill", "red")])))
            .unwrap();

        let bytes = decode_base64(&css);
        let doc = dom::parse_document(&bytes).unwrap();
        let (_, _, path) = doc.find_element("path").unwrap();
        assert_eq!(path.attributes.get("fill"), Some("red"));
        assert_eq!(path.attributes.get("d"), Some("M0 0"));
        let (_, _, circle) = doc.find_element("circle").unwrap();
        assert!(circle.attributes.get("fill").is_none());
    }

    #[test]
    fn test_empty_override_map_skips_the_parse() {
        let dir = tempfile::tempdir().unwrap();
        let content: &[u8] = b"<svg><broken";
        write_svg(&dir, "icon.svg", content);

        let inliner = Inliner::new(dir.path(), InlineOptions::default());
        let css = inliner
            .inline("icon.svg", Some(&Value::Map(vec![])))
            .unwrap();
        assert_eq!(decode_base64(&css), content);
    }

    #[test]
    fn test_non_map_overrides_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_svg(&dir, "icon.svg", b"<svg/>");

        let inliner = Inliner::new(dir.path(), InlineOptions::default());
        let err = inliner
            .inline("icon.svg", Some(&Value::str("path")))
            .unwrap_err();
        assert!(matches!(err, InlineError::UnsupportedValueType(_)));
    }

    #[test]
    fn test_missing_file_never_reaches_the_parser() {
        let dir = tempfile::tempdir().unwrap();
        let inliner = Inliner::new(dir.path(), InlineOptions::default());
        let err = inliner.inline("nope.svg", None).unwrap_err();
        assert!(matches!(err, InlineError::FileRead(..)));
    }

    #[test]
    fn test_missing_svg_root() {
        let dir = tempfile::tempdir().unwrap();
        write_svg(&dir, "icon.svg", b"<g></g>");

        let inliner = Inliner::new(dir.path(), InlineOptions::default());
        let err = inliner
            .inline("icon.svg", Some(&overrides("g", &[("fill", "red")])))
            .unwrap_err();
        assert!(matches!(err, InlineError::MissingRootElement));
    }

    #[test]
    fn test_custom_optimizer_runs_before_styling() {
        struct Replacing;

        impl Optimizer for Replacing {
            fn optimize(&self, _source: Vec<u8>, done: OptimizeCallback) {
                done(Ok(br#"<svg><path id="opt"/></svg>"#.to_vec()));
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write_svg(&dir, "icon.svg", b"<svg/>");

        let options = InlineOptions {
            optimize: true,
            encoding: Encoding::Base64,
        };
        let inliner =
            Inliner::new(dir.path(), options).with_optimizer(Arc::new(Replacing));
        let css = inliner
            .inline("icon.svg", Some(&overrides("#opt", &[("fill", "red")])))
            .unwrap();

        let doc = dom::parse_document(&decode_base64(&css)).unwrap();
        let (_, _, path) = doc.find_element("path").unwrap();
        assert_eq!(path.attributes.get("fill"), Some("red"));
    }

    #[test]
    fn test_optimizer_output_encoded_directly_without_overrides() {
        struct Fixed;

        impl Optimizer for Fixed {
            fn optimize(&self, _source: Vec<u8>, done: OptimizeCallback) {
                done(Ok(b"<svg optimized=\"yes\"/>".to_vec()));
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write_svg(&dir, "icon.svg", b"<svg    />");

        let options = InlineOptions {
            optimize: true,
            encoding: Encoding::Base64,
        };
        let inliner = Inliner::new(dir.path(), options).with_optimizer(Arc::new(Fixed));
        let css = inliner.inline("icon.svg", None).unwrap();
        assert_eq!(decode_base64(&css), b"<svg optimized=\"yes\"/>");
    }

    #[test]
    fn test_prolog_survives_the_style_pass() {
        let dir = tempfile::tempdir().unwrap();
        write_svg(
            &dir,
            "icon.svg",
            b"<?xml version=\"1.0\"?><!-- hand drawn --><svg><path/></svg>",
        );

        let inliner = Inliner::new(dir.path(), InlineOptions::default());
        let css = inliner
            .inline("icon.svg", Some(&overrides("path", &[("fill", "red")])))
            .unwrap();
        let bytes = decode_base64(&css);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\"?>"));
        assert!(text.contains("<!-- hand drawn -->"));
    }
}
