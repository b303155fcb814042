//! Optimizer boundary: a callback-style service adapted to a blocking call.
//!
//! The optimization algorithm itself is opaque to this crate. An
//! [`Optimizer`] receives the raw bytes and a completion callback it must
//! invoke exactly once; [`run_blocking`] parks the calling thread on a
//! rendezvous channel until that happens. There is no timeout and no
//! cancellation: an optimizer that never fires its callback (but keeps it
//! alive) blocks the call indefinitely. Callers that need cancellation have
//! to wrap the call themselves.

use anyhow::{Context, Result};
use crossbeam::channel;

use crate::InlineError;

/// Completion callback handed to an [`Optimizer`]. Must be invoked exactly
/// once, with the optimized bytes or the failure to surface.
pub type OptimizeCallback = Box<dyn FnOnce(Result<Vec<u8>>) + Send>;

/// An external SVG optimizer with a callback-style contract: one input
/// buffer, one output buffer, one completion.
pub trait Optimizer: Send + Sync {
    fn optimize(&self, source: Vec<u8>, done: OptimizeCallback);
}

/// Run `optimizer` over `source`, blocking until its callback fires.
///
/// A callback that is dropped without firing disconnects the channel and is
/// reported as an optimizer failure rather than hanging forever; that is
/// the one contract violation the channel makes observable.
pub fn run_blocking(optimizer: &dyn Optimizer, source: Vec<u8>) -> Result<Vec<u8>, InlineError> {
    let (tx, rx) = channel::bounded(1);
    optimizer.optimize(
        source,
        Box::new(move |result| {
            // A second send would mean the callback fired twice; the first
            // result wins and the rest is dropped with the sender.
            let _ = tx.send(result);
        }),
    );

    match rx.recv() {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(InlineError::Optimizer(e)),
        Err(_) => Err(InlineError::Optimizer(anyhow::anyhow!(
            "optimizer dropped its callback without reporting a result"
        ))),
    }
}

/// Built-in optimizer: usvg parse + unindented re-serialization.
///
/// usvg normalizes the tree (resolves defaults, drops metadata) and writes
/// it back without whitespace, which is the size win we want from the
/// default backend. Callers with their own optimizer plug it in via
/// [`Inliner::with_optimizer`](crate::Inliner::with_optimizer).
#[derive(Debug, Default)]
pub struct UsvgOptimizer;

impl Optimizer for UsvgOptimizer {
    fn optimize(&self, source: Vec<u8>, done: OptimizeCallback) {
        done(Self::minify(&source));
    }
}

impl UsvgOptimizer {
    fn minify(source: &[u8]) -> Result<Vec<u8>> {
        let tree =
            usvg::Tree::from_data(source, &usvg::Options::default()).context("Failed to parse SVG")?;
        let write_options = usvg::WriteOptions {
            indent: usvg::Indent::None,
            ..Default::default()
        };
        Ok(tree.to_string(&write_options).into_bytes())
    }
}
