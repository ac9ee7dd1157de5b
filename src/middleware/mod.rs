//! Middleware composition.
//!
//! A middleware is a request/response transformer invoked with the current
//! request and a [`NextMiddleware`] delegate representing the rest of the
//! chain. It may forward the request (possibly modified), short-circuit by
//! returning a response without calling the delegate, or wrap the downstream
//! response after calling it. Errors returned by a middleware never escape
//! the pipeline; they are converted to error responses at the delegate
//! boundary (see [`pipeline::MiddlewarePipeline`]).

pub mod blueprint;
pub mod builtin;
pub mod pipeline;
pub mod registry;
pub mod stack;

pub use blueprint::{MiddlewareArg, MiddlewareBlueprint};
pub use pipeline::MiddlewarePipeline;
pub use registry::MiddlewareRegistry;
pub use stack::MiddlewareStack;

use crate::error::Result;
use crate::http::{Request, Response};

/// A composable request/response transformer.
pub trait Middleware: Send + Sync {
    fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response>;

    /// Optional: the name of this middleware for debugging
    fn name(&self) -> &'static str {
        "unnamed"
    }
}

/// The delegate representing "the rest of the chain".
///
/// Calling it hands the (possibly modified) request to the next middleware,
/// or to the terminal handler once the chain is exhausted. It can be called
/// at most once; dropping it without calling short-circuits the chain.
pub struct NextMiddleware<'a> {
    delegate: Box<dyn FnOnce(Request) -> Response + 'a>,
}

impl<'a> NextMiddleware<'a> {
    pub(crate) fn new(delegate: impl FnOnce(Request) -> Response + 'a) -> Self {
        Self {
            delegate: Box::new(delegate),
        }
    }

    pub fn handle(self, request: Request) -> Response {
        (self.delegate)(request)
    }
}
