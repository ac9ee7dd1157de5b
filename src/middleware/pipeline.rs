use crate::contracts::ErrorHandler;
use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::middleware::blueprint::MiddlewareBlueprint;
use crate::middleware::registry::MiddlewareRegistry;
use crate::middleware::NextMiddleware;
use std::sync::Arc;

/// Composes an ordered list of middleware blueprints into a single callable
/// chain around a terminal handler.
///
/// A pipeline is a value: [`send`](Self::send) and [`through`](Self::through)
/// return new instances, so a base pipeline can be branched and reused for
/// multiple request variations. Middleware are instantiated lazily, one at a
/// time, as the chain reaches them.
///
/// Each instance can be run exactly once: calling [`then`](Self::then) a
/// second time without an intervening `send` is a usage fault and fails
/// loudly. Faults raised *inside* middleware or the terminal handler never
/// escape: they are reported to the [`ErrorHandler`] and converted to error
/// responses at the delegate boundary where they occurred.
pub struct MiddlewarePipeline {
    registry: Arc<MiddlewareRegistry>,
    error_handler: Arc<dyn ErrorHandler>,
    middleware: Vec<MiddlewareBlueprint>,
    current_request: Option<Request>,
    exhausted: bool,
}

impl Clone for MiddlewarePipeline {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            error_handler: Arc::clone(&self.error_handler),
            middleware: self.middleware.clone(),
            current_request: self.current_request.clone(),
            exhausted: self.exhausted,
        }
    }
}

impl MiddlewarePipeline {
    pub fn new(registry: Arc<MiddlewareRegistry>, error_handler: Arc<dyn ErrorHandler>) -> Self {
        Self {
            registry,
            error_handler,
            middleware: Vec::new(),
            current_request: None,
            exhausted: false,
        }
    }

    /// Bind the request to run through the chain. Returns a fresh, runnable
    /// pipeline; `self` is untouched.
    pub fn send(&self, request: Request) -> Self {
        let mut new = self.clone();
        new.current_request = Some(request);
        new.exhausted = false;
        new
    }

    /// Bind the middleware chain. Returns a new pipeline; `self` is
    /// untouched.
    pub fn through(&self, middleware: Vec<MiddlewareBlueprint>) -> Self {
        let mut new = self.clone();
        new.middleware = middleware;
        new
    }

    /// Run the chain down to `terminal` and return the response.
    ///
    /// Fails only on misuse: running an exhausted pipeline or one that was
    /// never `send()`-ed. Middleware and handler faults are contained and
    /// converted to error responses instead.
    pub fn then<F>(&mut self, terminal: F) -> Result<Response>
    where
        F: Fn(Request) -> Result<Response>,
    {
        if self.exhausted {
            return Err(Error::PipelineExhausted);
        }

        let request = self.current_request.take().ok_or(Error::PipelineNotSent)?;
        self.exhausted = true;

        let middleware = std::mem::take(&mut self.middleware);
        Ok(self.run(request, &middleware, 0, &terminal))
    }

    fn run(
        &self,
        request: Request,
        chain: &[MiddlewareBlueprint],
        index: usize,
        terminal: &dyn Fn(Request) -> Result<Response>,
    ) -> Response {
        if index == chain.len() {
            let boundary = request.clone();
            return match terminal(request) {
                Ok(response) => response,
                Err(e) => self.fault_to_response(e, &boundary),
            };
        }

        let blueprint = &chain[index];
        let boundary = request.clone();

        let instance = match self.registry.create(blueprint) {
            Ok(instance) => instance,
            Err(e) => return self.fault_to_response(e, &boundary),
        };

        log::debug!("running middleware '{}'", blueprint.id());

        let next = NextMiddleware::new(|request| self.run(request, chain, index + 1, terminal));

        match instance.handle(request, next) {
            Ok(response) => response,
            Err(e) => self.fault_to_response(e, &boundary),
        }
    }

    fn fault_to_response(&self, error: Error, request: &Request) -> Response {
        self.error_handler.report(&error, request);
        self.error_handler.to_http_response(&error, request)
    }
}
