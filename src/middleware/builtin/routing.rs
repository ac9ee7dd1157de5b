use crate::error::Result;
use crate::http::{Request, Response};
use crate::middleware::{Middleware, NextMiddleware};
use crate::routing::Router;
use std::sync::Arc;

/// Matches the request against the route collection and attaches the
/// [`RoutingResult`](crate::routing::RoutingResult) to the request for the
/// route runner to consume. A missing match is not an error; the runner
/// decides how to delegate.
pub struct RoutingMiddleware {
    router: Arc<Router>,
}

impl RoutingMiddleware {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }
}

impl Middleware for RoutingMiddleware {
    fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response> {
        let result = self.router.route(&request);
        Ok(next.handle(request.with_routing_result(result)))
    }

    fn name(&self) -> &'static str {
        "routing"
    }
}
