use super::collection::{RouteCollection, RoutingResult};
use crate::http::Request;
use std::sync::Arc;

/// Matches incoming requests against the route collection.
pub struct Router {
    routes: Arc<RouteCollection>,
}

impl Router {
    pub fn new(routes: Arc<RouteCollection>) -> Self {
        Self { routes }
    }

    /// Produce the routing result for a request. Never fails; an unmatched
    /// request yields [`RoutingResult::none`].
    pub fn route(&self, request: &Request) -> RoutingResult {
        let result = self.routes.match_route(request.method(), request.path());

        match result.route() {
            Some(route) => log::debug!(
                "{} {} matched route '{}'",
                request.method(),
                request.path(),
                route.route_name().unwrap_or(route.pattern())
            ),
            None => log::debug!("{} {} matched no route", request.method(), request.path()),
        }

        result
    }

    pub fn routes(&self) -> &Arc<RouteCollection> {
        &self.routes
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}
