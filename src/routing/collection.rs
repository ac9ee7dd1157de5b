use crate::error::{Error, Result};
use crate::routing::pattern::CompiledPattern;
use crate::routing::route::{Route, RouteArgs};
use indexmap::IndexMap;
use std::sync::Arc;

/// A route together with its compiled matcher.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    route: Arc<Route>,
    pattern: CompiledPattern,
}

impl CompiledRoute {
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

/// The immutable set of all registered routes.
///
/// Construction compiles every pattern and rejects duplicate names; after
/// that the collection is read-only and safe to share across request-handling
/// threads. Insertion order is matching precedence: the first structural
/// match wins, with no best-match heuristic.
#[derive(Debug, Default)]
pub struct RouteCollection {
    routes: Vec<CompiledRoute>,
    by_name: IndexMap<String, usize>,
}

impl RouteCollection {
    pub fn new(routes: Vec<Route>) -> Result<Self> {
        let mut collection = Self {
            routes: Vec::with_capacity(routes.len()),
            by_name: IndexMap::new(),
        };

        for route in routes {
            let pattern = CompiledPattern::compile(route.pattern(), route.constraints())?;

            if let Some(name) = route.route_name() {
                if collection.by_name.contains_key(name) {
                    return Err(Error::DuplicateRouteName(name.to_string()));
                }
                collection
                    .by_name
                    .insert(name.to_string(), collection.routes.len());
            }

            collection.routes.push(CompiledRoute {
                route: Arc::new(route),
                pattern,
            });
        }

        log::debug!("route collection built with {} route(s)", collection.len());
        Ok(collection)
    }

    pub fn get_by_name(&self, name: &str) -> Result<&Arc<Route>> {
        self.compiled_by_name(name).map(CompiledRoute::route)
    }

    pub fn compiled_by_name(&self, name: &str) -> Result<&CompiledRoute> {
        self.by_name
            .get(name)
            .map(|&index| &self.routes[index])
            .ok_or_else(|| Error::RouteNotFound(name.to_string()))
    }

    /// Match a request line against the collection, in insertion order.
    pub fn match_route(&self, method: &str, path: &str) -> RoutingResult {
        let method = method.to_uppercase();

        for compiled in &self.routes {
            if !compiled.route.allows_method(&method) {
                continue;
            }
            if let Some(mut segments) = compiled.pattern.match_path(path) {
                // Defaults fill placeholders the path left out
                for name in compiled.pattern.placeholder_names() {
                    if !segments.contains_key(name) {
                        if let Some(default) = compiled.route.defaults().get(name) {
                            segments.insert(name.to_string(), default.clone());
                        }
                    }
                }
                return RoutingResult::matched(Arc::clone(&compiled.route), segments);
            }
        }

        RoutingResult::none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// The per-request outcome of matching: a matched route with its decoded
/// segments, or no match. No match is a normal control-flow value, not an
/// error; it tells the route runner to delegate elsewhere.
#[derive(Debug, Clone, Default)]
pub struct RoutingResult {
    route: Option<Arc<Route>>,
    segments: RouteArgs,
}

impl RoutingResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn matched(route: Arc<Route>, segments: RouteArgs) -> Self {
        Self {
            route: Some(route),
            segments,
        }
    }

    pub fn route(&self) -> Option<&Arc<Route>> {
        self.route.as_ref()
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    pub fn decoded_segments(&self) -> &RouteArgs {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ActionOutput;
    use crate::http::Request;

    fn noop(_request: &Request, _args: &RouteArgs) -> crate::error::Result<ActionOutput> {
        Ok("ok".into())
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = RouteCollection::new(vec![
            Route::get("/a", noop).name("r1"),
            Route::get("/b", noop).name("r1"),
        ]);
        assert!(matches!(result, Err(Error::DuplicateRouteName(name)) if name == "r1"));
    }

    #[test]
    fn test_first_match_wins_in_insertion_order() {
        let routes = RouteCollection::new(vec![
            Route::any("/foo", noop).name("first"),
            Route::get("/foo", noop).name("second"),
        ])
        .unwrap();

        let result = routes.match_route("GET", "/foo");
        assert_eq!(result.route().unwrap().route_name(), Some("first"));
    }

    #[test]
    fn test_method_mismatch_skips_route() {
        let routes = RouteCollection::new(vec![
            Route::post("/foo", noop).name("post"),
            Route::get("/foo", noop).name("get"),
        ])
        .unwrap();

        let result = routes.match_route("GET", "/foo");
        assert_eq!(result.route().unwrap().route_name(), Some("get"));
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let routes = RouteCollection::new(vec![Route::get("/foo", noop)]).unwrap();
        let result = routes.match_route("GET", "/bar");
        assert!(!result.has_route());
        assert!(result.decoded_segments().is_empty());
    }

    #[test]
    fn test_defaults_fill_absent_optional_segments() {
        let routes = RouteCollection::new(vec![Route::get("/archive/{year?}", noop)
            .name("archive")
            .default_value("year", "2020")])
        .unwrap();

        let result = routes.match_route("GET", "/archive");
        assert_eq!(
            result.decoded_segments().get("year").map(String::as_str),
            Some("2020")
        );

        let result = routes.match_route("GET", "/archive/1999");
        assert_eq!(
            result.decoded_segments().get("year").map(String::as_str),
            Some("1999")
        );
    }

    #[test]
    fn test_get_by_name() {
        let routes = RouteCollection::new(vec![Route::get("/a", noop).name("a")]).unwrap();
        assert!(routes.get_by_name("a").is_ok());
        assert!(matches!(
            routes.get_by_name("missing"),
            Err(Error::RouteNotFound(_))
        ));
    }
}
