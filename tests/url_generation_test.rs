//! Integration tests for URL generation against a live route collection.

use std::sync::Arc;
use weft::{
    ActionOutput, Request, Result, Route, RouteArgs, RouteCollection, UrlGenerationContext,
    UrlGenerator, UrlType,
};

fn noop(_request: &Request, _args: &RouteArgs) -> Result<ActionOutput> {
    Ok("ok".into())
}

fn collection() -> Arc<RouteCollection> {
    Arc::new(
        RouteCollection::new(vec![
            Route::get("/items/{id}", noop).name("item.show").numeric("id"),
            Route::get("/files/{name}", noop).name("file.show"),
            Route::get("/exact", noop).name("exact"),
            Route::get("/slashed/", noop).name("slashed"),
        ])
        .unwrap(),
    )
}

#[test]
fn test_generation_round_trips_through_the_matcher() {
    let routes = collection();
    let generator = UrlGenerator::new(
        Arc::clone(&routes),
        UrlGenerationContext::new("example.com"),
    );

    let url = generator
        .to_route("item.show", &[("id", "42")], UrlType::AbsolutePath, None)
        .unwrap();

    let result = routes.match_route("GET", &url);
    let route = result.route().expect("generated url must match");
    assert_eq!(route.route_name(), Some("item.show"));
    assert_eq!(
        result.decoded_segments().get("id").map(String::as_str),
        Some("42")
    );
}

#[test]
fn test_encoded_segments_round_trip_decoded() {
    let routes = collection();
    let generator = UrlGenerator::new(
        Arc::clone(&routes),
        UrlGenerationContext::new("example.com"),
    );

    let url = generator
        .to_route("file.show", &[("name", "a report.pdf")], UrlType::AbsolutePath, None)
        .unwrap();
    assert_eq!(url, "/files/a%20report.pdf");

    let result = routes.match_route("GET", &url);
    assert_eq!(
        result.decoded_segments().get("name").map(String::as_str),
        Some("a report.pdf")
    );
}

#[test]
fn test_generated_trailing_slashes_match_their_own_routes() {
    let routes = collection();
    let generator = UrlGenerator::new(
        Arc::clone(&routes),
        UrlGenerationContext::new("example.com"),
    );

    let exact = generator
        .to_route("exact", &[], UrlType::AbsolutePath, None)
        .unwrap();
    assert_eq!(exact, "/exact");
    assert!(routes.match_route("GET", &exact).has_route());

    let slashed = generator
        .to_route("slashed", &[], UrlType::AbsolutePath, None)
        .unwrap();
    assert_eq!(slashed, "/slashed/");
    assert!(routes.match_route("GET", &slashed).has_route());

    // Crossing the two is a miss in both directions
    assert!(!routes.match_route("GET", "/exact/").has_route());
    assert!(!routes.match_route("GET", "/slashed").has_route());
}

#[test]
fn test_absolute_generation_respects_context() {
    let routes = collection();
    let generator = UrlGenerator::new(
        Arc::clone(&routes),
        UrlGenerationContext::new("example.com").with_https_port(8443),
    );

    let url = generator
        .to_route("item.show", &[("id", "7")], UrlType::AbsoluteUrl, None)
        .unwrap();
    assert_eq!(url, "https://example.com:8443/items/7");
}
