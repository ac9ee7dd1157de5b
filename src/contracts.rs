//! Collaborator interfaces consumed by the routing core.
//!
//! The core never resolves controllers, renders error pages, or talks to the
//! host environment itself; it goes through the narrow traits in this module
//! so hosts can plug in their own implementations.

use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::middleware::builtin::negotiation::NEGOTIATED_CONTENT_TYPE;
use crate::routing::RouteArgs;

/// What a controller action may return; the kernel coerces it into a
/// [`Response`] through the [`ResponseConverter`] collaborator.
pub enum ActionOutput {
    Response(Response),
    Body(String),
    Json(serde_json::Value),
}

impl From<Response> for ActionOutput {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<String> for ActionOutput {
    fn from(body: String) -> Self {
        Self::Body(body)
    }
}

impl From<&str> for ActionOutput {
    fn from(body: &str) -> Self {
        Self::Body(body.to_string())
    }
}

impl From<serde_json::Value> for ActionOutput {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// A controller action. Implemented automatically for plain functions and
/// closures; implement the trait directly to declare controller middleware.
pub trait Controller: Send + Sync {
    /// Middleware this controller wants appended after the route middleware.
    fn middleware(&self) -> Vec<String> {
        Vec::new()
    }

    fn handle(&self, request: &Request, args: &RouteArgs) -> Result<ActionOutput>;
}

impl<F> Controller for F
where
    F: Fn(&Request, &RouteArgs) -> Result<ActionOutput> + Send + Sync,
{
    fn handle(&self, request: &Request, args: &RouteArgs) -> Result<ActionOutput> {
        self(request, args)
    }
}

/// Coerces controller return values into canonical responses.
pub trait ResponseConverter: Send + Sync {
    fn to_response(&self, output: ActionOutput, request: &Request) -> Result<Response>;
}

/// Default coercion: responses pass through, strings become bodies typed by
/// the negotiated content type, JSON values become JSON responses.
pub struct DefaultResponseConverter;

impl ResponseConverter for DefaultResponseConverter {
    fn to_response(&self, output: ActionOutput, request: &Request) -> Result<Response> {
        match output {
            ActionOutput::Response(response) => Ok(response),
            ActionOutput::Body(body) => {
                match request.attribute(NEGOTIATED_CONTENT_TYPE) {
                    Some("application/json") => Ok(Response::ok()
                        .with_header("Content-Type", "application/json")
                        .with_body(body.into_bytes())),
                    Some("text/plain") => Ok(Response::text(body)),
                    _ => Ok(Response::html(body)),
                }
            }
            ActionOutput::Json(value) => Response::json(value),
        }
    }
}

/// Receives every fault the pipeline contains. `report` is side-effecting
/// (logging, telemetry); `to_http_response` must always produce a response —
/// it is what terminates pipeline execution on fault.
pub trait ErrorHandler: Send + Sync {
    fn report(&self, error: &Error, request: &Request);

    fn to_http_response(&self, error: &Error, request: &Request) -> Response;
}

/// Logs faults via the `log` crate and renders a minimal error response that
/// exposes the error code but never internal details.
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn report(&self, error: &Error, request: &Request) {
        log::error!(
            "{} {} failed: {} [{}]",
            request.method(),
            request.path(),
            error,
            error.error_code()
        );
    }

    fn to_http_response(&self, error: &Error, _request: &Request) -> Response {
        let status =
            hyper::StatusCode::from_u16(error.status_code()).unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);
        Response::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(error.error_code().as_bytes().to_vec())
    }
}

/// Discards reports and answers every fault with an empty 500. Useful in
/// tests that only care about containment.
pub struct NullErrorHandler;

impl ErrorHandler for NullErrorHandler {
    fn report(&self, _error: &Error, _request: &Request) {}

    fn to_http_response(&self, _error: &Error, _request: &Request) -> Response {
        Response::new(hyper::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Hands an unmatched request back to the surrounding runtime.
pub trait HostDelegate: Send + Sync {
    fn delegate_to_host(&self, request: &Request) -> Response;
}

impl<F> HostDelegate for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn delegate_to_host(&self, request: &Request) -> Response {
        self(request)
    }
}

/// Fallback host delegate for standalone use: answers 404.
pub struct NotFoundHostDelegate;

impl HostDelegate for NotFoundHostDelegate {
    fn delegate_to_host(&self, _request: &Request) -> Response {
        Response::not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_converter_passes_responses_through() {
        let converter = DefaultResponseConverter;
        let response = converter
            .to_response(Response::redirect("/next").into(), &Request::get("/"))
            .unwrap();
        assert_eq!(response.status.as_u16(), 302);
    }

    #[test]
    fn test_default_converter_types_bodies_by_negotiation() {
        let converter = DefaultResponseConverter;

        let html = converter
            .to_response("hello".into(), &Request::get("/"))
            .unwrap();
        assert_eq!(html.header("Content-Type"), Some("text/html; charset=utf-8"));

        let request = Request::get("/").with_attribute(NEGOTIATED_CONTENT_TYPE, "application/json");
        let json = converter.to_response("{}".into(), &request).unwrap();
        assert_eq!(json.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_default_converter_serializes_json_values() {
        let converter = DefaultResponseConverter;
        let response = converter
            .to_response(serde_json::json!({"n": 1}).into(), &Request::get("/"))
            .unwrap();
        assert_eq!(response.body_as_string(), r#"{"n":1}"#);
    }

    #[test]
    fn test_log_error_handler_maps_status() {
        let handler = LogErrorHandler;
        let response =
            handler.to_http_response(&Error::RouteNotFound("x".into()), &Request::get("/"));
        assert_eq!(response.status.as_u16(), 404);

        let response = handler.to_http_response(&Error::internal("x"), &Request::get("/"));
        assert_eq!(response.status.as_u16(), 500);
        assert_eq!(response.body_as_string(), "E_INTERNAL");
    }
}
