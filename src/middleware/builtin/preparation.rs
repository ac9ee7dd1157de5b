use crate::error::Result;
use crate::http::{Request, Response};
use crate::middleware::builtin::negotiation::NEGOTIATED_CONTENT_TYPE;
use crate::middleware::{Middleware, NextMiddleware};

/// Fixes up responses on the way out so handlers can stay sloppy about
/// protocol details: fills in a default `Content-Type` (honoring the
/// negotiated representation), adds `Content-Length`, and strips bodies
/// where the protocol forbids them.
pub struct ResponsePreparation;

impl Middleware for ResponsePreparation {
    fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response> {
        let is_head = request.method() == "HEAD";
        let negotiated = request
            .attribute(NEGOTIATED_CONTENT_TYPE)
            .map(str::to_string);

        let mut response = next.handle(request);
        let status = response.status.as_u16();

        if status == 204 || status == 304 || (100..200).contains(&status) {
            response.body.clear();
            return Ok(response);
        }

        if !response.body.is_empty() && !response.has_header("Content-Type") {
            let content_type = negotiated
                .map(|mime| format!("{}; charset=utf-8", mime))
                .unwrap_or_else(|| "text/html; charset=utf-8".to_string());
            response.add_header("Content-Type", &content_type);
        }

        if !response.has_header("Content-Length") && !response.has_header("Transfer-Encoding") {
            response.add_header("Content-Length", &response.body_size().to_string());
        }

        // HEAD keeps the entity headers but never a body
        if is_head {
            response.body.clear();
        }

        Ok(response)
    }

    fn name(&self) -> &'static str {
        "response_preparation"
    }
}
