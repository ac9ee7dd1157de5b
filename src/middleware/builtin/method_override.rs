use crate::error::Result;
use crate::http::{Request, Response};
use crate::middleware::{Middleware, NextMiddleware};

/// Rewrites the request verb from the `X-HTTP-Method-Override` header or a
/// `_method` form field, the header taking precedence.
///
/// Only `POST` requests may be overridden, and only to verbs HTML forms
/// cannot express. Runs before routing so the overridden verb takes part in
/// route matching.
pub struct MethodOverride;

impl MethodOverride {
    pub const HEADER: &'static str = "X-HTTP-Method-Override";

    fn valid_method(method: &str) -> bool {
        matches!(method.to_uppercase().as_str(), "PUT" | "PATCH" | "DELETE")
    }
}

impl Middleware for MethodOverride {
    fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response> {
        if request.method() != "POST" {
            return Ok(next.handle(request));
        }

        let method = match request.header(Self::HEADER) {
            Some(header) => Some(header.to_string()),
            None => request.form_field("_method"),
        };

        let method = match method {
            Some(method) if Self::valid_method(&method) => method,
            _ => return Ok(next.handle(request)),
        };

        log::debug!("method override: POST {} -> {}", request.path(), method);
        Ok(next.handle(request.with_method(&method)))
    }

    fn name(&self) -> &'static str {
        "method_override"
    }
}
