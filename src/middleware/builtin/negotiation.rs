use crate::error::Result;
use crate::http::{Request, Response};
use crate::middleware::{Middleware, NextMiddleware};

/// Request attribute holding the negotiated representation.
pub const NEGOTIATED_CONTENT_TYPE: &str = "negotiated_content_type";

/// Picks the response representation from the `Accept` header.
///
/// Accept entries are evaluated in header order against the supported list;
/// the first supported entry wins and is attached to the request as the
/// [`NEGOTIATED_CONTENT_TYPE`] attribute. A request that accepts none of the
/// supported types is answered with `406 Not Acceptable`.
pub struct ContentNegotiation {
    supported: Vec<String>,
}

impl ContentNegotiation {
    pub fn new(supported: &[&str]) -> Self {
        Self {
            supported: supported.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for ContentNegotiation {
    fn default() -> Self {
        Self::new(&["text/html", "application/json"])
    }
}

impl Middleware for ContentNegotiation {
    fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response> {
        let negotiated = match request.header("accept") {
            None | Some("") => self.supported.first().cloned(),
            Some(accept) => self.negotiate(accept),
        };

        match negotiated {
            Some(content_type) => {
                Ok(next.handle(request.with_attribute(NEGOTIATED_CONTENT_TYPE, &content_type)))
            }
            None => Ok(Response::not_acceptable(None)),
        }
    }

    fn name(&self) -> &'static str {
        "content_negotiation"
    }
}

impl ContentNegotiation {
    fn negotiate(&self, accept: &str) -> Option<String> {
        for entry in accept.split(',') {
            let mime = entry.split(';').next().unwrap_or("").trim();

            if mime == "*/*" {
                return self.supported.first().cloned();
            }

            if let Some(prefix) = mime.strip_suffix("/*") {
                if let Some(found) = self
                    .supported
                    .iter()
                    .find(|s| s.starts_with(prefix) && s[prefix.len()..].starts_with('/'))
                {
                    return Some(found.clone());
                }
                continue;
            }

            if self.supported.iter().any(|s| s == mime) {
                return Some(mime.to_string());
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(accept: Option<&str>) -> Response {
        let middleware = ContentNegotiation::default();
        let mut request = Request::get("/");
        if let Some(accept) = accept {
            request = request.with_header("Accept", accept);
        }
        let next = NextMiddleware::new(|request: Request| {
            Response::text(request.attribute(NEGOTIATED_CONTENT_TYPE).unwrap_or("none"))
        });
        middleware.handle(request, next).unwrap()
    }

    #[test]
    fn test_missing_accept_uses_first_supported() {
        assert_eq!(run(None).body_as_string(), "text/html");
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(run(Some("application/json")).body_as_string(), "application/json");
    }

    #[test]
    fn test_header_order_wins() {
        assert_eq!(
            run(Some("application/json, text/html")).body_as_string(),
            "application/json"
        );
    }

    #[test]
    fn test_wildcard_falls_back_to_first_supported() {
        assert_eq!(run(Some("*/*")).body_as_string(), "text/html");
    }

    #[test]
    fn test_subtype_wildcard() {
        assert_eq!(run(Some("application/*")).body_as_string(), "application/json");
    }

    #[test]
    fn test_unsupported_yields_406() {
        let response = run(Some("image/png"));
        assert_eq!(response.status.as_u16(), 406);
    }

    #[test]
    fn test_quality_parameters_are_ignored() {
        assert_eq!(
            run(Some("application/json;q=0.9, text/html;q=0.8")).body_as_string(),
            "application/json"
        );
    }
}
