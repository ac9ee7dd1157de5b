use crate::routing::RoutingResult;
use std::collections::HashMap;

/// An inbound HTTP request as seen by the routing core.
///
/// Requests are plain values: middleware receives ownership and may pass a
/// modified copy down the chain. Header names are normalized to lowercase on
/// insertion so lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path: String,
    query_string: String,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    attributes: HashMap<String, String>,
    routing: RoutingResult,
}

impl Request {
    pub fn new(method: &str, uri: &str) -> Self {
        let (path, query_string) = match uri.split_once('?') {
            Some((p, q)) => (p.to_string(), q.to_string()),
            None => (uri.to_string(), String::new()),
        };

        Request {
            method: method.to_uppercase(),
            path,
            query: Self::parse_query(&query_string),
            query_string,
            headers: HashMap::new(),
            body: Vec::new(),
            attributes: HashMap::new(),
            routing: RoutingResult::none(),
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new("GET", uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new("POST", uri)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The decoded request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Path plus query string, as it appeared on the request line.
    pub fn path_with_query(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Read a field from an urlencoded form body.
    pub fn form_field(&self, name: &str) -> Option<String> {
        let body = String::from_utf8_lossy(&self.body);
        Self::parse_query(&body).remove(name)
    }

    /// Per-request attributes attached by middleware (e.g. the negotiated
    /// content type).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn routing_result(&self) -> &RoutingResult {
        &self.routing
    }

    // Builder-style transforms. Each returns a new value so middleware can
    // hand a modified request to the next delegate.

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_uppercase();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Attach an urlencoded form body, setting the matching content type.
    pub fn with_form_body(self, pairs: &[(&str, &str)]) -> Self {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(encoded.into_bytes())
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_routing_result(mut self, routing: RoutingResult) -> Self {
        self.routing = routing;
        self
    }

    fn parse_query(query: &str) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key).map(|k| k.to_string());
            let value = urlencoding::decode(value).map(|v| v.to_string());
            if let (Ok(key), Ok(value)) = (key, value) {
                result.insert(key, value);
            }
            // Pairs with invalid encoding are skipped
        }
        result
    }
}
