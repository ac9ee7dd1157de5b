use crate::error::{Error, Result};
use crate::http::Request;
use crate::routing::collection::CompiledRoute;
use crate::routing::pattern::Segment;
use crate::routing::RouteCollection;
use crate::url::context::UrlGenerationContext;
use crate::url::signer::UrlSigner;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::sync::Arc;

// RFC 3986: encode within path segments but leave the segment delimiters to
// the assembler; query values keep their reserved delimiters readable.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/')
    .add(b'\\');

const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'&')
    .add(b'=')
    .add(b'+')
    .add(b'%');

const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// Extra key rendered as a `#fragment` suffix instead of a query parameter.
pub const FRAGMENT_KEY: &str = "_fragment";

/// Output flavor for generated URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlType {
    /// `https://example.com/foo/bar`
    AbsoluteUrl,
    /// `/foo/bar`
    AbsolutePath,
}

/// Builds outbound URLs from paths or named routes.
///
/// The generator is a side-channel consulted by controllers and middleware;
/// it never participates in inbound request flow. It is cheap to share behind
/// an `Arc` and respects the single global trailing-slash policy of its
/// [`UrlGenerationContext`] on every generation path.
pub struct UrlGenerator {
    routes: Arc<RouteCollection>,
    context: UrlGenerationContext,
    signer: Option<Arc<dyn UrlSigner>>,
}

impl UrlGenerator {
    pub fn new(routes: Arc<RouteCollection>, context: UrlGenerationContext) -> Self {
        Self {
            routes,
            context,
            signer: None,
        }
    }

    /// Enable [`signed`](Self::signed) / [`signed_route`](Self::signed_route).
    pub fn with_signer(mut self, signer: Arc<dyn UrlSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn context(&self) -> &UrlGenerationContext {
        &self.context
    }

    /// Generate a URL for a literal, not-yet-encoded path.
    ///
    /// `secure = None` falls back to the context's configured scheme. A
    /// `_fragment` key in `extra` becomes a `#fragment` suffix.
    pub fn to(&self, path: &str, extra: &[(&str, &str)], kind: UrlType, secure: Option<bool>) -> String {
        let encoded = self.apply_trailing_slash(Self::encode_path(path));
        self.assemble(encoded, extra, kind, secure)
    }

    /// Generate a secure, absolute URL to the provided path.
    pub fn secure(&self, path: &str, extra: &[(&str, &str)]) -> String {
        self.to(path, extra, UrlType::AbsoluteUrl, Some(true))
    }

    /// Generate a URL for a named route.
    ///
    /// Required placeholders are substituted from `arguments` (falling back
    /// to route defaults); values must satisfy the route's constraints.
    /// Unused arguments are appended as query parameters.
    pub fn to_route(
        &self,
        name: &str,
        arguments: &[(&str, &str)],
        kind: UrlType,
        secure: Option<bool>,
    ) -> Result<String> {
        let compiled = self.routes.compiled_by_name(name)?;
        let (path, used) = self.route_path(name, compiled, arguments)?;

        let leftover: Vec<(&str, &str)> = arguments
            .iter()
            .filter(|(key, _)| !used.contains(&key.to_string()))
            .copied()
            .collect();

        Ok(self.assemble(path, &leftover, kind, secure))
    }

    /// Generate a signed URL for a literal path, valid for `ttl` seconds.
    pub fn signed(&self, path: &str, ttl: i64, kind: UrlType) -> Result<String> {
        let encoded = self.apply_trailing_slash(Self::encode_path(path));
        self.append_signature(self.assemble(encoded, &[], kind, None), ttl)
    }

    /// Generate a signed URL for a named route, valid for `ttl` seconds.
    pub fn signed_route(
        &self,
        name: &str,
        arguments: &[(&str, &str)],
        ttl: i64,
        kind: UrlType,
    ) -> Result<String> {
        let without_fragment: Vec<(&str, &str)> = arguments
            .iter()
            .filter(|(key, _)| *key != FRAGMENT_KEY)
            .copied()
            .collect();
        self.append_signature(self.to_route(name, &without_fragment, kind, None)?, ttl)
    }

    /// The canonical URL for the current request: scheme + host + path,
    /// without query or fragment.
    pub fn canonical(&self, request: &Request) -> String {
        format!(
            "{}{}",
            self.context.base_url(self.context.https_by_default()),
            Self::encode_path(request.path())
        )
    }

    /// The full current URI as an absolute URL, including the query string.
    pub fn full(&self, request: &Request) -> String {
        format!(
            "{}{}",
            self.context.base_url(self.context.https_by_default()),
            request.path_with_query()
        )
    }

    /// The previous URL from the referer header, or `fallback`.
    pub fn previous(&self, request: &Request, fallback: &str) -> String {
        match request.header("referer") {
            Some(referer) if url::Url::parse(referer).is_ok() => referer.to_string(),
            _ => self.to(fallback, &[], UrlType::AbsoluteUrl, None),
        }
    }

    fn route_path(
        &self,
        name: &str,
        compiled: &CompiledRoute,
        arguments: &[(&str, &str)],
    ) -> Result<(String, Vec<String>)> {
        let route = compiled.route();
        let pattern = compiled.pattern();
        let lookup = |key: &str| -> Option<String> {
            arguments
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .or_else(|| route.defaults().get(key).cloned())
        };

        let mut path = String::new();
        let mut used = Vec::new();

        for segment in pattern.segments() {
            match segment {
                Segment::Static(literal) => {
                    path.push('/');
                    path.push_str(&utf8_percent_encode(literal, PATH_SEGMENT).to_string());
                }
                Segment::Parameter { name: parameter, required } => {
                    match lookup(parameter) {
                        Some(value) => {
                            if !pattern.satisfies_constraint(parameter, &value) {
                                return Err(Error::bad_route_parameter(
                                    name,
                                    parameter,
                                    format!("value '{}' does not satisfy the constraint", value),
                                ));
                            }
                            path.push('/');
                            path.push_str(&utf8_percent_encode(&value, PATH_SEGMENT).to_string());
                            used.push(parameter.clone());
                        }
                        None if *required => {
                            return Err(Error::bad_route_parameter(
                                name,
                                parameter,
                                "missing required parameter",
                            ));
                        }
                        // Absent optional parameter ends the path
                        None => break,
                    }
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        // The pattern is the authority on its own trailing slash; the global
        // policy only applies to routes without one, and never to root.
        if pattern.trailing_slash() && !path.ends_with('/') {
            path.push('/');
        } else if !pattern.trailing_slash() {
            path = self.apply_trailing_slash(path);
        }

        Ok((path, used))
    }

    fn encode_path(path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        path.split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The global policy adds a trailing slash to extension-less paths. It
    /// never rewrites the root path or paths that already carry one.
    fn apply_trailing_slash(&self, path: String) -> String {
        if !self.context.trailing_slash() || path == "/" || path.ends_with('/') {
            return path;
        }

        let last_segment = path.rsplit('/').next().unwrap_or("");
        if last_segment.contains('.') {
            return path;
        }

        format!("{}/", path)
    }

    fn assemble(
        &self,
        encoded_path: String,
        extra: &[(&str, &str)],
        kind: UrlType,
        secure: Option<bool>,
    ) -> String {
        let mut url = match kind {
            UrlType::AbsoluteUrl => {
                let secure = secure.unwrap_or(self.context.https_by_default());
                format!("{}{}", self.context.base_url(secure), encoded_path)
            }
            UrlType::AbsolutePath => encoded_path,
        };

        let query = extra
            .iter()
            .filter(|(key, _)| *key != FRAGMENT_KEY)
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY),
                    utf8_percent_encode(value, QUERY)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        if let Some((_, fragment)) = extra.iter().find(|(key, _)| *key == FRAGMENT_KEY) {
            url.push('#');
            url.push_str(&utf8_percent_encode(fragment, FRAGMENT).to_string());
        }

        url
    }

    fn append_signature(&self, url: String, ttl: i64) -> Result<String> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| Error::configuration("no url signer configured"))?;

        let expires = Utc::now().timestamp() + ttl;
        let separator = if url.contains('?') { '&' } else { '?' };
        let payload = format!("{}{}expires={}", url, separator, expires);
        let signature = signer.sign(&payload);
        Ok(format!("{}&signature={}", payload, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ActionOutput;
    use crate::routing::{Route, RouteArgs};
    use crate::url::signer::HmacUrlSigner;

    fn noop(_request: &Request, _args: &RouteArgs) -> Result<ActionOutput> {
        Ok("ok".into())
    }

    fn generator() -> UrlGenerator {
        let routes = RouteCollection::new(vec![
            Route::get("/items/{id}", noop).name("item.show").numeric("id"),
            Route::get("/archive/{year?}", noop)
                .name("archive")
                .default_value("year", "2020"),
            Route::get("/teams/{team}/", noop).name("team"),
        ])
        .unwrap();

        UrlGenerator::new(Arc::new(routes), UrlGenerationContext::new("example.com"))
    }

    #[test]
    fn test_to_path_and_absolute() {
        let generator = generator();
        assert_eq!(generator.to("/foo/bar", &[], UrlType::AbsolutePath, None), "/foo/bar");
        assert_eq!(
            generator.to("/foo/bar", &[], UrlType::AbsoluteUrl, None),
            "https://example.com/foo/bar"
        );
        assert_eq!(
            generator.to("/foo", &[], UrlType::AbsoluteUrl, Some(false)),
            "http://example.com/foo"
        );
    }

    #[test]
    fn test_to_encodes_path_segments() {
        let generator = generator();
        assert_eq!(
            generator.to("/a b/c", &[], UrlType::AbsolutePath, None),
            "/a%20b/c"
        );
    }

    #[test]
    fn test_extra_query_and_fragment() {
        let generator = generator();
        let url = generator.to(
            "/docs",
            &[("page", "2"), ("_fragment", "intro")],
            UrlType::AbsolutePath,
            None,
        );
        assert_eq!(url, "/docs?page=2#intro");
    }

    #[test]
    fn test_to_route_substitutes_and_appends_query() {
        let generator = generator();
        let url = generator
            .to_route("item.show", &[("id", "42"), ("ref", "mail")], UrlType::AbsolutePath, None)
            .unwrap();
        assert_eq!(url, "/items/42?ref=mail");
    }

    #[test]
    fn test_to_route_missing_parameter() {
        let generator = generator();
        let result = generator.to_route("item.show", &[], UrlType::AbsolutePath, None);
        assert!(matches!(result, Err(Error::BadRouteParameter { .. })));
    }

    #[test]
    fn test_to_route_constraint_violation() {
        let generator = generator();
        let result = generator.to_route("item.show", &[("id", "abc")], UrlType::AbsolutePath, None);
        assert!(matches!(result, Err(Error::BadRouteParameter { .. })));
    }

    #[test]
    fn test_to_route_unknown_name() {
        let generator = generator();
        let result = generator.to_route("nope", &[], UrlType::AbsolutePath, None);
        assert!(matches!(result, Err(Error::RouteNotFound(_))));
    }

    #[test]
    fn test_to_route_optional_uses_default() {
        let generator = generator();
        let url = generator
            .to_route("archive", &[], UrlType::AbsolutePath, None)
            .unwrap();
        assert_eq!(url, "/archive/2020");
    }

    #[test]
    fn test_route_pattern_trailing_slash_is_kept() {
        let generator = generator();
        let url = generator
            .to_route("team", &[("team", "red")], UrlType::AbsolutePath, None)
            .unwrap();
        assert_eq!(url, "/teams/red/");
    }

    #[test]
    fn test_global_trailing_slash_policy() {
        let routes = Arc::new(RouteCollection::new(vec![]).unwrap());
        let generator = UrlGenerator::new(
            routes,
            UrlGenerationContext::new("example.com").with_trailing_slash(true),
        );
        assert_eq!(generator.to("/foo", &[], UrlType::AbsolutePath, None), "/foo/");
        assert_eq!(generator.to("/", &[], UrlType::AbsolutePath, None), "/");
        // Paths with a file extension stay untouched
        assert_eq!(
            generator.to("/sitemap.xml", &[], UrlType::AbsolutePath, None),
            "/sitemap.xml"
        );
    }

    #[test]
    fn test_secure_shortcut() {
        let generator = generator();
        assert_eq!(generator.secure("/login", &[]), "https://example.com/login");
    }

    #[test]
    fn test_canonical_full_previous() {
        let generator = generator();
        let request = Request::get("/items/1?ref=x").with_header("Referer", "https://example.com/prev");
        assert_eq!(generator.canonical(&request), "https://example.com/items/1");
        assert_eq!(generator.full(&request), "https://example.com/items/1?ref=x");
        assert_eq!(generator.previous(&request, "/"), "https://example.com/prev");

        let no_referer = Request::get("/items/1");
        assert_eq!(generator.previous(&no_referer, "/"), "https://example.com/");
    }

    #[test]
    fn test_signed_url_round_trip() {
        let signer = Arc::new(HmacUrlSigner::new("secret".as_bytes().to_vec()));
        let generator = generator().with_signer(signer.clone());

        let url = generator.signed("/confirm", 600, UrlType::AbsolutePath).unwrap();
        let (payload, signature) = url.rsplit_once("&signature=").unwrap();
        assert!(payload.starts_with("/confirm?expires="));
        assert!(signer.verify(payload, signature));
    }

    #[test]
    fn test_signed_requires_signer() {
        let generator = generator();
        let result = generator.signed("/confirm", 600, UrlType::AbsolutePath);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
