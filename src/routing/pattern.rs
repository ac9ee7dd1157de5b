//! Route pattern compiler.
//!
//! Path templates use `{name}` placeholders for dynamic segments and
//! `{name?}` for trailing optional segments. Each template compiles once,
//! at collection-construction time, into an anchored regex; per-parameter
//! constraints become sub-patterns that must consume the whole segment.
//! Trailing slashes are significant: `/foo` and `/foo/` are different
//! patterns and never match each other's requests.

use crate::error::{Error, Result};
use crate::routing::route::RouteArgs;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)(\?)?\}$").expect("placeholder regex is valid")
});

/// One parsed segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Parameter { name: String, required: bool },
}

/// A compiled, reusable path matcher for a single route.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    regex: Regex,
    segments: Vec<Segment>,
    constraints: HashMap<String, Regex>,
    trailing_slash: bool,
}

impl CompiledPattern {
    pub fn compile(pattern: &str, constraints: &HashMap<String, String>) -> Result<Self> {
        if !pattern.starts_with('/') {
            return Err(Error::invalid_route_pattern(
                pattern,
                "patterns must start with '/'",
            ));
        }

        let trailing_slash = pattern.len() > 1 && pattern.ends_with('/');
        let segments = Self::parse_segments(pattern)?;

        let mut source = String::from("^");
        if segments.is_empty() {
            source.push('/');
        }
        for segment in &segments {
            match segment {
                Segment::Static(literal) => {
                    source.push('/');
                    source.push_str(&regex::escape(literal));
                }
                Segment::Parameter { name, required } => {
                    let sub = constraints.get(name).map(String::as_str).unwrap_or("[^/]+");
                    if *required {
                        source.push_str(&format!("/(?P<{}>(?:{}))", name, sub));
                    } else {
                        source.push_str(&format!("(?:/(?P<{}>(?:{})))?", name, sub));
                    }
                }
            }
        }
        if trailing_slash && !segments.is_empty() {
            source.push('/');
        }
        source.push('$');

        let regex = Regex::new(&source)
            .map_err(|e| Error::invalid_route_pattern(pattern, e.to_string()))?;

        let mut compiled_constraints = HashMap::new();
        for (name, sub) in constraints {
            let anchored = Regex::new(&format!("^(?:{})$", sub)).map_err(|e| {
                Error::invalid_route_pattern(
                    pattern,
                    format!("constraint '{}' for '{}': {}", sub, name, e),
                )
            })?;
            compiled_constraints.insert(name.clone(), anchored);
        }

        Ok(Self {
            raw: pattern.to_string(),
            regex,
            segments,
            constraints: compiled_constraints,
            trailing_slash,
        })
    }

    fn parse_segments(pattern: &str) -> Result<Vec<Segment>> {
        let trimmed = pattern.trim_matches('/');
        let mut segments = Vec::new();

        if !trimmed.is_empty() {
            for part in trimmed.split('/') {
                if part.is_empty() {
                    return Err(Error::invalid_route_pattern(pattern, "empty path segment"));
                }
                if let Some(caps) = PLACEHOLDER.captures(part) {
                    segments.push(Segment::Parameter {
                        name: caps[1].to_string(),
                        required: caps.get(2).is_none(),
                    });
                } else if part.contains('{') || part.contains('}') {
                    // Placeholders must span a whole segment
                    return Err(Error::invalid_route_pattern(
                        pattern,
                        format!("malformed placeholder in segment '{}'", part),
                    ));
                } else {
                    segments.push(Segment::Static(part.to_string()));
                }
            }
        }

        let mut seen_optional = false;
        for segment in &segments {
            match segment {
                Segment::Parameter { required: false, .. } => seen_optional = true,
                _ if seen_optional => {
                    return Err(Error::invalid_route_pattern(
                        pattern,
                        "optional parameters must be trailing",
                    ));
                }
                _ => {}
            }
        }

        Ok(segments)
    }

    /// Test a request path against this pattern. Captured placeholder values
    /// are percent-decoded; absent optional placeholders are simply omitted.
    pub fn match_path(&self, path: &str) -> Option<RouteArgs> {
        let caps = self.regex.captures(path)?;
        let mut args = RouteArgs::new();
        for segment in &self.segments {
            if let Segment::Parameter { name, .. } = segment {
                if let Some(value) = caps.name(name) {
                    let decoded = percent_decode_str(value.as_str())
                        .decode_utf8_lossy()
                        .to_string();
                    args.insert(name.clone(), decoded);
                }
            }
        }
        Some(args)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Validate a caller-supplied value against the parameter's constraint.
    /// Unconstrained parameters accept anything.
    pub fn satisfies_constraint(&self, parameter: &str, value: &str) -> bool {
        self.constraints
            .get(parameter)
            .map(|regex| regex.is_match(value))
            .unwrap_or(true)
    }

    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Parameter { name, .. } => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> CompiledPattern {
        CompiledPattern::compile(pattern, &HashMap::new()).unwrap()
    }

    #[test]
    fn test_static_pattern() {
        let pattern = compile("/users/profile");
        assert!(pattern.match_path("/users/profile").is_some());
        assert!(pattern.match_path("/users").is_none());
        assert!(pattern.match_path("/users/profile/extra").is_none());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = compile("/");
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("/foo").is_none());
    }

    #[test]
    fn test_parameter_capture() {
        let pattern = compile("/users/{id}/posts/{post_id}");
        let args = pattern.match_path("/users/456/posts/789").unwrap();
        assert_eq!(args.get("id").map(String::as_str), Some("456"));
        assert_eq!(args.get("post_id").map(String::as_str), Some("789"));
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        let pattern = compile("/tags/{tag}");
        let args = pattern.match_path("/tags/caf%C3%A9").unwrap();
        assert_eq!(args.get("tag").map(String::as_str), Some("café"));
    }

    #[test]
    fn test_trailing_slash_is_strict() {
        let without = compile("/foo");
        assert!(without.match_path("/foo").is_some());
        assert!(without.match_path("/foo/").is_none());

        let with = compile("/foo/");
        assert!(with.match_path("/foo/").is_some());
        assert!(with.match_path("/foo").is_none());
    }

    #[test]
    fn test_constraint_limits_match() {
        let mut constraints = HashMap::new();
        constraints.insert("id".to_string(), "[0-9]+".to_string());
        let pattern = CompiledPattern::compile("/items/{id}", &constraints).unwrap();

        assert!(pattern.match_path("/items/42").is_some());
        assert!(pattern.match_path("/items/abc").is_none());
        assert!(pattern.satisfies_constraint("id", "42"));
        assert!(!pattern.satisfies_constraint("id", "abc"));
    }

    #[test]
    fn test_optional_parameter() {
        let pattern = compile("/archive/{year?}");
        assert!(pattern.match_path("/archive").is_some());
        let args = pattern.match_path("/archive/2021").unwrap();
        assert_eq!(args.get("year").map(String::as_str), Some("2021"));
    }

    #[test]
    fn test_optional_must_be_trailing() {
        let result = CompiledPattern::compile("/a/{x?}/b", &HashMap::new());
        assert!(matches!(
            result,
            Err(Error::InvalidRoutePattern { .. })
        ));
    }

    #[test]
    fn test_malformed_placeholder_is_rejected() {
        assert!(CompiledPattern::compile("/a/{bad", &HashMap::new()).is_err());
        assert!(CompiledPattern::compile("/a/pre{fix}", &HashMap::new()).is_err());
        assert!(CompiledPattern::compile("relative/path", &HashMap::new()).is_err());
    }
}
