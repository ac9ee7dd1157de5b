use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration for the routing core.
///
/// Deserializable so hosts can keep it in a TOML section next to their own
/// settings; with the `config` feature it can also be loaded from a file
/// directly:
///
/// ```toml
/// [url]
/// host = "example.com"
/// trailing_slash = true
///
/// [middleware]
/// priority = ["session", "auth"]
/// global = ["web"]
///
/// [middleware.aliases]
/// signed = "validate_signature:absolute"
///
/// [middleware.groups]
/// web = ["session", "auth"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoutingConfig {
    #[serde(default)]
    pub url: UrlConfig,

    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Default scheme for generated URLs when no override is given.
    #[serde(default = "default_secure")]
    pub secure: bool,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    #[serde(default = "default_https_port")]
    pub https_port: u16,

    /// The single site-wide trailing-slash policy.
    #[serde(default)]
    pub trailing_slash: bool,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            secure: default_secure(),
            http_port: default_http_port(),
            https_port: default_https_port(),
            trailing_slash: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MiddlewareConfig {
    /// Alias name → implementation id, optionally with bound arguments.
    #[serde(default)]
    pub aliases: HashMap<String, String>,

    /// Group name → ordered member list; members may be ids, aliases or
    /// other groups.
    #[serde(default)]
    pub groups: IndexMap<String, Vec<String>>,

    /// Ids that must run before all unlisted middleware, in this order.
    #[serde(default)]
    pub priority: Vec<String>,

    /// Groups the kernel runs for every request.
    #[serde(default)]
    pub global: Vec<String>,

    /// Global groups that still run when no route matched.
    #[serde(default)]
    pub always_run_without_route: Vec<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_secure() -> bool {
    true
}

fn default_http_port() -> u16 {
    80
}

fn default_https_port() -> u16 {
    443
}

impl RoutingConfig {
    #[cfg(feature = "config")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    #[cfg(feature = "config")]
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| crate::error::Error::configuration(e.to_string()))
    }
}
