use crate::config::UrlConfig;

/// Site-wide context for outbound URL generation: host, default scheme,
/// ports and the global trailing-slash policy. Constructed once at boot and
/// shared read-only; every generated URL honors the same policy so links stay
/// consistent across a site.
#[derive(Debug, Clone)]
pub struct UrlGenerationContext {
    host: String,
    https_by_default: bool,
    http_port: u16,
    https_port: u16,
    trailing_slash: bool,
}

impl UrlGenerationContext {
    pub fn new(host: &str) -> Self {
        let host = host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');

        Self {
            host: host.to_string(),
            https_by_default: true,
            http_port: 80,
            https_port: 443,
            trailing_slash: false,
        }
    }

    pub fn from_config(config: &UrlConfig) -> Self {
        let mut context = Self::new(&config.host);
        context.https_by_default = config.secure;
        context.http_port = config.http_port;
        context.https_port = config.https_port;
        context.trailing_slash = config.trailing_slash;
        context
    }

    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    pub fn with_https_port(mut self, port: u16) -> Self {
        self.https_port = port;
        self
    }

    pub fn http_by_default(mut self) -> Self {
        self.https_by_default = false;
        self
    }

    pub fn with_trailing_slash(mut self, trailing_slash: bool) -> Self {
        self.trailing_slash = trailing_slash;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn https_by_default(&self) -> bool {
        self.https_by_default
    }

    pub fn trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    pub fn scheme(&self, secure: bool) -> &'static str {
        if secure {
            "https"
        } else {
            "http"
        }
    }

    /// `host` or `host:port`, omitting the scheme's default port.
    pub fn authority(&self, secure: bool) -> String {
        let (port, default) = if secure {
            (self.https_port, 443)
        } else {
            (self.http_port, 80)
        };

        if port == default {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, port)
        }
    }

    /// `scheme://authority`, without a trailing slash.
    pub fn base_url(&self, secure: bool) -> String {
        format!("{}://{}", self.scheme(secure), self.authority(secure))
    }
}
