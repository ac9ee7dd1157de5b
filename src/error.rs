use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the weft routing core
#[derive(Error, Debug)]
pub enum Error {
    // Boot-time configuration faults
    #[error("Duplicate route name: {0}")]
    DuplicateRouteName(String),

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidRoutePattern { pattern: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // URL generation faults, raised to the caller
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Bad parameter '{parameter}' for route '{route}': {reason}")]
    BadRouteParameter {
        route: String,
        parameter: String,
        reason: String,
    },

    // Middleware resolution faults
    #[error("Unknown middleware: {0}")]
    UnknownMiddleware(String),

    #[error("Middleware group cycle detected at '{0}'")]
    MiddlewareCycle(String),

    #[error("Middleware '{name}' could not be constructed: {message}")]
    MiddlewareConstruction { name: String, message: String },

    // Pipeline usage faults (programmer errors, fail fast)
    #[error("The middleware pipeline is exhausted")]
    PipelineExhausted,

    #[error("A middleware pipeline cannot run twice without calling send() first")]
    PipelineNotSent,

    // Per-request execution faults, contained at the pipeline boundary
    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Response coercion error: {0}")]
    ResponseCoercion(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    pub fn response_coercion(msg: impl Into<String>) -> Self {
        Self::ResponseCoercion(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_route_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoutePattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    pub fn bad_route_parameter(
        route: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::BadRouteParameter {
            route: route.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn middleware_construction(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MiddlewareConstruction {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True for faults that indicate API misuse rather than bad request data
    pub fn is_usage_fault(&self) -> bool {
        matches!(
            self,
            Error::PipelineExhausted
                | Error::PipelineNotSent
                | Error::DuplicateRouteName(_)
                | Error::InvalidRoutePattern { .. }
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::DuplicateRouteName(_) => "E_DUPLICATE_ROUTE_NAME",
            Error::InvalidRoutePattern { .. } => "E_INVALID_ROUTE_PATTERN",
            Error::Configuration(_) => "E_CONFIGURATION",
            Error::RouteNotFound(_) => "E_ROUTE_NOT_FOUND",
            Error::BadRouteParameter { .. } => "E_BAD_ROUTE_PARAMETER",
            Error::UnknownMiddleware(_) => "E_UNKNOWN_MIDDLEWARE",
            Error::MiddlewareCycle(_) => "E_MIDDLEWARE_CYCLE",
            Error::MiddlewareConstruction { .. } => "E_MIDDLEWARE_CONSTRUCTION",
            Error::PipelineExhausted => "E_PIPELINE_EXHAUSTED",
            Error::PipelineNotSent => "E_PIPELINE_NOT_SENT",
            Error::Handler(_) => "E_HANDLER",
            Error::ResponseCoercion(_) => "E_RESPONSE_COERCION",
            Error::Json(_) => "E_JSON",
            Error::Io(_) => "E_IO",
            Error::Internal(_) => "E_INTERNAL",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) => 404,
            _ => 500,
        }
    }
}
