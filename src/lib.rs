//! Weft - HTTP routing and middleware pipeline composition
//!
//! Weft is the routing and dispatch core of a web application, packaged as a
//! standalone library:
//! - Route registration with `{name}` placeholders, constraints and defaults
//! - First-match-wins matching over an immutable route collection
//! - Ordered middleware composition with aliases, groups and priorities
//! - URL generation (absolute/path/secure/signed) with one global
//!   trailing-slash policy
//! - A fixed-order HTTP kernel that always answers with a response
//!
//! The surrounding runtime (server adapter, controller resolution, error
//! pages) plugs in through the narrow traits in [`contracts`].

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod config;
pub mod contracts;
pub mod error;
pub mod http;
pub mod kernel;
pub mod middleware;
pub mod routing;
pub mod url;

// Re-export main types for public API
pub use config::{MiddlewareConfig, RoutingConfig, UrlConfig};
pub use contracts::{
    ActionOutput, Controller, DefaultResponseConverter, ErrorHandler, HostDelegate,
    LogErrorHandler, NotFoundHostDelegate, NullErrorHandler, ResponseConverter,
};
pub use error::{Error, Result};
pub use http::{Request, Response};
pub use kernel::{HttpKernel, HttpKernelBuilder, RouteRunner};
pub use middleware::builtin::{
    ContentNegotiation, MethodOverride, ResponsePreparation, RoutingMiddleware, ValidateSignature,
};
pub use middleware::{
    Middleware, MiddlewareArg, MiddlewareBlueprint, MiddlewarePipeline, MiddlewareRegistry,
    MiddlewareStack, NextMiddleware,
};
pub use routing::{Route, RouteAction, RouteArgs, RouteCollection, Router, RoutingResult};
pub use url::{HmacUrlSigner, UrlGenerationContext, UrlGenerator, UrlSigner, UrlType};

// Re-export commonly used external types
pub use serde::{Deserialize, Serialize};
pub use serde_json::{json, Value};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::contracts::{ActionOutput, Controller, ErrorHandler, HostDelegate};
    pub use crate::error::{Error, Result};
    pub use crate::http::{Request, Response};
    pub use crate::kernel::HttpKernel;
    pub use crate::middleware::{Middleware, MiddlewareStack, NextMiddleware};
    pub use crate::routing::{Route, RouteArgs, RouteCollection};
    pub use crate::url::{UrlGenerationContext, UrlGenerator, UrlType};
    pub use serde_json::json;
}
