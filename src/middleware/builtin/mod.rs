//! Middleware shipped with the kernel.
//!
//! `ContentNegotiation`, `ResponsePreparation`, `MethodOverride` and
//! `RoutingMiddleware` form the kernel's fixed-order core;
//! `ValidateSignature` is registered by hosts that generate signed URLs.

pub mod method_override;
pub mod negotiation;
pub mod preparation;
pub mod routing;
pub mod validate_signature;

pub use method_override::MethodOverride;
pub use negotiation::ContentNegotiation;
pub use preparation::ResponsePreparation;
pub use routing::RoutingMiddleware;
pub use validate_signature::ValidateSignature;
