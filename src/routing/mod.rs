pub mod collection;
pub mod pattern;
pub mod route;
pub mod router;

pub use collection::{RouteCollection, RoutingResult};
pub use route::{Route, RouteAction, RouteArgs};
pub use router::Router;
