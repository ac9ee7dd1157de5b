//! Top-level request orchestration.
//!
//! The kernel wires the fixed-order core middleware, the configured global
//! middleware and the route runner into one pipeline:
//!
//! content negotiation → response preparation → method override → global
//! middleware → routing → route runner.
//!
//! The order is an invariant: the method override must run before routing so
//! overridden verbs take part in matching, and negotiation must run before
//! response preparation so prepared headers reflect the negotiated
//! representation.

pub mod runner;

pub use runner::RouteRunner;

use crate::contracts::{
    DefaultResponseConverter, ErrorHandler, HostDelegate, LogErrorHandler, NotFoundHostDelegate,
    ResponseConverter,
};
use crate::error::Result;
use crate::http::{Request, Response};
use crate::middleware::builtin::{
    ContentNegotiation, MethodOverride, ResponsePreparation, RoutingMiddleware,
};
use crate::middleware::{
    MiddlewareArg, MiddlewareBlueprint, MiddlewarePipeline, MiddlewareRegistry, MiddlewareStack,
};
use crate::middleware::Middleware;
use crate::routing::{RouteCollection, Router};
use std::sync::Arc;

// Reserved ids for the kernel's own middleware
const NEGOTIATION: &str = "kernel.negotiation";
const PREPARATION: &str = "kernel.preparation";
const METHOD_OVERRIDE: &str = "kernel.method_override";
const ROUTING: &str = "kernel.routing";

/// The top-level orchestrator. `handle` always produces a response; faults
/// are contained by the pipeline and converted through the error handler.
pub struct HttpKernel {
    pipeline: MiddlewarePipeline,
    runner: RouteRunner,
    stack: Arc<MiddlewareStack>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl HttpKernel {
    pub fn builder(routes: Arc<RouteCollection>) -> HttpKernelBuilder {
        HttpKernelBuilder::new(routes)
    }

    pub fn handle(&self, request: Request) -> Response {
        let chain = match self.chain() {
            Ok(chain) => chain,
            Err(e) => {
                self.error_handler.report(&e, &request);
                return self.error_handler.to_http_response(&e, &request);
            }
        };

        let boundary = request.clone();
        let mut pipeline = self.pipeline.send(request).through(chain);

        match pipeline.then(|request| self.runner.run(request)) {
            Ok(response) => response,
            Err(e) => {
                // Unreachable with a correctly built kernel; fail safe anyway
                self.error_handler.report(&e, &boundary);
                self.error_handler.to_http_response(&e, &boundary)
            }
        }
    }

    fn chain(&self) -> Result<Vec<MiddlewareBlueprint>> {
        let mut chain = vec![
            MiddlewareBlueprint::new(NEGOTIATION),
            MiddlewareBlueprint::new(PREPARATION),
            MiddlewareBlueprint::new(METHOD_OVERRIDE),
        ];
        chain.extend(self.stack.global_middleware()?);
        chain.push(MiddlewareBlueprint::new(ROUTING));
        Ok(chain)
    }
}

/// Assembles an [`HttpKernel`] with sensible defaults: logging error
/// handler, default response coercion and a 404 host delegate.
pub struct HttpKernelBuilder {
    routes: Arc<RouteCollection>,
    stack: MiddlewareStack,
    registry: MiddlewareRegistry,
    error_handler: Arc<dyn ErrorHandler>,
    converter: Arc<dyn ResponseConverter>,
    host: Arc<dyn HostDelegate>,
    content_types: Vec<String>,
}

impl HttpKernelBuilder {
    fn new(routes: Arc<RouteCollection>) -> Self {
        Self {
            routes,
            stack: MiddlewareStack::new(),
            registry: MiddlewareRegistry::new(),
            error_handler: Arc::new(LogErrorHandler),
            converter: Arc::new(DefaultResponseConverter),
            host: Arc::new(NotFoundHostDelegate),
            content_types: vec!["text/html".to_string(), "application/json".to_string()],
        }
    }

    pub fn middleware_stack(mut self, stack: MiddlewareStack) -> Self {
        self.stack = stack;
        self
    }

    /// Register a middleware factory under an id so routes and groups can
    /// refer to it by name.
    pub fn register_middleware<F>(mut self, id: &str, factory: F) -> Self
    where
        F: Fn(&[MiddlewareArg]) -> Result<Box<dyn Middleware>> + Send + Sync + 'static,
    {
        self.registry.register(id, factory);
        self
    }

    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    pub fn response_converter(mut self, converter: Arc<dyn ResponseConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn host_delegate(mut self, host: Arc<dyn HostDelegate>) -> Self {
        self.host = host;
        self
    }

    /// Representations offered during content negotiation, most preferred
    /// first.
    pub fn content_types(mut self, types: &[&str]) -> Self {
        self.content_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn build(self) -> HttpKernel {
        let router = Arc::new(Router::new(Arc::clone(&self.routes)));
        let mut registry = self.registry;

        let supported = self.content_types;
        registry.register(NEGOTIATION, move |_args| {
            let types: Vec<&str> = supported.iter().map(String::as_str).collect();
            Ok(Box::new(ContentNegotiation::new(&types)))
        });
        registry.register(PREPARATION, |_args| Ok(Box::new(ResponsePreparation)));
        registry.register(METHOD_OVERRIDE, |_args| Ok(Box::new(MethodOverride)));
        let routing_router = Arc::clone(&router);
        registry.register(ROUTING, move |_args| {
            Ok(Box::new(RoutingMiddleware::new(Arc::clone(&routing_router))))
        });

        let registry = Arc::new(registry);
        let stack = Arc::new(self.stack);
        let pipeline = MiddlewarePipeline::new(Arc::clone(&registry), Arc::clone(&self.error_handler));
        let runner = RouteRunner::new(
            pipeline.clone(),
            Arc::clone(&stack),
            self.converter,
            self.host,
        );

        HttpKernel {
            pipeline,
            runner,
            stack,
            error_handler: self.error_handler,
        }
    }
}
