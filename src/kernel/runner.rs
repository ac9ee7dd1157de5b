use crate::contracts::{HostDelegate, ResponseConverter};
use crate::error::Result;
use crate::http::{Request, Response};
use crate::middleware::{MiddlewarePipeline, MiddlewareStack};
use crate::routing::RouteAction;
use std::sync::Arc;

/// Terminal stage of the kernel pipeline.
///
/// Consumes the request's routing result and either runs the matched
/// controller behind its route + controller middleware chain, or delegates
/// the request to the host environment (running any always-on middleware
/// first). Each dispatch gets a fresh pipeline via the value semantics of
/// [`MiddlewarePipeline::send`].
pub struct RouteRunner {
    pipeline: MiddlewarePipeline,
    stack: Arc<MiddlewareStack>,
    converter: Arc<dyn ResponseConverter>,
    host: Arc<dyn HostDelegate>,
}

impl RouteRunner {
    pub fn new(
        pipeline: MiddlewarePipeline,
        stack: Arc<MiddlewareStack>,
        converter: Arc<dyn ResponseConverter>,
        host: Arc<dyn HostDelegate>,
    ) -> Self {
        Self {
            pipeline,
            stack,
            converter,
            host,
        }
    }

    pub fn run(&self, request: Request) -> Result<Response> {
        let routing = request.routing_result().clone();

        let Some(route) = routing.route().map(Arc::clone) else {
            return self.delegate_to_host(request);
        };

        match route.action() {
            RouteAction::DelegateToHost => {
                let blueprints = self
                    .stack
                    .create_with_route_middleware(route.middleware_names())?;
                let host = Arc::clone(&self.host);

                if blueprints.is_empty() {
                    return Ok(host.delegate_to_host(&request));
                }

                self.pipeline
                    .send(request)
                    .through(blueprints)
                    .then(move |request| Ok(host.delegate_to_host(&request)))
            }
            RouteAction::Controller(controller) => {
                let controller = Arc::clone(controller);

                // Route middleware first, controller middleware appended
                let mut names = route.middleware_names().to_vec();
                names.extend(controller.middleware());
                let blueprints = self.stack.create_with_route_middleware(&names)?;

                // Decoded segments win over plain defaults on key collision
                let mut args = routing.decoded_segments().clone();
                for (key, value) in route.defaults() {
                    if !args.contains_key(key) {
                        args.insert(key.clone(), value.clone());
                    }
                }

                let converter = Arc::clone(&self.converter);
                self.pipeline
                    .send(request)
                    .through(blueprints)
                    .then(move |request| {
                        let output = controller.handle(&request, &args)?;
                        converter.to_response(output, &request)
                    })
            }
        }
    }

    fn delegate_to_host(&self, request: Request) -> Result<Response> {
        let blueprints = self.stack.create_for_request_without_route()?;

        if blueprints.is_empty() {
            return Ok(self.host.delegate_to_host(&request));
        }

        log::debug!(
            "no route for {} {}, running {} always-on middleware before host delegation",
            request.method(),
            request.path(),
            blueprints.len()
        );

        let host = Arc::clone(&self.host);
        self.pipeline
            .send(request)
            .through(blueprints)
            .then(move |request| Ok(host.delegate_to_host(&request)))
    }
}
