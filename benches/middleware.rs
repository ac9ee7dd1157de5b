use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use weft::{
    Middleware, MiddlewareBlueprint, MiddlewarePipeline, MiddlewareRegistry, MiddlewareStack,
    NextMiddleware, NullErrorHandler, Request, Response, Result,
};

struct PassThrough;

impl Middleware for PassThrough {
    fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response> {
        Ok(next.handle(request))
    }
}

fn benchmark_pipeline_depth(c: &mut Criterion) {
    let mut registry = MiddlewareRegistry::new();
    registry.register("pass", |_args| Ok(Box::new(PassThrough)));
    let base = MiddlewarePipeline::new(Arc::new(registry), Arc::new(NullErrorHandler));

    for depth in [1usize, 4, 16] {
        let blueprints: Vec<MiddlewareBlueprint> =
            (0..depth).map(|_| MiddlewareBlueprint::new("pass")).collect();
        let pipeline = base.through(blueprints);

        c.bench_function(&format!("pipeline_depth_{}", depth), |b| {
            b.iter(|| {
                let response = pipeline
                    .send(Request::get(black_box("/")))
                    .then(|_request| Ok(Response::ok()))
                    .unwrap();
                black_box(response.status);
            })
        });
    }
}

fn benchmark_stack_resolution(c: &mut Criterion) {
    let stack = MiddlewareStack::new()
        .alias("signed", "validate_signature:absolute")
        .group("web", &["session", "csrf", "signed"])
        .group("admin", &["web", "auth"])
        .priority(&["session", "auth"]);

    let names: Vec<String> = vec!["admin".to_string(), "throttle:60".to_string()];

    c.bench_function("stack_resolution", |b| {
        b.iter(|| {
            let resolved = stack.create_with_route_middleware(black_box(&names)).unwrap();
            black_box(resolved.len());
        })
    });
}

criterion_group!(benches, benchmark_pipeline_depth, benchmark_stack_resolution);
criterion_main!(benches);
