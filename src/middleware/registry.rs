use crate::error::{Error, Result};
use crate::middleware::blueprint::{MiddlewareArg, MiddlewareBlueprint};
use crate::middleware::Middleware;
use std::collections::HashMap;

type MiddlewareFactory = Box<dyn Fn(&[MiddlewareArg]) -> Result<Box<dyn Middleware>> + Send + Sync>;

/// Typed registry mapping middleware ids to factory closures.
///
/// Blueprints carry raw string arguments; the registry coerces them to
/// [`MiddlewareArg`] values before invoking the factory, so conversion is a
/// single explicit step at this boundary rather than scattered through
/// middleware constructors.
#[derive(Default)]
pub struct MiddlewareRegistry {
    factories: HashMap<String, MiddlewareFactory>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory for a middleware id. Re-registering an id replaces
    /// the previous factory.
    pub fn register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(&[MiddlewareArg]) -> Result<Box<dyn Middleware>> + Send + Sync + 'static,
    {
        self.factories.insert(id.to_string(), Box::new(factory));
    }

    /// Instantiate the middleware a blueprint refers to.
    pub fn create(&self, blueprint: &MiddlewareBlueprint) -> Result<Box<dyn Middleware>> {
        let factory = self
            .factories
            .get(blueprint.id())
            .ok_or_else(|| Error::UnknownMiddleware(blueprint.id().to_string()))?;

        let arguments: Vec<MiddlewareArg> = blueprint
            .arguments()
            .iter()
            .map(|raw| MiddlewareArg::coerce(raw))
            .collect();

        factory(&arguments)
            .map_err(|e| Error::middleware_construction(blueprint.id(), e.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, Response};
    use crate::middleware::NextMiddleware;

    struct Tagger {
        tag: String,
        enabled: bool,
    }

    impl Middleware for Tagger {
        fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response> {
            let mut response = next.handle(request);
            if self.enabled {
                response.add_header("X-Tag", &self.tag);
            }
            Ok(response)
        }
    }

    fn registry() -> MiddlewareRegistry {
        let mut registry = MiddlewareRegistry::new();
        registry.register("tag", |args| {
            let tag = args
                .first()
                .and_then(MiddlewareArg::as_str)
                .unwrap_or("default")
                .to_string();
            let enabled = args.get(1).and_then(MiddlewareArg::as_bool).unwrap_or(true);
            Ok(Box::new(Tagger { tag, enabled }))
        });
        registry
    }

    #[test]
    fn test_create_with_coerced_arguments() {
        let registry = registry();
        let blueprint = MiddlewareBlueprint::parse("tag:hello,false");
        assert!(registry.create(&blueprint).is_ok());
    }

    #[test]
    fn test_unknown_id_fails() {
        let registry = registry();
        let result = registry.create(&MiddlewareBlueprint::new("missing"));
        assert!(matches!(result, Err(Error::UnknownMiddleware(id)) if id == "missing"));
    }

    #[test]
    fn test_factory_error_is_wrapped() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("bad", |_args| {
            Err(Error::configuration("factory requires a signer"))
        });
        let result = registry.create(&MiddlewareBlueprint::new("bad"));
        assert!(matches!(result, Err(Error::MiddlewareConstruction { .. })));
    }
}
