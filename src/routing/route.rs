use crate::contracts::Controller;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Decoded path segments merged with route defaults, in declaration order.
pub type RouteArgs = IndexMap<String, String>;

/// What a matched route dispatches to.
#[derive(Clone)]
pub enum RouteAction {
    Controller(Arc<dyn Controller>),
    /// Marker action: hand the request back to the host environment.
    DelegateToHost,
}

/// An immutable route descriptor.
///
/// Routes are built with the verb constructors and chainable setters, then
/// handed to a [`RouteCollection`](crate::routing::RouteCollection) which
/// compiles and freezes them. Patterns use `{name}` placeholders for dynamic
/// segments and `{name?}` for trailing optional ones:
///
/// ```rust,ignore
/// Route::get("/items/{id}", show_item)
///     .name("item.show")
///     .numeric("id")
///     .middleware(&["auth"])
/// ```
#[derive(Clone)]
pub struct Route {
    pattern: String,
    methods: Vec<String>,
    name: Option<String>,
    action: RouteAction,
    middleware: Vec<String>,
    defaults: IndexMap<String, String>,
    constraints: HashMap<String, String>,
}

impl Route {
    pub fn new<C: Controller + 'static>(methods: &[&str], pattern: &str, controller: C) -> Self {
        Self::with_action(
            methods,
            pattern,
            RouteAction::Controller(Arc::new(controller)),
        )
    }

    fn with_action(methods: &[&str], pattern: &str, action: RouteAction) -> Self {
        Self {
            pattern: pattern.to_string(),
            methods: methods.iter().map(|m| m.to_uppercase()).collect(),
            name: None,
            action,
            middleware: Vec::new(),
            defaults: IndexMap::new(),
            constraints: HashMap::new(),
        }
    }

    pub fn get<C: Controller + 'static>(pattern: &str, controller: C) -> Self {
        Self::new(&["GET"], pattern, controller)
    }

    pub fn post<C: Controller + 'static>(pattern: &str, controller: C) -> Self {
        Self::new(&["POST"], pattern, controller)
    }

    pub fn put<C: Controller + 'static>(pattern: &str, controller: C) -> Self {
        Self::new(&["PUT"], pattern, controller)
    }

    pub fn patch<C: Controller + 'static>(pattern: &str, controller: C) -> Self {
        Self::new(&["PATCH"], pattern, controller)
    }

    pub fn delete<C: Controller + 'static>(pattern: &str, controller: C) -> Self {
        Self::new(&["DELETE"], pattern, controller)
    }

    pub fn any<C: Controller + 'static>(pattern: &str, controller: C) -> Self {
        Self::new(
            &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"],
            pattern,
            controller,
        )
    }

    /// A route whose only job is to hand matched requests back to the host
    /// environment, after running its route middleware.
    pub fn delegate(methods: &[&str], pattern: &str) -> Self {
        Self::with_action(methods, pattern, RouteAction::DelegateToHost)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Append middleware identifiers. Each entry may carry `:`-separated
    /// arguments, e.g. `"signed:absolute"`.
    pub fn middleware(mut self, names: &[&str]) -> Self {
        self.middleware.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Default value for a parameter absent from the matched path.
    pub fn default_value(mut self, parameter: &str, value: &str) -> Self {
        self.defaults
            .insert(parameter.to_string(), value.to_string());
        self
    }

    /// Constrain a parameter with a raw regex (matched against the whole
    /// segment).
    pub fn constraint(mut self, parameter: &str, regex: &str) -> Self {
        self.constraints
            .insert(parameter.to_string(), regex.to_string());
        self
    }

    pub fn numeric(self, parameter: &str) -> Self {
        self.constraint(parameter, "[0-9]+")
    }

    pub fn alpha(self, parameter: &str) -> Self {
        self.constraint(parameter, "[a-zA-Z]+")
    }

    pub fn alphanumeric(self, parameter: &str) -> Self {
        self.constraint(parameter, "[a-zA-Z0-9]+")
    }

    pub fn one_of(self, parameter: &str, values: &[&str]) -> Self {
        let alternatives = values
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        self.constraint(parameter, &alternatives)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == &method.to_uppercase())
    }

    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn action(&self) -> &RouteAction {
        &self.action
    }

    pub fn middleware_names(&self) -> &[String] {
        &self.middleware
    }

    pub fn defaults(&self) -> &IndexMap<String, String> {
        &self.defaults
    }

    pub fn constraints(&self) -> &HashMap<String, String> {
        &self.constraints
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .field("middleware", &self.middleware)
            .finish()
    }
}
