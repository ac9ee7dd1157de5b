use std::fmt;

/// A resolved-but-not-yet-instantiated middleware reference: an
/// implementation id plus raw constructor arguments. Arguments stay plain
/// strings at the blueprint stage; coercion to native types happens at the
/// registry boundary when the middleware is instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MiddlewareBlueprint {
    id: String,
    arguments: Vec<String>,
}

impl MiddlewareBlueprint {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(id: &str, arguments: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            arguments,
        }
    }

    /// Parse a middleware definition string: `"signed:absolute,true"` becomes id
    /// `signed` with arguments `["absolute", "true"]`.
    pub fn parse(definition: &str) -> Self {
        match definition.split_once(':') {
            Some((id, args)) => Self::with_arguments(
                id,
                args.split(',').map(|a| a.trim().to_string()).collect(),
            ),
            None => Self::new(definition),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

impl fmt::Display for MiddlewareBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}:{}", self.id, self.arguments.join(","))
        }
    }
}

/// A coerced constructor argument. `"true"`/`"false"` become booleans and
/// numeric strings become integers, mirroring how operators write middleware
/// definitions in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareArg {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl MiddlewareArg {
    pub fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Int(value);
        }
        Self::Str(raw.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}
