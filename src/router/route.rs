use std::collections::HashMap;
use std::str::FromStr;

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::RouterError;
use crate::handler::{HandlerRef, Service};

/// Methods a wildcard (`*`) registration expands to, in registration order.
pub const WILDCARD_METHODS: [Method; 8] = [
    Method::GET,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::TRACE,
    Method::POST,
    Method::HEAD,
];

/// How a route pattern is compared against a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact string equality, no parameters
    Literal,
    /// Anchored regular expression, capture groups become parameters
    Regex,
}

/// Per-route options.
///
/// `no-regex` forces literal matching. Every other key is passed through to
/// the handler untouched (see [`HandlerContext::option`]).
///
/// [`HandlerContext::option`]: crate::handler::HandlerContext::option
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    #[serde(rename = "no-regex", default)]
    pub no_regex: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteOptions {
    /// Options forcing literal path matching.
    #[must_use]
    pub fn literal() -> Self {
        Self {
            no_regex: true,
            ..Self::default()
        }
    }

    /// Add a pass-through option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    #[must_use]
    pub fn match_mode(&self) -> MatchMode {
        if self.no_regex {
            MatchMode::Literal
        } else {
            MatchMode::Regex
        }
    }
}

/// Method selector accepted by [`Registrar::route`](super::Registrar::route).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Methods {
    /// The wildcard set, see [`WILDCARD_METHODS`]
    Any,
    One(Method),
    Many(Vec<Method>),
}

impl Methods {
    /// Concrete methods this selector registers under.
    #[must_use]
    pub fn expand(&self) -> Vec<Method> {
        match self {
            Methods::Any => WILDCARD_METHODS.to_vec(),
            Methods::One(m) => vec![m.clone()],
            Methods::Many(ms) => ms.clone(),
        }
    }
}

impl From<Method> for Methods {
    fn from(m: Method) -> Self {
        Methods::One(m)
    }
}

impl From<Vec<Method>> for Methods {
    fn from(ms: Vec<Method>) -> Self {
        Methods::Many(ms)
    }
}

impl FromStr for Methods {
    type Err = RouterError;

    /// `"*"` is the wildcard; anything else is upper-cased and parsed as a
    /// single method token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(Methods::Any);
        }
        parse_method(s).map(Methods::One)
    }
}

/// Parse a method string, normalizing it to upper case.
pub fn parse_method(raw: &str) -> Result<Method, RouterError> {
    let upper = raw.to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| RouterError::InvalidMethod(raw.to_string()))
}

/// A single registration.
///
/// `pattern` already includes every mount prefix that was active when the
/// route was added.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: String,
    pub handler: HandlerRef,
    pub options: RouteOptions,
    /// Service active at registration time
    pub service: Option<Service>,
}

impl Route {
    #[must_use]
    pub fn match_mode(&self) -> MatchMode {
        self.options.match_mode()
    }
}

/// Registration-time route storage: one ordered bucket per method.
///
/// Order inside a bucket is the order of first registration and decides
/// which route wins when several match.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    buckets: HashMap<Method, Vec<Route>>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route to its method bucket.
    ///
    /// A route with the same method and pattern replaces the earlier one in
    /// place, keeping its position.
    pub fn insert(&mut self, route: Route) {
        let bucket = self.buckets.entry(route.method.clone()).or_default();
        if let Some(existing) = bucket.iter_mut().find(|r| r.pattern == route.pattern) {
            warn!(
                method = %route.method,
                pattern = %route.pattern,
                previous_handler = %existing.handler.label(),
                handler = %route.handler.label(),
                "Replaced existing route"
            );
            *existing = route;
        } else {
            bucket.push(route);
        }
    }

    /// Routes registered for `method`, in order.
    #[must_use]
    pub fn bucket(&self, method: &Method) -> &[Route] {
        self.buckets.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Methods that have at least one route, sorted by name.
    #[must_use]
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.buckets.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_buckets(self) -> HashMap<Method, Vec<Route>> {
        self.buckets
    }
}
