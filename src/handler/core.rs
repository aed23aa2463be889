use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::{Method, Request, Response, StatusCode};
use serde_json::Value;

use crate::output::OutputBuffer;
use crate::router::RouteOptions;

/// Body type of the protocol request/response objects the router exchanges.
pub type Body = Vec<u8>;

/// Per-route context object shared with every invocation of a route.
///
/// Downcast with [`HandlerContext::service`].
pub type Service = Arc<dyn Any + Send + Sync>;

/// Value returned by a handler.
///
/// `Empty`, an empty `Text` and an empty `Json` (see [`Reply::is_empty`]) are
/// all "no explicit value"; the dispatcher then falls back to whatever the
/// handler wrote to its output.
#[derive(Debug, Default)]
pub enum Reply {
    /// No explicit value
    #[default]
    Empty,
    /// Text body
    Text(String),
    /// Structured body, serialized as JSON
    Json(Value),
    /// A complete protocol response, passed through untouched
    Response(Response<Body>),
    /// Stop producing output and answer with this status and no body
    Abort(StatusCode),
}

impl Reply {
    /// Whether this reply carries no explicit value.
    ///
    /// JSON `null`, `false`, `""`, `[]` and `{}` count as empty, so captured
    /// output wins over them. Numbers, including zero, are always a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Reply::Empty => true,
            Reply::Text(s) => s.is_empty(),
            Reply::Json(v) => json_is_empty(v),
            Reply::Response(_) | Reply::Abort(_) => false,
        }
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Reply::Text(s)
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

impl From<Value> for Reply {
    fn from(v: Value) -> Self {
        Reply::Json(v)
    }
}

impl From<Response<Body>> for Reply {
    fn from(r: Response<Body>) -> Self {
        Reply::Response(r)
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Reply::Empty
    }
}

/// Everything a handler can see about the request it is serving.
pub struct HandlerContext<'a> {
    method: &'a Method,
    path: &'a str,
    params: &'a [String],
    options: Option<&'a RouteOptions>,
    service: Option<&'a Service>,
    request: Option<&'a Request<Body>>,
    output: &'a mut OutputBuffer,
}

impl<'a> HandlerContext<'a> {
    /// Create a context with no options, service or request attached.
    pub fn new(
        method: &'a Method,
        path: &'a str,
        params: &'a [String],
        output: &'a mut OutputBuffer,
    ) -> Self {
        Self {
            method,
            path,
            params,
            options: None,
            service: None,
            request: None,
            output,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: &'a RouteOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn with_service(mut self, service: Option<&'a Service>) -> Self {
        self.service = service;
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: Option<&'a Request<Body>>) -> Self {
        self.request = request;
        self
    }

    /// HTTP method of the request being served.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.method
    }

    /// Normalized request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path
    }

    /// Ordered path parameters (capture groups, whole match excluded).
    ///
    /// For the not-found handler these are `[method, path]`.
    #[must_use]
    pub fn params(&self) -> &[String] {
        self.params
    }

    /// Path parameter at `index`, if captured.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Route options, absent for the not-found handler.
    #[must_use]
    pub fn options(&self) -> Option<&RouteOptions> {
        self.options
    }

    /// Look up a pass-through route option by key.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.and_then(|o| o.get(key))
    }

    /// Service attached to the route, downcast to `T`.
    #[must_use]
    pub fn service<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.service.and_then(|s| s.downcast_ref::<T>())
    }

    /// The originating request when dispatched as a middleware step.
    #[must_use]
    pub fn request(&self) -> Option<&Request<Body>> {
        self.request
    }

    /// Scoped output sink for this invocation.
    pub fn output(&mut self) -> &mut OutputBuffer {
        &mut *self.output
    }

    /// Append text to the captured output.
    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }
}

impl fmt::Debug for HandlerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("method", self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("options", &self.options)
            .field("has_service", &self.service.is_some())
            .field("has_request", &self.request.is_some())
            .field("output_len", &self.output.len())
            .finish()
    }
}

/// An invokable route target.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: &mut HandlerContext<'_>) -> anyhow::Result<Reply>;
}

impl<F> Handler for F
where
    F: Fn(&mut HandlerContext<'_>) -> anyhow::Result<Reply> + Send + Sync,
{
    fn call(&self, ctx: &mut HandlerContext<'_>) -> anyhow::Result<Reply> {
        self(ctx)
    }
}

fn json_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Number(_) => false,
    }
}
