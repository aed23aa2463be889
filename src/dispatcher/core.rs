//! Dispatcher core module - matching, invocation and materialization.
//!
//! A dispatch runs to completion on the calling thread: match, resolve,
//! invoke with a fresh output buffer, reconcile the reply with the captured
//! output. The buffer lives on the stack frame of [`Dispatcher::invoke`], so
//! it is released on every exit path, errors included.

use std::fmt;
use std::time::Instant;

use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::RouterError;
use crate::handler::{Body, HandlerContext, HandlerRef, Reply, Service};
use crate::middleware::{Middleware, RequestHandler};
use crate::output::OutputBuffer;
use crate::resolver::CallableResolver;
use crate::router::{RouteOptions, Router, RouterBuilder};
use crate::server::{extract_page, AmbientRequest};

/// Content type applied to text bodies when none is set.
pub const DEFAULT_TEXT_CONTENT_TYPE: &str = "text/html";

/// Content type applied to JSON bodies when none is set.
pub const DEFAULT_JSON_CONTENT_TYPE: &str = "application/json";

/// Raw result of a dispatch, before it is folded into a response.
#[derive(Debug)]
pub enum DispatchOutcome {
    Text(String),
    Json(Value),
    /// A handler-built response, returned as-is
    Response(Response<Body>),
    /// Terminal abort: the status is all that is left of the response
    Aborted(StatusCode),
}

impl DispatchOutcome {
    /// Materialize into a fresh `200 OK` response.
    #[must_use]
    pub fn into_response(self) -> Response<Body> {
        materialize(self, Response::new(Body::new()))
    }

    /// Text of a `Text` outcome.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, DispatchOutcome::Aborted(_))
    }
}

/// Fold a handler reply and its captured output into an outcome.
///
/// A non-empty reply wins; otherwise the captured output is used, which may
/// itself be empty.
#[must_use]
pub fn reconcile(reply: Reply, captured: OutputBuffer) -> DispatchOutcome {
    if reply.is_empty() {
        return DispatchOutcome::Text(captured.into_string());
    }
    match reply {
        Reply::Text(s) => DispatchOutcome::Text(s),
        Reply::Json(v) => DispatchOutcome::Json(v),
        Reply::Response(r) => DispatchOutcome::Response(r),
        Reply::Abort(status) => DispatchOutcome::Aborted(status),
        Reply::Empty => DispatchOutcome::Text(captured.into_string()),
    }
}

/// Overlay an outcome onto the response produced downstream.
///
/// Text and JSON are appended to the downstream body, and the content type is
/// only set when the downstream response has none.
#[must_use]
pub fn materialize(outcome: DispatchOutcome, mut downstream: Response<Body>) -> Response<Body> {
    match outcome {
        DispatchOutcome::Response(response) => response,
        DispatchOutcome::Aborted(status) => {
            *downstream.status_mut() = status;
            downstream.body_mut().clear();
            downstream
        }
        DispatchOutcome::Text(text) => {
            downstream.body_mut().extend_from_slice(text.as_bytes());
            default_content_type(&mut downstream, DEFAULT_TEXT_CONTENT_TYPE);
            downstream
        }
        DispatchOutcome::Json(value) => {
            downstream
                .body_mut()
                .extend_from_slice(value.to_string().as_bytes());
            default_content_type(&mut downstream, DEFAULT_JSON_CONTENT_TYPE);
            downstream
        }
    }
}

fn default_content_type(response: &mut Response<Body>, content_type: &'static str) {
    if !response.headers().contains_key(CONTENT_TYPE) {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
}

fn default_not_found(ctx: &mut HandlerContext<'_>) -> anyhow::Result<Reply> {
    info!(method = %ctx.method(), path = %ctx.path(), "Default not-found handler, aborting with 404");
    Ok(Reply::Abort(StatusCode::NOT_FOUND))
}

/// Everything a single handler invocation sees.
struct Invocation<'a> {
    method: &'a Method,
    path: &'a str,
    params: &'a [String],
    options: Option<&'a RouteOptions>,
    service: Option<&'a Service>,
    request: Option<&'a Request<Body>>,
}

/// Matches requests, invokes handlers and materializes their output.
///
/// Built by [`RouterBuilder::build`]; immutable afterwards and shareable
/// across threads.
pub struct Dispatcher {
    router: Router,
    resolver: CallableResolver,
    not_found: HandlerRef,
}

impl Dispatcher {
    /// Assemble a dispatcher. `None` selects the built-in not-found handler.
    #[must_use]
    pub fn new(router: Router, resolver: CallableResolver, not_found: Option<HandlerRef>) -> Self {
        Self {
            router,
            resolver,
            not_found: not_found.unwrap_or_else(|| HandlerRef::invokable(default_not_found)),
        }
    }

    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn resolver(&self) -> &CallableResolver {
        &self.resolver
    }

    /// Dispatch a method and an already normalized path.
    ///
    /// # Errors
    ///
    /// Resolution failures ([`RouterError::InvalidCallable`],
    /// [`RouterError::UnknownHandler`]) and handler failures
    /// ([`RouterError::Handler`]) are returned unmodified.
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<DispatchOutcome, RouterError> {
        self.dispatch_with(method, path, None)
    }

    /// Dispatch from ambient request state (method and raw request URI).
    pub fn dispatch_ambient(&self, ambient: &AmbientRequest) -> Result<DispatchOutcome, RouterError> {
        let method = ambient.method()?;
        let path = ambient.path();
        self.dispatch_with(&method, &path, None)
    }

    /// Run as one link of a middleware chain.
    ///
    /// The downstream handler runs first; this dispatcher's outcome is then
    /// overlaid onto its response (see [`materialize`]).
    pub fn process(
        &self,
        request: &Request<Body>,
        next: &dyn RequestHandler,
    ) -> Result<Response<Body>, RouterError> {
        let downstream = next.handle(request).map_err(RouterError::Handler)?;
        let uri = request
            .uri()
            .path_and_query()
            .map_or_else(|| request.uri().path(), |pq| pq.as_str());
        let path = extract_page(uri);
        let outcome = self.dispatch_with(request.method(), &path, Some(request))?;
        Ok(materialize(outcome, downstream))
    }

    fn dispatch_with(
        &self,
        method: &Method,
        path: &str,
        request: Option<&Request<Body>>,
    ) -> Result<DispatchOutcome, RouterError> {
        let start = Instant::now();
        let outcome = match self.router.find_route(method, path) {
            Some(matched) => {
                let route = matched.route.as_ref();
                self.invoke(
                    &route.handler,
                    Invocation {
                        method,
                        path,
                        params: &matched.params,
                        options: Some(&route.options),
                        service: route.service.as_ref(),
                        request,
                    },
                )?
            }
            None => {
                info!(method = %method, path = %path, "Invoking not-found handler");
                let params = [method.as_str().to_string(), path.to_string()];
                self.invoke(
                    &self.not_found,
                    Invocation {
                        method,
                        path,
                        params: &params,
                        options: None,
                        service: None,
                        request,
                    },
                )?
            }
        };
        debug!(
            method = %method,
            path = %path,
            aborted = outcome.is_aborted(),
            duration_us = start.elapsed().as_micros(),
            "Dispatch complete"
        );
        Ok(outcome)
    }

    fn invoke(
        &self,
        handler: &HandlerRef,
        call: Invocation<'_>,
    ) -> Result<DispatchOutcome, RouterError> {
        let resolved = self.resolver.resolve(handler).map_err(|e| {
            error!(handler = %handler.label(), error = %e, "Handler resolution failed");
            e
        })?;

        let mut output = OutputBuffer::new();
        let reply = {
            let mut ctx = HandlerContext::new(call.method, call.path, call.params, &mut output)
                .with_service(call.service)
                .with_request(call.request);
            if let Some(options) = call.options {
                ctx = ctx.with_options(options);
            }
            resolved.handler.call(&mut ctx)
        };

        match reply {
            Ok(reply) => Ok(reconcile(reply, output)),
            Err(e) => {
                error!(
                    handler = resolved.name.as_deref().unwrap_or("<invokable>"),
                    method = %call.method,
                    path = %call.path,
                    error = %e,
                    "Handler failed"
                );
                Err(RouterError::Handler(e))
            }
        }
    }
}

impl Middleware for Dispatcher {
    fn process(
        &self,
        request: &Request<Body>,
        next: &dyn RequestHandler,
    ) -> Result<Response<Body>, RouterError> {
        Dispatcher::process(self, request, next)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.router.route_count())
            .field("resolver", &self.resolver)
            .field("not_found", &self.not_found)
            .finish()
    }
}
