use std::time::Instant;

use http::{Request, Response};
use tracing::{error, field, info, info_span};

use super::{Middleware, RequestHandler};
use crate::error::RouterError;
use crate::handler::Body;

/// Wraps the rest of the chain in a `request` span and logs status and
/// latency once it returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn process(
        &self,
        request: &Request<Body>,
        next: &dyn RequestHandler,
    ) -> Result<Response<Body>, RouterError> {
        let span = info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            status = field::Empty,
            latency_ms = field::Empty
        );
        let _guard = span.enter();
        let start = Instant::now();

        let result = next.handle(request).map_err(RouterError::Handler);
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.record("latency_ms", latency_ms);

        match &result {
            Ok(response) => {
                let status = response.status().as_u16();
                span.record("status", status);
                info!(status, latency_ms, "Request completed");
            }
            Err(e) => error!(error = %e, latency_ms, "Request failed"),
        }
        result
    }
}
