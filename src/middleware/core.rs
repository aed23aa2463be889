use std::fmt;
use std::sync::Arc;

use http::{Request, Response};

use crate::error::RouterError;
use crate::handler::Body;

/// Produces a response for a request. The terminal link of a chain.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &Request<Body>) -> anyhow::Result<Response<Body>>;
}

impl<F> RequestHandler for F
where
    F: Fn(&Request<Body>) -> anyhow::Result<Response<Body>> + Send + Sync,
{
    fn handle(&self, request: &Request<Body>) -> anyhow::Result<Response<Body>> {
        self(request)
    }
}

/// One link of a chain: receives the request and the rest of the chain.
pub trait Middleware: Send + Sync {
    fn process(
        &self,
        request: &Request<Body>,
        next: &dyn RequestHandler,
    ) -> Result<Response<Body>, RouterError>;
}

/// Middlewares wrapped around a terminal handler.
///
/// The first middleware added is the outermost one.
pub struct Chain {
    middlewares: Vec<Arc<dyn Middleware>>,
    terminal: Arc<dyn RequestHandler>,
}

impl Chain {
    pub fn new(terminal: impl RequestHandler + 'static) -> Self {
        Self {
            middlewares: Vec::new(),
            terminal: Arc::new(terminal),
        }
    }

    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Add a middleware that is shared with other owners.
    #[must_use]
    pub fn with_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run the chain, keeping the router's error type.
    pub fn run(&self, request: &Request<Body>) -> Result<Response<Body>, RouterError> {
        let next = Next {
            rest: &self.middlewares,
            terminal: self.terminal.as_ref(),
        };
        next.run(request)
    }
}

impl RequestHandler for Chain {
    fn handle(&self, request: &Request<Body>) -> anyhow::Result<Response<Body>> {
        self.run(request).map_err(RouterError::into_anyhow)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// The remainder of a chain, as seen by one middleware.
struct Next<'a> {
    rest: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn RequestHandler,
}

impl Next<'_> {
    fn run(&self, request: &Request<Body>) -> Result<Response<Body>, RouterError> {
        match self.rest.split_first() {
            Some((middleware, rest)) => middleware.process(
                request,
                &Next {
                    rest,
                    terminal: self.terminal,
                },
            ),
            None => self.terminal.handle(request).map_err(RouterError::Handler),
        }
    }
}

impl RequestHandler for Next<'_> {
    fn handle(&self, request: &Request<Body>) -> anyhow::Result<Response<Body>> {
        self.run(request).map_err(RouterError::into_anyhow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    struct Tag(&'static str);

    impl Middleware for Tag {
        fn process(
            &self,
            request: &Request<Body>,
            next: &dyn RequestHandler,
        ) -> Result<Response<Body>, RouterError> {
            let mut response = next.handle(request).map_err(RouterError::Handler)?;
            response.body_mut().extend_from_slice(self.0.as_bytes());
            Ok(response)
        }
    }

    fn terminal(_: &Request<Body>) -> anyhow::Result<Response<Body>> {
        Ok(Response::new(b"t".to_vec()))
    }

    #[test]
    fn test_outermost_runs_last_on_the_way_out() {
        let chain = Chain::new(terminal).with(Tag("a")).with(Tag("b"));
        let response = chain.handle(&Request::new(Body::new())).unwrap();
        assert_eq!(response.body(), b"tba");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_terminal_error_is_not_rewrapped() {
        let chain = Chain::new(|_: &Request<Body>| -> anyhow::Result<Response<Body>> {
            anyhow::bail!("upstream down")
        })
        .with(Tag("a"));
        match chain.run(&Request::new(Body::new())) {
            Err(RouterError::Handler(e)) => assert_eq!(e.to_string(), "upstream down"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_empty_chain_calls_terminal() {
        let chain = Chain::new(terminal);
        let response = chain.handle(&Request::new(Body::new())).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(chain.is_empty());
    }
}
