use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use http::{Method, Request, Response};
use tracing::info;

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::RouterError;
use crate::handler::Body;
use crate::middleware::{Middleware, RequestHandler};

/// A built [`Dispatcher`] published to concurrent readers.
///
/// Readers never block; a rebuilt table is swapped in as a whole, so a
/// request sees either the old table or the new one.
pub struct SharedRouter {
    current: ArcSwap<Dispatcher>,
}

impl SharedRouter {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            current: ArcSwap::from_pointee(dispatcher),
        }
    }

    /// Snapshot of the current dispatcher.
    #[must_use]
    pub fn load(&self) -> Arc<Dispatcher> {
        self.current.load_full()
    }

    /// Replace the published dispatcher, returning the previous one.
    pub fn publish(&self, dispatcher: Dispatcher) -> Arc<Dispatcher> {
        let routes_count = dispatcher.router().route_count();
        let previous = self.current.swap(Arc::new(dispatcher));
        info!(
            routes_count,
            previous_routes_count = previous.router().route_count(),
            "Routing table published"
        );
        previous
    }

    pub fn dispatch(&self, method: &Method, path: &str) -> Result<DispatchOutcome, RouterError> {
        self.current.load().dispatch(method, path)
    }
}

impl Middleware for SharedRouter {
    fn process(
        &self,
        request: &Request<Body>,
        next: &dyn RequestHandler,
    ) -> Result<Response<Body>, RouterError> {
        self.current.load().process(request, next)
    }
}

impl fmt::Debug for SharedRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRouter")
            .field("routes", &self.current.load().router().route_count())
            .finish()
    }
}
