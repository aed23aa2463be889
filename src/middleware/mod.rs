//! Chain-of-responsibility plumbing around request handlers.
//!
//! A [`Chain`] owns a terminal [`RequestHandler`] and an ordered list of
//! [`Middleware`]s. Each middleware decides when to call the rest of the
//! chain; the [`Dispatcher`](crate::dispatcher::Dispatcher) calls it first and
//! overlays its own outcome afterwards.

mod core;
mod tracing;

pub use core::{Chain, Middleware, RequestHandler};
pub use tracing::TracingMiddleware;
