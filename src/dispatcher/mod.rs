//! # Dispatcher Module
//!
//! Turns a matched route into a response.
//!
//! ## Request Flow
//!
//! 1. The [`Router`](crate::router::Router) finds the first route for the
//!    method and path, or nothing.
//! 2. On a miss the not-found handler is called with `[method, path]` as its
//!    parameters. The built-in one aborts with `404`.
//! 3. The handler reference is resolved through the
//!    [`CallableResolver`](crate::resolver::CallableResolver), on every call.
//! 4. The handler runs with a fresh [`OutputBuffer`](crate::output::OutputBuffer).
//! 5. Its reply and captured output are reconciled into a [`DispatchOutcome`].
//!
//! ## Entry Points
//!
//! - [`Dispatcher::dispatch`]: method and path supplied by the caller
//! - [`Dispatcher::dispatch_ambient`]: from an
//!   [`AmbientRequest`](crate::server::AmbientRequest)
//! - [`Dispatcher::process`]: as a [`Middleware`](crate::middleware::Middleware)
//!   that calls the downstream handler first and overlays its own outcome
//!
//! ## Error Handling
//!
//! Nothing is caught. Resolution errors and handler errors reach the caller
//! unchanged, as [`RouterError`](crate::error::RouterError) values.

mod core;

pub use core::{
    materialize, reconcile, DispatchOutcome, Dispatcher, DEFAULT_JSON_CONTENT_TYPE,
    DEFAULT_TEXT_CONTENT_TYPE,
};
