//! # Router Module
//!
//! Route registration and path matching.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Collecting registrations per HTTP method, in registration order
//! - Composing mount prefixes (and mount services) during registration
//! - Compiling each pattern once, either as a literal or an anchored regex
//! - Finding the first route whose pattern matches a request path and
//!   extracting its capture groups as ordered parameters
//!
//! ## Architecture
//!
//! 1. **Registration**: a [`RouterBuilder`] (or a nested [`Scope`] handed to a
//!    mount block) implements [`Registrar`]. Every registration lands in a
//!    [`RouteTable`] with the active prefix already baked into its pattern.
//!
//! 2. **Compilation**: [`RouterBuilder::build`] turns the table into an
//!    immutable [`Router`] and wraps it in a
//!    [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! 3. **Publishing**: a [`SharedRouter`] hands the built dispatcher to many
//!    readers and swaps in rebuilt tables atomically.
//!
//! 4. **Matching**: [`Router::find_route`] walks the method bucket and stops at
//!    the first match. Registration order is the only tie-break.
//!
//! ## Pattern rules
//!
//! - An empty pattern never matches.
//! - A missing leading `/` is added; one trailing `/` is removed (except for
//!   `/` itself).
//! - With `no-regex` the normalized pattern must equal the path.
//! - Otherwise the pattern is a regular expression anchored as `^...$`.
//!
//! ## Example
//!
//! ```rust
//! use chainrouter::router::{Registrar, RouterBuilder, RouteOptions};
//! use http::Method;
//!
//! let mut builder = RouterBuilder::new();
//! builder.get(r"/users/(\d+)", "Users.show");
//! builder.route(Method::GET, "/files/a.b", "Files.raw", RouteOptions::literal());
//! let dispatcher = builder.build().unwrap();
//!
//! let m = dispatcher.router().find_route(&Method::GET, "/users/42").unwrap();
//! assert_eq!(m.param(0), Some("42"));
//! assert!(dispatcher.router().find_route(&Method::GET, "/files/aXb").is_none());
//! ```

mod builder;
mod core;
mod pattern;
mod route;
mod shared;

pub use builder::{Registrar, RouterBuilder, Scope};
pub use core::{RouteMatch, Router};
pub use pattern::{
    check_route, normalize_pattern, CompiledPattern, ParamVec, MAX_INLINE_PARAMS,
};
pub use route::{
    parse_method, MatchMode, Methods, Route, RouteOptions, RouteTable, WILDCARD_METHODS,
};
pub use shared::SharedRouter;
