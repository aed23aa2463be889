//! # chainrouter
//!
//! **chainrouter** is a regex request router: it maps an HTTP method and path
//! to a registered handler, extracts capture groups as ordered parameters,
//! invokes the handler with a per-route context, and folds the handler's
//! output into an `http::Response`.
//!
//! ## Overview
//!
//! Routes are registered on a [`RouterBuilder`] per method, optionally grouped
//! under mount prefixes. Patterns are regular expressions anchored at both
//! ends, or literal strings when the `no-regex` option is set. Matching is
//! first-registered, first-matched.
//!
//! Handlers are referenced by name (`"@Users.show"`), by target and member
//! (`("@Users", "show")`), or as pre-bound closures. Names are resolved on
//! every dispatch through a [`HandlerRegistry`].
//!
//! ## Architecture
//!
//! - **[`router`]** - Registration, mounts, pattern compilation and matching
//! - **[`resolver`]** - Handler reference naming and registry lookup
//! - **[`dispatcher`]** - Invocation, output capture and response materialization
//! - **[`middleware`]** - Chain-of-responsibility plumbing
//! - **[`server`]** - Ambient (CGI) request state and CGI output
//! - **[`manifest`]** - Routing tables declared in YAML
//! - **[`cli`]** - The `chainrouter` command line
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Dispatcher
//!     participant Router
//!     participant Resolver as CallableResolver
//!     participant Handler
//!
//!     Host->>Dispatcher: dispatch(GET, "/users/42")
//!     Dispatcher->>Router: find_route(GET, "/users/42")
//!     alt No Route Match
//!         Router-->>Dispatcher: None
//!         Dispatcher->>Handler: not-found handler [GET, /users/42]
//!     else Match
//!         Router-->>Dispatcher: RouteMatch { params: ["42"] }
//!         Dispatcher->>Resolver: resolve("@Users.show")
//!         Resolver-->>Dispatcher: App::Users::show
//!         Dispatcher->>Handler: call(ctx with params, options, service, output)
//!     end
//!     Handler-->>Dispatcher: Reply + captured output
//!     Dispatcher-->>Host: DispatchOutcome
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chainrouter::config::RouterConfig;
//! use chainrouter::dispatcher::DispatchOutcome;
//! use chainrouter::handler::{HandlerContext, Reply};
//! use chainrouter::router::{Registrar, RouterBuilder};
//! use http::Method;
//!
//! let mut builder = RouterBuilder::with_config(RouterConfig::with_namespace("App"));
//! builder.register("App::Users::show", |ctx: &mut HandlerContext<'_>| {
//!     Ok(Reply::Text(format!("user {}", ctx.param(0).unwrap_or_default())))
//! });
//! builder.mount("/api", |api| {
//!     api.get(r"/users/(\d+)", "@Users.show");
//! });
//!
//! let dispatcher = builder.build()?;
//! match dispatcher.dispatch(&Method::GET, "/api/users/42")? {
//!     DispatchOutcome::Text(body) => assert_eq!(body, "user 42"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok::<(), chainrouter::RouterError>(())
//! ```

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod handler;
pub mod logging;
pub mod manifest;
pub mod middleware;
pub mod output;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod server;

pub use config::RouterConfig;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::RouterError;
pub use handler::{Handler, HandlerContext, HandlerRef, Reply};
pub use manifest::RouteManifest;
pub use registry::HandlerRegistry;
pub use router::{Registrar, RouterBuilder, SharedRouter};
