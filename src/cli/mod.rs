//! # CLI Module
//!
//! Command line access to route manifests.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the compiled routing table of a manifest:
//!
//! ```bash
//! chainrouter routes routes.yaml
//! ```
//!
//! ### `match`
//!
//! Dispatch one request against a manifest. Every handler name is bound to
//! the echo handler, so the output shows what a real handler would receive:
//!
//! ```bash
//! chainrouter match routes.yaml GET '/users/42?tab=posts'
//! ```
//!
//! ### `cgi`
//!
//! Dispatch the request described by the CGI environment (`REQUEST_METHOD`,
//! `REQUEST_URI`) and write a CGI response to stdout:
//!
//! ```bash
//! REQUEST_METHOD=GET REQUEST_URI=/health chainrouter cgi routes.yaml
//! ```
//!
//! Every command accepts `--config <FILE>` with a YAML
//! [`RouterConfig`](crate::config::RouterConfig); without it the configuration
//! is read from the environment.

mod commands;


pub use commands::{cgi_response, load_dispatcher, run, run_cli, Cli, Commands};
