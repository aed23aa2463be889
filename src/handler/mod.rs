//! # Handler Module
//!
//! Defines what a route handler is and what it sees when invoked.
//!
//! ## Overview
//!
//! - [`Handler`] is the invokable seam. Closures of the shape
//!   `Fn(&mut HandlerContext<'_>) -> anyhow::Result<Reply>` implement it.
//! - [`HandlerContext`] carries the matched method and path, the ordered path
//!   parameters, the route options, the per-route service, the originating
//!   request (middleware mode only) and a scoped [`OutputBuffer`].
//! - [`Reply`] is what a handler returns. An empty reply lets the captured
//!   output become the body.
//! - [`HandlerRef`] is the stored, not yet resolved reference a route points
//!   at: a name, a target/member pair, or an invokable.
//!
//! ## Example
//!
//! ```rust
//! use chainrouter::handler::{HandlerContext, HandlerRef, Reply};
//! use std::fmt::Write;
//!
//! let show_user = HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
//!     let id = ctx.param(0).unwrap_or("?").to_string();
//!     write!(ctx.output(), "user {id}")?;
//!     Ok(Reply::Empty)
//! });
//! # let _ = show_user;
//! ```
//!
//! [`OutputBuffer`]: crate::output::OutputBuffer

mod core;
mod reference;

pub use core::{Body, Handler, HandlerContext, Reply, Service};
pub use reference::HandlerRef;
