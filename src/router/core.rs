//! Router core module - hot path for request routing.
//!
//! Patterns are compiled once in [`Router::compile`]; matching afterwards only
//! walks the method bucket in registration order.

use http::Method;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::pattern::{CompiledPattern, ParamVec};
use super::route::{Route, RouteTable};
use crate::error::RouterError;

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (shared with the table)
    pub route: Arc<Route>,
    /// Capture groups in declaration order, whole match excluded
    pub params: ParamVec,
}

impl RouteMatch {
    /// Parameter at `index`, if captured.
    #[inline]
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    route: Arc<Route>,
    pattern: CompiledPattern,
}

/// Immutable, compiled routing table.
///
/// Built once from a [`RouteTable`]; safe to share between threads for
/// lookups.
#[derive(Debug, Clone, Default)]
pub struct Router {
    buckets: HashMap<Method, Vec<CompiledRoute>>,
}

impl Router {
    /// Compile every route of `table`.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidPattern`] for the first regex that fails to
    /// compile.
    pub fn compile(table: RouteTable, log_routes: bool) -> Result<Self, RouterError> {
        let mut buckets = HashMap::new();
        for (method, routes) in table.into_buckets() {
            let compiled = routes
                .into_iter()
                .map(|route| {
                    let pattern = CompiledPattern::compile(&route.pattern, route.match_mode())?;
                    Ok(CompiledRoute {
                        route: Arc::new(route),
                        pattern,
                    })
                })
                .collect::<Result<Vec<_>, RouterError>>()?;
            buckets.insert(method, compiled);
        }

        let router = Self { buckets };

        let routes_summary: Vec<String> = router
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method, r.pattern))
            .collect();
        info!(
            routes_count = router.route_count(),
            methods = ?router.methods(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
        if log_routes {
            for route in router.iter() {
                info!(
                    method = %route.method,
                    pattern = %route.pattern,
                    handler = %route.handler.label(),
                    no_regex = route.options.no_regex,
                    "Route registered"
                );
            }
        }

        Ok(router)
    }

    /// Find the first route of `method` whose pattern matches `path`.
    ///
    /// A method without any route is an immediate miss.
    #[must_use]
    pub fn find_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();
        let Some(bucket) = self.buckets.get(method) else {
            warn!(method = %method, path = %path, "No routes for method");
            return None;
        };

        let found = bucket.iter().find_map(|compiled| {
            compiled
                .pattern
                .captures(path)
                .map(|params| (compiled, params))
        });
        let match_duration = match_start.elapsed();

        if let Some((compiled, params)) = found {
            if match_duration > Duration::from_millis(1) {
                warn!(
                    method = %method,
                    path = %path,
                    route_pattern = %compiled.route.pattern,
                    candidates = bucket.len(),
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                info!(
                    method = %method,
                    path = %path,
                    route_pattern = %compiled.route.pattern,
                    handler = %compiled.route.handler.label(),
                    params = ?params,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }
            return Some(RouteMatch {
                route: Arc::clone(&compiled.route),
                params,
            });
        }

        warn!(
            method = %method,
            path = %path,
            candidates = bucket.len(),
            duration_us = match_duration.as_micros(),
            "No route matched"
        );
        None
    }

    /// Routes of one method, in match order.
    pub fn routes_for<'a>(&'a self, method: &Method) -> impl Iterator<Item = &'a Route> + 'a {
        self.buckets
            .get(method)
            .into_iter()
            .flat_map(|bucket| bucket.iter().map(|c| c.route.as_ref()))
    }

    /// All routes, grouped by method (methods sorted by name).
    pub fn iter(&self) -> impl Iterator<Item = &Route> + '_ {
        self.methods()
            .into_iter()
            .flat_map(move |m| self.routes_for(&m).collect::<Vec<_>>())
    }

    /// Methods that have at least one route, sorted by name.
    #[must_use]
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.buckets.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Print all registered routes to stdout.
    pub fn dump_routes(&self) -> io::Result<()> {
        self.write_routes(&mut io::stdout().lock())
    }

    /// Write one line per route, grouped by method, in match order.
    pub fn write_routes<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "[routes] count={}", self.route_count())?;
        for route in self.iter() {
            let mode = if route.options.no_regex { "literal" } else { "regex" };
            writeln!(
                out,
                "[route] {} {} ({mode}) -> {}",
                route.method,
                route.pattern,
                route.handler.label()
            )?;
        }
        Ok(())
    }
}
