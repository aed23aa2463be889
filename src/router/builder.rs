use http::Method;

use super::core::Router;
use super::route::{parse_method, Methods, Route, RouteOptions, RouteTable};
use crate::config::RouterConfig;
use crate::dispatcher::Dispatcher;
use crate::error::RouterError;
use crate::handler::{HandlerContext, HandlerRef, Reply, Service};
use crate::registry::HandlerRegistry;
use crate::resolver::CallableResolver;

/// Route registration API shared by [`RouterBuilder`] and mounted [`Scope`]s.
///
/// Implementors only provide [`add_route`](Registrar::add_route) and
/// [`scope`](Registrar::scope); every shorthand is built on those two.
pub trait Registrar {
    /// Register `handler` for `method` under the current prefix.
    fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerRef,
        options: RouteOptions,
    ) -> &mut Self;

    /// Run `block` against a child scope whose prefix is the current prefix
    /// followed by `prefix`. When `service` is `Some`, it replaces the
    /// current service inside the block.
    fn scope<F>(&mut self, prefix: &str, service: Option<Service>, block: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>);

    /// Register for one method, several methods, or the wildcard set.
    fn route(
        &mut self,
        methods: impl Into<Methods>,
        pattern: &str,
        handler: impl Into<HandlerRef>,
        options: RouteOptions,
    ) -> &mut Self {
        let handler = handler.into();
        for method in methods.into().expand() {
            self.add_route(method, pattern, handler.clone(), options.clone());
        }
        self
    }

    fn get(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::GET, pattern, handler.into(), RouteOptions::default())
    }

    fn post(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::POST, pattern, handler.into(), RouteOptions::default())
    }

    fn put(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::PUT, pattern, handler.into(), RouteOptions::default())
    }

    fn patch(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::PATCH, pattern, handler.into(), RouteOptions::default())
    }

    fn delete(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::DELETE, pattern, handler.into(), RouteOptions::default())
    }

    fn head(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::HEAD, pattern, handler.into(), RouteOptions::default())
    }

    fn options(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::OPTIONS, pattern, handler.into(), RouteOptions::default())
    }

    fn trace(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::TRACE, pattern, handler.into(), RouteOptions::default())
    }

    fn connect(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.add_route(Method::CONNECT, pattern, handler.into(), RouteOptions::default())
    }

    /// Register the same handler for GET and POST.
    fn get_and_post(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        let handler = handler.into();
        self.add_route(Method::GET, pattern, handler.clone(), RouteOptions::default())
            .add_route(Method::POST, pattern, handler, RouteOptions::default())
    }

    /// Group registrations under a shared path prefix.
    ///
    /// Prefixes concatenate as plain strings: `mount("/api/", ..)` followed
    /// by `get("/x", ..)` registers `/api//x`.
    fn mount<F>(&mut self, prefix: &str, block: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        self.scope(prefix, None, block)
    }

    /// Like [`mount`](Registrar::mount), with a service for the block's routes.
    fn mount_with_service<F>(&mut self, prefix: &str, service: Service, block: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        self.scope(prefix, Some(service), block)
    }
}

fn push_route(
    table: &mut RouteTable,
    prefix: &str,
    service: Option<&Service>,
    method: Method,
    pattern: &str,
    handler: HandlerRef,
    options: RouteOptions,
) {
    // Extension and lower-case methods are stored upper-cased.
    let method = parse_method(method.as_str()).unwrap_or(method);
    let mut full = String::with_capacity(prefix.len() + pattern.len());
    full.push_str(prefix);
    full.push_str(pattern);
    table.insert(Route {
        method,
        pattern: full,
        handler,
        options,
        service: service.cloned(),
    });
}

/// Registration scope handed to mount blocks.
///
/// A scope borrows the table being built and owns its own prefix and service,
/// so leaving the block cannot leak either into sibling registrations.
pub struct Scope<'a> {
    table: &'a mut RouteTable,
    prefix: String,
    service: Option<Service>,
}

impl Scope<'_> {
    /// Effective prefix of this scope.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Registrar for Scope<'_> {
    fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerRef,
        options: RouteOptions,
    ) -> &mut Self {
        push_route(
            self.table,
            &self.prefix,
            self.service.as_ref(),
            method,
            pattern,
            handler,
            options,
        );
        self
    }

    fn scope<F>(&mut self, prefix: &str, service: Option<Service>, block: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        let mut child = Scope {
            prefix: format!("{}{}", self.prefix, prefix),
            service: service.or_else(|| self.service.clone()),
            table: &mut *self.table,
        };
        block(&mut child);
        self
    }
}

/// Collects routes, handlers and settings, then builds a [`Dispatcher`].
///
/// ```rust
/// use chainrouter::handler::{HandlerContext, Reply};
/// use chainrouter::router::{Registrar, RouterBuilder};
///
/// let mut builder = RouterBuilder::new();
/// builder.register("Users::show", |ctx: &mut HandlerContext<'_>| {
///     Ok(Reply::Text(format!("user {}", ctx.param(0).unwrap_or_default())))
/// });
/// builder.mount("/api", |api| {
///     api.get(r"/users/(\d+)", "Users.show");
/// });
/// let dispatcher = builder.build().unwrap();
/// assert_eq!(dispatcher.router().route_count(), 1);
/// ```
#[derive(Default)]
pub struct RouterBuilder {
    config: RouterConfig,
    registry: HandlerRegistry,
    table: RouteTable,
    service: Option<Service>,
    not_found: Option<HandlerRef>,
}

impl RouterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Replace the handler registry used for name resolution.
    pub fn set_registry(&mut self, registry: HandlerRegistry) -> &mut Self {
        self.registry = registry;
        self
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Register a named handler (fully qualified name).
    pub fn register<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut HandlerContext<'_>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.registry.register(name, handler);
        self
    }

    /// Service attached to routes registered from here on, outside of
    /// mounts that bring their own.
    pub fn set_service(&mut self, service: Service) -> &mut Self {
        self.service = Some(service);
        self
    }

    #[must_use]
    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    /// Handler invoked with `[method, path]` when nothing matches.
    ///
    /// `None` restores the built-in handler, which aborts with 404.
    pub fn set_not_found(&mut self, handler: Option<HandlerRef>) -> &mut Self {
        self.not_found = handler;
        self
    }

    /// Routes registered so far.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Compile every pattern and freeze the table.
    pub fn build(self) -> Result<Dispatcher, RouterError> {
        let router = Router::compile(self.table, self.config.log_routes)?;
        let resolver = CallableResolver::new(&self.config, self.registry);
        Ok(Dispatcher::new(router, resolver, self.not_found))
    }
}

impl Registrar for RouterBuilder {
    fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerRef,
        options: RouteOptions,
    ) -> &mut Self {
        push_route(
            &mut self.table,
            "",
            self.service.as_ref(),
            method,
            pattern,
            handler,
            options,
        );
        self
    }

    fn scope<F>(&mut self, prefix: &str, service: Option<Service>, block: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        let mut child = Scope {
            prefix: prefix.to_string(),
            service: service.or_else(|| self.service.clone()),
            table: &mut self.table,
        };
        block(&mut child);
        self
    }
}
