//! # Callable Resolution
//!
//! Turns a stored [`HandlerRef`] into something that can be invoked.
//!
//! Resolution happens in two steps:
//!
//! 1. [`CallableResolver::qualify`] applies the naming rules as pure string
//!    transforms. A leading `@` is replaced by the base namespace followed by
//!    the separator, then every `.` becomes the separator. For the
//!    target/member form only the target is transformed; the member is joined
//!    on with the separator.
//! 2. [`CallableResolver::resolve`] looks the qualified name up in the
//!    [`HandlerRegistry`].
//!
//! Nothing is cached: every dispatch re-resolves its route's reference.
//!
//! ```rust
//! use chainrouter::config::RouterConfig;
//! use chainrouter::handler::HandlerRef;
//! use chainrouter::registry::HandlerRegistry;
//! use chainrouter::resolver::{CallableResolver, Target};
//!
//! let resolver = CallableResolver::new(&RouterConfig::with_namespace("App"), HandlerRegistry::new());
//! match resolver.qualify(&HandlerRef::from("@Foo.bar")).unwrap() {
//!     Target::Named(name) => assert_eq!(name, "App::Foo::bar"),
//!     Target::Invokable(_) => unreachable!(),
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::handler::{Handler, HandlerRef};
use crate::registry::HandlerRegistry;

/// Alias marker standing for the base namespace.
pub const ALIAS_MARKER: char = '@';

/// Segment separator used in handler names as written on routes.
pub const NAME_SEPARATOR: char = '.';

/// Outcome of the pure naming step.
pub enum Target {
    /// Fully qualified registry name
    Named(String),
    /// Pre-bound invokable, passed through unchanged
    Invokable(Arc<dyn Handler>),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Named(n) => f.debug_tuple("Named").field(n).finish(),
            Target::Invokable(_) => f.write_str("Invokable(..)"),
        }
    }
}

/// A handler ready to be called, with the name it was resolved under.
#[derive(Clone)]
pub struct ResolvedHandler {
    /// Qualified name, `None` for invokables
    pub name: Option<String>,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for ResolvedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolves handler references against a registry.
#[derive(Debug, Clone)]
pub struct CallableResolver {
    base_namespace: String,
    separator: String,
    registry: HandlerRegistry,
}

impl CallableResolver {
    #[must_use]
    pub fn new(config: &RouterConfig, registry: HandlerRegistry) -> Self {
        Self {
            base_namespace: config.base_namespace.clone(),
            separator: config.separator.clone(),
            registry,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Apply alias substitution and separator conversion.
    pub fn qualify(&self, reference: &HandlerRef) -> Result<Target, RouterError> {
        match reference {
            HandlerRef::Name(name) => {
                if name.is_empty() {
                    return Err(RouterError::InvalidCallable(
                        "handler name must not be empty".to_string(),
                    ));
                }
                Ok(Target::Named(self.qualify_segment(name)))
            }
            HandlerRef::Member(target, member) => {
                if target.is_empty() || member.is_empty() {
                    return Err(RouterError::InvalidCallable(
                        "handler pair must contain exactly two non-empty names".to_string(),
                    ));
                }
                let mut qualified = self.qualify_segment(target);
                qualified.push_str(&self.separator);
                qualified.push_str(member);
                Ok(Target::Named(qualified))
            }
            HandlerRef::Invokable(handler) => Ok(Target::Invokable(Arc::clone(handler))),
        }
    }

    /// Qualify and look up a reference.
    pub fn resolve(&self, reference: &HandlerRef) -> Result<ResolvedHandler, RouterError> {
        match self.qualify(reference)? {
            Target::Invokable(handler) => Ok(ResolvedHandler {
                name: None,
                handler,
            }),
            Target::Named(name) => match self.registry.get(&name) {
                Some(handler) => {
                    debug!(handler_name = %name, "Handler resolved");
                    Ok(ResolvedHandler {
                        name: Some(name),
                        handler,
                    })
                }
                None => Err(RouterError::UnknownHandler { name }),
            },
        }
    }

    fn qualify_segment(&self, raw: &str) -> String {
        let expanded = match raw.strip_prefix(ALIAS_MARKER) {
            Some(rest) if self.base_namespace.is_empty() => rest.to_string(),
            Some(rest) => format!("{}{}{}", self.base_namespace, self.separator, rest),
            None => raw.to_string(),
        };
        expanded.replace(NAME_SEPARATOR, &self.separator)
    }
}
