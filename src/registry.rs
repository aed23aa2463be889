//! Named handler registry.
//!
//! Routes that reference handlers by name are resolved against this registry
//! at dispatch time. Names are stored fully qualified, i.e. after alias and
//! separator normalization (`App::Users::show`, not `@Users.show`).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::handler::{Handler, HandlerContext, Reply};

/// Map of fully qualified handler names to invokables.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure under `name`.
    ///
    /// An existing handler with the same name is replaced.
    pub fn register<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut HandlerContext<'_>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.register_handler(name, Arc::new(handler))
    }

    /// Register an already shared handler under `name`.
    pub fn register_handler(&mut self, name: &str, handler: Arc<dyn Handler>) -> &mut Self {
        if self.handlers.insert(name.to_string(), handler).is_some() {
            warn!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Replaced existing handler"
            );
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler registered successfully"
            );
        }
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_replace() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("App::Home::index", |_ctx| Ok(Reply::from("one")))
            .register("App::Home::about", |_ctx| Ok(Reply::Empty));
        assert_eq!(registry.len(), 2);

        registry.register("App::Home::index", |_ctx| Ok(Reply::from("two")));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("App::Home::index"));
        assert_eq!(registry.names(), vec!["App::Home::about", "App::Home::index"]);
        assert!(registry.get("App::Missing").is_none());
    }
}
