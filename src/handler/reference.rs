use std::fmt;
use std::sync::Arc;

use super::core::{Handler, HandlerContext, Reply};

/// Stored reference to the operation a route invokes.
///
/// Names are resolved lazily, on every dispatch, by the
/// [`CallableResolver`](crate::resolver::CallableResolver). A leading `@`
/// stands for the configured base namespace and `.` separates segments.
#[derive(Clone)]
pub enum HandlerRef {
    /// A single name, e.g. `"@Users.show"`
    Name(String),
    /// A target plus member, e.g. `("@Users", "show")`
    Member(String, String),
    /// A pre-bound invokable, used as-is
    Invokable(Arc<dyn Handler>),
}

impl HandlerRef {
    /// Wrap a closure as a pre-bound handler.
    pub fn invokable<F>(f: F) -> Self
    where
        F: Fn(&mut HandlerContext<'_>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        HandlerRef::Invokable(Arc::new(f))
    }

    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        HandlerRef::Name(name.into())
    }

    #[must_use]
    pub fn member(target: impl Into<String>, member: impl Into<String>) -> Self {
        HandlerRef::Member(target.into(), member.into())
    }

    /// Short label for logs; invokables have no name.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            HandlerRef::Name(n) => n.clone(),
            HandlerRef::Member(t, m) => format!("{t}#{m}"),
            HandlerRef::Invokable(_) => "<invokable>".to_string(),
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Name(n) => f.debug_tuple("Name").field(n).finish(),
            HandlerRef::Member(t, m) => f.debug_tuple("Member").field(t).field(m).finish(),
            HandlerRef::Invokable(_) => f.write_str("Invokable(..)"),
        }
    }
}

impl From<&str> for HandlerRef {
    fn from(s: &str) -> Self {
        HandlerRef::Name(s.to_string())
    }
}

impl From<String> for HandlerRef {
    fn from(s: String) -> Self {
        HandlerRef::Name(s)
    }
}

impl From<(&str, &str)> for HandlerRef {
    fn from((target, member): (&str, &str)) -> Self {
        HandlerRef::Member(target.to_string(), member.to_string())
    }
}

impl From<(String, String)> for HandlerRef {
    fn from((target, member): (String, String)) -> Self {
        HandlerRef::Member(target, member)
    }
}

impl From<Arc<dyn Handler>> for HandlerRef {
    fn from(h: Arc<dyn Handler>) -> Self {
        HandlerRef::Invokable(h)
    }
}
