use http::StatusCode;

/// Errors surfaced by registration, resolution and dispatch.
///
/// Handler failures are carried verbatim in [`RouterError::Handler`]; the
/// dispatcher never swallows them.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A handler reference could not be turned into a name.
    ///
    /// Raised at resolution time (per request), never at registration time.
    #[error("invalid callable: {0}")]
    InvalidCallable(String),

    /// The qualified name is not present in the handler registry.
    #[error("no handler registered under '{name}'")]
    UnknownHandler {
        /// Fully qualified name that was looked up
        name: String,
    },

    /// A route pattern is not a valid regular expression.
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as registered (prefix included)
        pattern: String,
        /// Compilation error from the regex engine
        #[source]
        source: regex::Error,
    },

    /// A method string is not a valid HTTP method token.
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// The ambient request state is missing a required variable.
    #[error("missing request variable '{0}'")]
    MissingRequestVar(&'static str),

    /// Building a protocol response failed.
    #[error(transparent)]
    Http(#[from] http::Error),

    /// A route handler, not-found handler or downstream handler failed.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl RouterError {
    /// Status code a host would typically answer with for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RouterError::InvalidMethod(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert into an `anyhow::Error` without wrapping handler failures twice.
    #[must_use]
    pub fn into_anyhow(self) -> anyhow::Error {
        match self {
            RouterError::Handler(e) => e,
            other => anyhow::Error::from(other),
        }
    }
}
