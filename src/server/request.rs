use std::env;

use http::Method;
use tracing::debug;

use crate::error::RouterError;

/// Normalize a raw request URI into a routing path.
///
/// The URI is percent-decoded (`+` decodes to a space), cut at the first `?`,
/// stripped of every leading and trailing `/` and prefixed with a single `/`.
///
/// ```rust
/// use chainrouter::server::extract_page;
///
/// assert_eq!(extract_page("/users/42/?tab=posts"), "/users/42");
/// assert_eq!(extract_page("//a%20b+c//"), "/a b c");
/// assert_eq!(extract_page(""), "/");
/// ```
#[must_use]
pub fn extract_page(uri: &str) -> String {
    let plus_decoded = uri.replace('+', " ");
    let decoded = urlencoding::decode_binary(plus_decoded.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);
    let without_query = decoded.split('?').next().unwrap_or_default();
    format!("/{}", without_query.trim_matches('/'))
}

/// Request data read from the hosting environment.
///
/// Built explicitly, or at the process boundary from CGI variables with
/// [`AmbientRequest::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientRequest {
    pub method: String,
    pub request_uri: String,
}

impl AmbientRequest {
    pub fn new(method: impl Into<String>, request_uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            request_uri: request_uri.into(),
        }
    }

    /// Read `REQUEST_METHOD` and `REQUEST_URI` from the process environment.
    pub fn from_env() -> Result<Self, RouterError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Read request variables through `lookup`.
    ///
    /// Without `REQUEST_URI`, the URI is rebuilt from `PATH_INFO` and
    /// `QUERY_STRING`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, RouterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let method = lookup("REQUEST_METHOD").ok_or(RouterError::MissingRequestVar("REQUEST_METHOD"))?;
        let request_uri = match lookup("REQUEST_URI") {
            Some(uri) => uri,
            None => {
                let path_info =
                    lookup("PATH_INFO").ok_or(RouterError::MissingRequestVar("REQUEST_URI"))?;
                match lookup("QUERY_STRING").filter(|q| !q.is_empty()) {
                    Some(query) => format!("{path_info}?{query}"),
                    None => path_info,
                }
            }
        };
        debug!(method = %method, request_uri = %request_uri, "Ambient request read");
        Ok(Self { method, request_uri })
    }

    /// The request method, used exactly as received.
    pub fn method(&self) -> Result<Method, RouterError> {
        Method::from_bytes(self.method.as_bytes())
            .map_err(|_| RouterError::InvalidMethod(self.method.clone()))
    }

    /// Routing path derived with [`extract_page`].
    #[must_use]
    pub fn path(&self) -> String {
        extract_page(&self.request_uri)
    }
}
