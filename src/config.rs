//! # Router Configuration
//!
//! Settings that shape how handler references are resolved. They can be built
//! in code, read from environment variables, or loaded from a YAML file.
//!
//! ## Environment Variables
//!
//! - `CHAINROUTER_BASE_NAMESPACE`: namespace substituted for a leading `@` in
//!   handler names (default: empty)
//! - `CHAINROUTER_SEPARATOR`: separator that replaces `.` in handler names
//!   (default: `::`)
//! - `CHAINROUTER_LOG_ROUTES`: `true`/`1` to log every route when the table is
//!   built (default: `false`)
//!
//! ## YAML
//!
//! ```yaml
//! base_namespace: App
//! separator: "::"
//! log_routes: true
//! ```

use std::env;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Default separator between namespace segments of a handler name.
pub const DEFAULT_SEPARATOR: &str = "::";

/// Resolver and diagnostics settings for a router.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Namespace that replaces the `@` alias marker
    pub base_namespace: String,
    /// Separator that `.` is converted to in handler names
    pub separator: String,
    /// Log every registered route when the table is built
    pub log_routes: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_namespace: String::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
            log_routes: false,
        }
    }
}

impl RouterConfig {
    /// Configuration with the given base namespace and default separator.
    #[must_use]
    pub fn with_namespace(base_namespace: impl Into<String>) -> Self {
        Self {
            base_namespace: base_namespace.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults. An empty `CHAINROUTER_SEPARATOR`
    /// is ignored since it would collapse namespace segments.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(ns) = env::var("CHAINROUTER_BASE_NAMESPACE") {
            config.base_namespace = ns;
        }
        match env::var("CHAINROUTER_SEPARATOR") {
            Ok(sep) if !sep.is_empty() => config.separator = sep,
            _ => {}
        }
        if let Ok(flag) = env::var("CHAINROUTER_LOG_ROUTES") {
            config.log_routes = matches!(flag.trim(), "1" | "true" | "TRUE" | "yes");
        }
        config
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("failed to parse router config")?;
        if config.separator.is_empty() {
            anyhow::bail!("router config: separator must not be empty");
        }
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read router config {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }
}
