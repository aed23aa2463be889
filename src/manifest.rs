//! # Route Manifests
//!
//! Declarative routing tables in YAML. A manifest lists top-level routes and
//! nested mounts, and is applied to any [`Registrar`] in document order, so
//! precedence follows the file.
//!
//! ```yaml
//! base_namespace: App
//! routes:
//!   - { method: GET, pattern: "/users/(\\d+)", handler: "@Users.show" }
//!   - { method: "*", pattern: /health, handler: health, no-regex: true }
//! mounts:
//!   - prefix: /api
//!     routes:
//!       - { method: GET, pattern: /x, handler: ["@Api", "x"], options: { cache: 60 } }
//! ```
//!
//! `handler` is either a name or a two-element `[target, member]` list. Pass
//! through options go under `options`; `no-regex` sits on the route itself.

use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::config::RouterConfig;
use crate::handler::HandlerRef;
use crate::router::{Methods, Registrar, RouteOptions, RouterBuilder};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawHandler {
    Name(String),
    Pair(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoute {
    method: String,
    pattern: String,
    handler: RawHandler,
    #[serde(rename = "no-regex", default)]
    no_regex: bool,
    #[serde(default)]
    options: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMount {
    prefix: String,
    #[serde(default)]
    routes: Vec<RawRoute>,
    #[serde(default)]
    mounts: Vec<RawMount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawManifest {
    base_namespace: Option<String>,
    routes: Vec<RawRoute>,
    mounts: Vec<RawMount>,
}

/// A validated route declaration.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub methods: Methods,
    pub pattern: String,
    pub handler: HandlerRef,
    pub options: RouteOptions,
}

/// A group of declarations sharing a prefix.
#[derive(Debug, Clone)]
pub struct MountEntry {
    pub prefix: String,
    pub routes: Vec<RouteEntry>,
    pub mounts: Vec<MountEntry>,
}

/// A validated routing table loaded from YAML.
#[derive(Debug, Clone, Default)]
pub struct RouteManifest {
    /// Overrides the configured base namespace when present
    pub base_namespace: Option<String>,
    pub routes: Vec<RouteEntry>,
    pub mounts: Vec<MountEntry>,
}

impl RouteManifest {
    /// Parse and validate a manifest.
    ///
    /// Methods are checked here; handler names are not, they are resolved on
    /// dispatch.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let raw: RawManifest = serde_yaml::from_str(yaml).context("failed to parse route manifest")?;
        let routes = convert_routes(raw.routes, "")?;
        let mounts = convert_mounts(raw.mounts, "")?;
        Ok(Self {
            base_namespace: raw.base_namespace,
            routes,
            mounts,
        })
    }

    /// Load a manifest from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read route manifest {}", path.display()))?;
        let manifest = Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid route manifest {}", path.display()))?;
        info!(
            path = %path.display(),
            declarations = manifest.declaration_count(),
            "Route manifest loaded"
        );
        Ok(manifest)
    }

    /// Register every declaration on `registrar`, in document order.
    pub fn apply<R: Registrar>(&self, registrar: &mut R) {
        apply_entries(registrar, &self.routes, &self.mounts);
    }

    /// `base` with the manifest's namespace applied.
    #[must_use]
    pub fn config(&self, mut base: RouterConfig) -> RouterConfig {
        if let Some(ns) = &self.base_namespace {
            base.base_namespace.clone_from(ns);
        }
        base
    }

    /// A builder configured from `base` with every declaration registered.
    #[must_use]
    pub fn builder(&self, base: RouterConfig) -> RouterBuilder {
        let mut builder = RouterBuilder::with_config(self.config(base));
        self.apply(&mut builder);
        builder
    }

    /// Every handler reference, in document order (mounts after routes).
    #[must_use]
    pub fn handler_refs(&self) -> Vec<&HandlerRef> {
        let mut refs = Vec::new();
        collect_refs(&self.routes, &self.mounts, &mut refs);
        refs
    }

    /// Number of route declarations before wildcard expansion.
    #[must_use]
    pub fn declaration_count(&self) -> usize {
        self.handler_refs().len()
    }
}

fn apply_entries<R: Registrar>(registrar: &mut R, routes: &[RouteEntry], mounts: &[MountEntry]) {
    for entry in routes {
        registrar.route(
            entry.methods.clone(),
            &entry.pattern,
            entry.handler.clone(),
            entry.options.clone(),
        );
    }
    for mount in mounts {
        registrar.mount(&mount.prefix, |scope| {
            apply_entries(scope, &mount.routes, &mount.mounts);
        });
    }
}

fn collect_refs<'a>(routes: &'a [RouteEntry], mounts: &'a [MountEntry], out: &mut Vec<&'a HandlerRef>) {
    out.extend(routes.iter().map(|r| &r.handler));
    for mount in mounts {
        collect_refs(&mount.routes, &mount.mounts, out);
    }
}

fn convert_mounts(raw: Vec<RawMount>, parent: &str) -> anyhow::Result<Vec<MountEntry>> {
    raw.into_iter()
        .map(|m| {
            let prefix = format!("{parent}{}", m.prefix);
            Ok(MountEntry {
                routes: convert_routes(m.routes, &prefix)?,
                mounts: convert_mounts(m.mounts, &prefix)?,
                prefix: m.prefix,
            })
        })
        .collect()
}

fn convert_routes(raw: Vec<RawRoute>, prefix: &str) -> anyhow::Result<Vec<RouteEntry>> {
    raw.into_iter()
        .map(|r| {
            let location = format!("{} {prefix}{}", r.method, r.pattern);
            convert_route(r).with_context(|| format!("route '{location}'"))
        })
        .collect()
}

fn convert_route(raw: RawRoute) -> anyhow::Result<RouteEntry> {
    let methods: Methods = raw.method.parse()?;
    let handler = match raw.handler {
        RawHandler::Name(name) => HandlerRef::Name(name),
        RawHandler::Pair(pair) => match <[String; 2]>::try_from(pair) {
            Ok([target, member]) => HandlerRef::Member(target, member),
            Err(pair) => bail!(
                "handler list must have exactly 2 elements, got {}",
                pair.len()
            ),
        },
    };
    let mut extra = raw.options;
    let no_regex = match extra.remove("no-regex") {
        Some(Value::Bool(flag)) => raw.no_regex || flag,
        Some(other) => bail!("'no-regex' must be a boolean, got {other}"),
        None => raw.no_regex,
    };
    Ok(RouteEntry {
        methods,
        pattern: raw.pattern,
        handler,
        options: RouteOptions { no_regex, extra },
    })
}
