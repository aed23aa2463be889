use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Response;
use tracing::{debug, error};

use crate::config::RouterConfig;
use crate::dispatcher::Dispatcher;
use crate::echo::echo_handler;
use crate::handler::Body;
use crate::manifest::RouteManifest;
use crate::registry::HandlerRegistry;
use crate::resolver::{CallableResolver, Target};
use crate::server::{write_cgi_response, AmbientRequest};

/// Command-line interface for chainrouter
#[derive(Parser, Debug)]
#[command(name = "chainrouter")]
#[command(about = "Inspect and exercise regex route manifests", long_about = None)]
pub struct Cli {
    /// Router configuration file (YAML). Defaults to environment variables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the compiled routing table
    Routes {
        /// Route manifest (YAML)
        manifest: PathBuf,
    },
    /// Dispatch a single request with echo handlers
    Match {
        /// Route manifest (YAML)
        manifest: PathBuf,
        /// Request method, used as given
        method: String,
        /// Raw request URI, query string allowed
        uri: String,
    },
    /// Dispatch the request described by the CGI environment
    Cgi {
        /// Route manifest (YAML)
        manifest: PathBuf,
    },
}

/// Build a dispatcher for `manifest` with every handler name bound to the
/// echo handler.
pub fn load_dispatcher(manifest: &Path, config: Option<&Path>) -> anyhow::Result<Dispatcher> {
    let base = match config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::from_env(),
    };
    let manifest = RouteManifest::load(manifest)?;
    let mut builder = manifest.builder(base);

    let resolver = CallableResolver::new(builder.config(), HandlerRegistry::new());
    for reference in manifest.handler_refs() {
        // Malformed names stay unbound and fail on dispatch.
        if let Ok(Target::Named(name)) = resolver.qualify(reference) {
            debug!(handler_name = %name, "Binding echo handler");
            builder.register(&name, echo_handler);
        }
    }

    builder.build().context("failed to build routing table")
}

/// Dispatch `ambient` and render the outcome, turning a dispatch failure
/// into a bodiless response carrying the error's status.
pub fn cgi_response(dispatcher: &Dispatcher, ambient: &AmbientRequest) -> Response<Body> {
    match dispatcher.dispatch_ambient(ambient) {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            let status = e.status();
            error!(
                method = %ambient.method,
                uri = %ambient.request_uri,
                status = status.as_u16(),
                error = %e,
                "Dispatch failed"
            );
            let mut response = Response::new(Body::new());
            *response.status_mut() = status;
            response
        }
    }
}

/// Execute `cli`, writing command output to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Routes { manifest } => {
            let dispatcher = load_dispatcher(manifest, config)?;
            dispatcher.router().write_routes(out)?;
        }
        Commands::Match {
            manifest,
            method,
            uri,
        } => {
            let dispatcher = load_dispatcher(manifest, config)?;
            let ambient = AmbientRequest::new(method.as_str(), uri.as_str());
            let parsed = ambient.method()?;
            let path = ambient.path();
            match dispatcher.router().find_route(&parsed, &path) {
                Some(m) => writeln!(
                    out,
                    "[match] {parsed} {path} -> {} params={:?}",
                    m.route.handler.label(),
                    m.params.as_slice()
                )?,
                None => writeln!(out, "[match] {parsed} {path} -> not found")?,
            }
            let response = cgi_response(&dispatcher, &ambient);
            write_cgi_response(&response, out)?;
            writeln!(out)?;
        }
        Commands::Cgi { manifest } => {
            let dispatcher = load_dispatcher(manifest, config)?;
            let ambient = AmbientRequest::from_env()?;
            let response = cgi_response(&dispatcher, &ambient);
            write_cgi_response(&response, out)?;
        }
    }
    Ok(())
}

/// Parse the process arguments and run against stdout.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
}
