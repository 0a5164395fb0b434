use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use argonaut::infra::config::ArgonautConfig;
use argonaut::infra::demo::DemoControlPlane;
use argonaut::infra::logging;
use argonaut::infra::service::GitopsService;
use clap::Parser;

/// Interactive terminal client for GitOps control planes.
#[derive(Parser)]
#[command(name = "argonaut", version, about)]
struct Cli {
    /// Control-plane base URL.
    #[arg(long)]
    server: Option<String>,

    /// Bearer token for the control plane.
    #[arg(long)]
    token: Option<String>,

    /// Skip TLS verification.
    #[arg(long)]
    insecure: bool,

    /// Config file path (default: ~/.argonaut/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path (default: ~/.argonaut/argonaut.log).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run against the built-in in-memory control plane.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ArgonautConfig::default_path);
    let mut config = ArgonautConfig::load(&config_path).map_err(io::Error::other)?;
    if cli.server.is_some() {
        config.server = cli.server;
    }
    if cli.token.is_some() {
        config.token = cli.token;
    }
    if cli.insecure {
        config.insecure = true;
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file;
    }

    logging::init(&config.log_file_path())?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting argonaut");

    if cli.demo {
        // The demo plane accepts any descriptor; configured server/token
        // values are kept so the session identity shows through, with
        // demo defaults filled in otherwise.
        if config.server.is_none() {
            config.server = Some("demo://local".to_string());
        }
        if config.token.is_none() {
            config.token = Some("demo-token".to_string());
        }
        let service: Arc<dyn GitopsService> = Arc::new(DemoControlPlane::new(true));

        return argonaut::run(service, config).await;
    }

    // The HTTP transport is provided by the embedding application
    // through `argonaut::run`; the shipped binary only bundles the demo
    // plane.
    if config.server.is_some() && config.token.is_some() {
        return Err(io::Error::other(
            "this build bundles no HTTP transport; run with --demo, or embed \
             argonaut with a GitopsService implementation",
        ));
    }

    // No server configured: start in Login mode so the user is told how
    // to connect. The inert demo plane is never contacted.
    let service: Arc<dyn GitopsService> = Arc::new(DemoControlPlane::new(false));

    argonaut::run(service, config).await
}
