//! Server entry point.
//!
//! Loads configuration (optional TOML file, then environment overrides),
//! initializes logging, binds the listener, and runs the HTTP server.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use site_server::config::load_config;
use site_server::observability::logging;
use site_server::HttpServer;

/// Static site server with a reverse-proxy escape hatch.
#[derive(Parser, Debug)]
#[command(name = "site-server", version)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listening port (takes precedence over config and PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.listener.set_port(port);
    }

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        build_dir = %config.site.build_dir.display(),
        proxy_prefix = %config.proxy.path_prefix,
        upstream = %config.proxy.upstream,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
