//! Serve command implementation

use crate::cli::error::{CliError, CliResult};
use clap::Args;
use std::sync::Arc;
use stremio_addon_manager::http::AddonManagerServer;
use stremio_addon_manager::AddonManagerService;
use tracing::info;

/// Serve the admin API and addon index over HTTP
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind the server to (defaults to the configured host)
    #[arg(long, help = "Host to bind the server to")]
    pub host: Option<String>,

    /// Port to bind the server to (defaults to the configured port)
    #[arg(long, short, env = "PORT", help = "Port to bind the server to")]
    pub port: Option<u16>,
}

pub async fn execute_serve(service: Arc<AddonManagerService>, args: ServeArgs) -> CliResult<()> {
    let server_config = &service.config().server;
    let host = args.host.unwrap_or_else(|| server_config.host.clone());
    let port = args.port.unwrap_or(server_config.port);

    info!("Starting addon manager HTTP server on {}:{}", host, port);
    println!("Addon manager HTTP server starting...");
    println!("  Listening on: http://{}:{}", host, port);

    let server = AddonManagerServer::new(service, &host, port).map_err(CliError::Config)?;

    // Blocks until shutdown
    server
        .serve()
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    Ok(())
}
