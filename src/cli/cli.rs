//! Main CLI application structure

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stremio_addon_manager::AddonManagerService;

use crate::cli::commands::{addons, serve, sync, users, Commands};
use crate::cli::config::create_service_config;
use crate::cli::error::{CliError, CliResult};

/// Stremio addon manager - curate addons and sync them to managed accounts
#[derive(Debug, Parser)]
#[command(name = "addon-manager")]
#[command(version = stremio_addon_manager::VERSION)]
#[command(about = "Curate Stremio addons and push them to managed accounts")]
#[command(long_about = "Curate Stremio addons and push them to managed accounts.\n\n\
                         Configuration is layered: built-in defaults, then the TOML file\n\
                         (--config, or the per-user config.toml), then ADDON_MANAGER__*\n\
                         environment variables (e.g. ADDON_MANAGER__SERVER__PORT=8080).\n\n\
                         Examples:\n\
                           addon-manager serve --port 3000\n\
                           addon-manager addons add https://example.com/manifest.json\n\
                           addon-manager users add me@example.com --password secret\n\
                           addon-manager sync --all")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file
    #[arg(long, short, global = true, env = "ADDON_MANAGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding database.json and users.json
    #[arg(long, global = true, env = "ADDON_MANAGER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        stremio_addon_manager::init_logging();
        stremio_addon_manager::install_panic_hook();

        let config = create_service_config(self.config.as_deref(), self.data_dir.as_deref())?;

        if self.verbose {
            println!(
                "Using stores: {} and {}",
                config.storage.addons_path.display(),
                config.storage.users_path.display()
            );
        }

        let service = AddonManagerService::new(config)
            .await
            .map_err(CliError::Service)?;

        match self.command {
            Commands::Serve(args) => serve::execute_serve(Arc::new(service), args).await,
            Commands::Sync(args) => sync::execute_sync(&service, args).await,
            Commands::Addons(args) => addons::execute_addons(&service, args).await,
            Commands::Users(args) => users::execute_users(&service, args).await,
        }
    }
}
