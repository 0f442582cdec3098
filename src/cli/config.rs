//! Configuration loading for the CLI

use crate::cli::error::{CliError, CliResult};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use stremio_addon_manager::ServiceConfig;
use tracing::debug;

/// Prefix of configuration environment variables, e.g. `ADDON_MANAGER__SERVER__PORT`
pub const ENV_PREFIX: &str = "ADDON_MANAGER";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Default per-user config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stremio-addon-manager").join(CONFIG_FILE_NAME))
}

/// Build the service configuration.
///
/// Layers, lowest precedence first: built-in defaults, the TOML file
/// (`config_path`, or the per-user default when present), then
/// `ADDON_MANAGER__SECTION__KEY` environment variables. `data_dir` places both
/// stores in that directory and wins over everything else.
pub fn create_service_config(
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> CliResult<ServiceConfig> {
    let mut builder = Config::builder();

    match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading config from {}", path.display());
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        None => {
            if let Some(default_path) = default_config_path().filter(|p| p.exists()) {
                debug!("Loading config from {}", default_path.display());
                builder = builder.add_source(File::from(default_path).required(false));
            }
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("directory.protected_manifest_urls"),
    );

    let config: ServiceConfig = builder.build()?.try_deserialize()?;

    Ok(match data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    })
}
