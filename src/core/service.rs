//! Main addon manager service implementation

use crate::core::account::{AccountApi, StremioAccountClient};
use crate::core::addon_registry::AddonRegistry;
use crate::core::directory::DirectoryClient;
use crate::core::sync::SyncOrchestrator;
use crate::core::user_registry::UserRegistry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Admin credential and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// The single admin username
    pub username: String,

    /// The single admin password (compared verbatim)
    pub password: String,

    /// Secret used to sign session tokens
    pub session_secret: String,

    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
            session_secret: "dev-secret-key-change-in-production".to_string(),
            session_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// On-disk store locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON document holding the curated addon list
    pub addons_path: PathBuf,

    /// JSON document holding managed users
    pub users_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            addons_path: PathBuf::from("./data/database.json"),
            users_path: PathBuf::from("./data/users.json"),
        }
    }
}

/// Remote Stremio API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StremioConfig {
    /// Base URL of the Stremio account API
    pub api_base_url: String,
}

impl Default for StremioConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.strem.io/api".to_string(),
        }
    }
}

/// Manifest directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Remote manifests always pushed ahead of curated addons
    pub protected_manifest_urls: Vec<String>,

    /// Entries whose URL contains this marker are flagged protected
    pub protected_marker: String,

    /// Timeout for manifest fetches (seconds)
    pub fetch_timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            protected_manifest_urls: vec![
                "https://v3-cinemeta.strem.io/manifest.json".to_string(),
                "https://opensubtitles-v3.strem.io/manifest.json".to_string(),
            ],
            protected_marker: "cinemeta".to_string(),
            fetch_timeout_secs: 10,
        }
    }
}

impl DirectoryConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Bulk sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Pause after a failed user before moving to the next one (ms)
    pub failure_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            failure_delay_ms: 2000,
        }
    }
}

impl SyncConfig {
    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }
}

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub stremio: StremioConfig,
    pub directory: DirectoryConfig,
    pub sync: SyncConfig,
}

impl ServiceConfig {
    /// Configuration with both stores placed under `data_dir`
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        self.storage.addons_path = data_dir.join("database.json");
        self.storage.users_path = data_dir.join("users.json");
        self
    }
}

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Addon already exists: {0}")]
    DuplicateAddon(String),

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("Addon not found: {0}")]
    AddonNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid credentials for {0}")]
    InvalidCredentials(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Main addon manager service
///
/// Owns both registries and the remote clients; the sync orchestrator is
/// wired from the same instances so every component sees one store per file.
pub struct AddonManagerService {
    config: ServiceConfig,
    addons: Arc<AddonRegistry>,
    users: Arc<UserRegistry>,
    account: Arc<dyn AccountApi>,
    sync: Arc<SyncOrchestrator>,
}

impl AddonManagerService {
    /// Create a new service talking to the configured Stremio API
    pub async fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let account: Arc<dyn AccountApi> =
            Arc::new(StremioAccountClient::new(&config.stremio.api_base_url)?);
        Self::with_account_api(config, account).await
    }

    /// Create a service with a caller-supplied account API implementation
    pub async fn with_account_api(
        config: ServiceConfig,
        account: Arc<dyn AccountApi>,
    ) -> Result<Self, ServiceError> {
        crate::init_logging();

        info!("Initializing addon manager service v{}", crate::VERSION);

        let directory = Arc::new(DirectoryClient::new(config.directory.clone())?);

        let addons = Arc::new(
            AddonRegistry::open(config.storage.addons_path.clone(), directory.clone()).await?,
        );
        let users = Arc::new(
            UserRegistry::open(config.storage.users_path.clone(), account.clone()).await?,
        );

        let sync = Arc::new(SyncOrchestrator::new(
            directory.clone(),
            account.clone(),
            addons.clone(),
            users.clone(),
            config.sync.failure_delay(),
        ));

        info!(
            "Stores ready: addons={}, users={}",
            config.storage.addons_path.display(),
            config.storage.users_path.display()
        );

        Ok(Self {
            config,
            addons,
            users,
            account,
            sync,
        })
    }

    pub fn addons(&self) -> Arc<AddonRegistry> {
        self.addons.clone()
    }

    pub fn users(&self) -> Arc<UserRegistry> {
        self.users.clone()
    }

    pub fn account(&self) -> Arc<dyn AccountApi> {
        self.account.clone()
    }

    pub fn sync(&self) -> Arc<SyncOrchestrator> {
        self.sync.clone()
    }

    /// Get service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
