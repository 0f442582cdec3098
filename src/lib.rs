//! # Stremio Addon Manager
//!
//! An administrative service for a fleet of Stremio accounts. The operator
//! curates a list of addon manifests, registers the accounts to manage, and
//! pushes one combined addon collection to each of them.
//!
//! ## Architecture
//!
//! The service layer provides:
//! - Addon registry (curated manifests, persisted as JSON)
//! - User registry (managed Stremio accounts)
//! - Manifest directory client and protected addon set
//! - Stremio account API client
//! - Sync orchestration with compensation on failure
//!
//! The [`http`] module exposes all of it as a session-gated REST API.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use stremio_addon_manager::{AddonManagerService, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::default().with_data_dir("./data");
//!     let service = AddonManagerService::new(config).await?;
//!
//!     // Curate an addon
//!     let entry = service
//!         .addons()
//!         .add("https://v3-cinemeta.strem.io/manifest.json")
//!         .await?;
//!     println!("Added {}", entry.id());
//!
//!     // Push the collection to every managed account
//!     for result in service.sync().sync_all().await? {
//!         println!("{}: {}", result.email, result.success);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod http;
pub mod storage;

pub use core::account::{AccountApi, AuthKey, StremioAccountClient};
pub use core::addon::{AddonEntry, AddonFlags, Manifest};
pub use core::addon_registry::{AddonRegistry, ImportSummary};
pub use core::directory::{DirectoryClient, ProtectedAddonSet};
pub use core::service::{AddonManagerService, ServiceConfig, ServiceError};
pub use core::sync::{BulkSyncResult, SyncOrchestrator, SyncOutcome, SyncReport};
pub use core::user_registry::{ManagedUser, UserRegistry, UserSummary};

/// Version of the service layer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging for the service layer (safe for testing)
pub fn init_logging() {
    // Only initialize logging once
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "stremio_addon_manager=info".into());

        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

        // This will fail silently if already initialized
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Route panics through `tracing` before the default hook runs.
///
/// A panic inside a request task only unwinds that task; one on the main
/// thread still ends the process.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(
            thread = std::thread::current().name().unwrap_or("unnamed"),
            "panic at {}: {}",
            location,
            payload
        );
        default_hook(info);
    }));
}
