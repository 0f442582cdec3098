//! Core service layer modules

pub mod account;
pub mod addon;
pub mod addon_registry;
pub mod directory;
pub mod service;
pub mod sync;
pub mod user_registry;

// Re-export main types for convenience
pub use account::{AccountApi, AuthKey, StremioAccountClient};
pub use addon::{AddonEntry, AddonFlags, Manifest, LOCAL_ADDON};
pub use addon_registry::{AddonRegistry, ImportSummary};
pub use directory::{DirectoryClient, ProtectedAddonSet};
pub use service::*;
pub use sync::{
    merge_collection, BulkSyncResult, Compensation, SyncOrchestrator, SyncOutcome, SyncReport,
    SyncStage, SyncWarning,
};
pub use user_registry::{ManagedUser, UserRegistry, UserSummary};
