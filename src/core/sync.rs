//! Sync orchestrator: pushes protected + curated addons to managed accounts
//!
//! A run walks a fixed sequence of [`SyncStage`]s. Any failure up to and
//! including [`SyncStage::Push`] aborts the run and leaves the user's
//! `lastSync` untouched. Failures after the push cannot undo it; they turn the
//! run into a [`SyncOutcome::Partial`] instead of an error.

use crate::core::account::{AccountApi, AuthKey};
use crate::core::addon::{AddonEntry, AddonFlags};
use crate::core::addon_registry::AddonRegistry;
use crate::core::directory::{DirectoryClient, ProtectedAddonSet};
use crate::core::service::ServiceError;
use crate::core::user_registry::UserRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Steps of a single sync run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    RefreshProtected,
    LookupUser,
    Login,
    LoadLocal,
    Merge,
    Push,
    Logout,
    RecordSync,
}

impl SyncStage {
    /// Cleanup owed when the run fails at this stage
    pub fn compensation(self) -> Compensation {
        match self {
            SyncStage::RefreshProtected | SyncStage::LookupUser | SyncStage::Login => {
                Compensation::None
            }
            SyncStage::LoadLocal | SyncStage::Merge | SyncStage::Push => Compensation::Logout,
            // Past the push: nothing to undo, reported as partial success.
            SyncStage::Logout | SyncStage::RecordSync => Compensation::None,
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::RefreshProtected => "refresh_protected",
            SyncStage::LookupUser => "lookup_user",
            SyncStage::Login => "login",
            SyncStage::LoadLocal => "load_local",
            SyncStage::Merge => "merge",
            SyncStage::Push => "push",
            SyncStage::Logout => "logout",
            SyncStage::RecordSync => "record_sync",
        };
        f.write_str(name)
    }
}

/// Compensating action for a failed stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    None,
    /// Release the auth key obtained at login
    Logout,
}

/// A stage that failed without aborting the run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWarning {
    pub stage: SyncStage,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Every stage succeeded
    Complete,
    /// The collection was pushed but a later stage failed
    Partial,
}

/// Result of a sync run that reached the push
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub email: String,
    pub outcome: SyncOutcome,
    pub protected_count: usize,
    pub local_count: usize,
    /// Ids of remote addons the overwrite dropped from the account
    pub replaced: Vec<String>,
    pub last_sync: Option<DateTime<Utc>>,
    pub warnings: Vec<SyncWarning>,
}

/// Per-user result of [`SyncOrchestrator::sync_all`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSyncResult {
    pub email: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build the collection pushed to an account: protected entries first, then
/// curated ones re-flagged as neither official nor protected.
pub fn merge_collection(protected: &ProtectedAddonSet, local: Vec<AddonEntry>) -> Vec<AddonEntry> {
    protected
        .entries()
        .iter()
        .cloned()
        .chain(
            local
                .into_iter()
                .map(|entry| entry.with_flags(AddonFlags::local())),
        )
        .collect()
}

fn enter(stage: SyncStage, email: &str) {
    debug!("Sync {}: {}", email, stage);
}

pub struct SyncOrchestrator {
    directory: Arc<DirectoryClient>,
    account: Arc<dyn AccountApi>,
    addons: Arc<AddonRegistry>,
    users: Arc<UserRegistry>,
    failure_delay: Duration,
}

impl SyncOrchestrator {
    pub fn new(
        directory: Arc<DirectoryClient>,
        account: Arc<dyn AccountApi>,
        addons: Arc<AddonRegistry>,
        users: Arc<UserRegistry>,
        failure_delay: Duration,
    ) -> Self {
        Self {
            directory,
            account,
            addons,
            users,
            failure_delay,
        }
    }

    /// Refresh the protected set and sync one user
    pub async fn sync_user(&self, email: &str) -> Result<SyncReport, ServiceError> {
        debug!("Starting user sync for {}", email);
        enter(SyncStage::RefreshProtected, email);
        let protected = self.directory.refresh_protected_set().await;
        self.sync_with(&protected, email).await
    }

    /// Sync one user with an already refreshed protected set
    pub async fn sync_with(
        &self,
        protected: &ProtectedAddonSet,
        email: &str,
    ) -> Result<SyncReport, ServiceError> {
        let started = Utc::now();

        enter(SyncStage::LookupUser, email);
        let user = match self.users.get(email).await {
            Ok(user) => user,
            Err(e) => return Err(self.abort(SyncStage::LookupUser, None, e).await),
        };

        enter(SyncStage::Login, email);
        let auth_key = match self.account.login(&user.email, &user.password).await {
            Ok(key) => key,
            Err(e) => return Err(self.abort(SyncStage::Login, None, e).await),
        };

        enter(SyncStage::LoadLocal, email);
        let local = match self.addons.list().await {
            Ok(local) => local,
            Err(e) => return Err(self.abort(SyncStage::LoadLocal, Some(&auth_key), e).await),
        };
        let local_count = local.len();

        enter(SyncStage::Merge, email);
        let collection = merge_collection(protected, local);

        let replaced = self.replaced_remote_addons(&auth_key, &collection).await;

        enter(SyncStage::Push, email);
        if let Err(e) = self.account.set_collection(&auth_key, &collection).await {
            return Err(self.abort(SyncStage::Push, Some(&auth_key), e).await);
        }
        info!(
            "Pushed {} addons to {} ({} protected, {} local)",
            collection.len(),
            email,
            protected.len(),
            local_count
        );

        let mut warnings = Vec::new();

        enter(SyncStage::Logout, email);
        if let Err(e) = self.account.logout(&auth_key).await {
            warn!("Logout after sync failed for {}: {}", email, e);
            warnings.push(SyncWarning {
                stage: SyncStage::Logout,
                message: e.to_string(),
            });
        }

        enter(SyncStage::RecordSync, email);
        let now = Utc::now().max(started);
        let last_sync = match self.users.record_sync(email, now).await {
            Ok(()) => Some(now),
            Err(e) => {
                error!("Failed to record sync time for {}: {}", email, e);
                warnings.push(SyncWarning {
                    stage: SyncStage::RecordSync,
                    message: e.to_string(),
                });
                None
            }
        };

        let outcome = if warnings.is_empty() {
            info!("User sync completed successfully: {}", email);
            SyncOutcome::Complete
        } else {
            warn!(
                "User sync for {} pushed the collection but finished with {} warning(s)",
                email,
                warnings.len()
            );
            SyncOutcome::Partial
        };

        Ok(SyncReport {
            email: email.to_string(),
            outcome,
            protected_count: protected.len(),
            local_count,
            replaced,
            last_sync,
            warnings,
        })
    }

    /// Sync every managed user in order, continuing past failures
    pub async fn sync_all(&self) -> Result<Vec<BulkSyncResult>, ServiceError> {
        let users = self.users.list().await?;
        enter(SyncStage::RefreshProtected, "all users");
        let protected = self.directory.refresh_protected_set().await;
        let total = users.len();
        let mut results = Vec::with_capacity(total);

        for (index, user) in users.into_iter().enumerate() {
            match self.sync_with(&protected, &user.email).await {
                Ok(report) => results.push(BulkSyncResult {
                    email: user.email,
                    success: true,
                    report: Some(report),
                    error: None,
                }),
                Err(e) => {
                    error!("Failed to sync user {}: {}", user.email, e);
                    results.push(BulkSyncResult {
                        email: user.email,
                        success: false,
                        report: None,
                        error: Some(e.to_string()),
                    });
                    if index + 1 < total && !self.failure_delay.is_zero() {
                        tokio::time::sleep(self.failure_delay).await;
                    }
                }
            }
        }

        let completed = results.iter().filter(|r| r.success).count();
        info!("Completed syncing {} out of {} users", completed, total);
        Ok(results)
    }

    /// Run the compensation for `stage` and return `err` unchanged
    async fn abort(
        &self,
        stage: SyncStage,
        auth_key: Option<&AuthKey>,
        err: ServiceError,
    ) -> ServiceError {
        error!("Sync aborted at {}: {}", stage, err);
        if let (Compensation::Logout, Some(auth_key)) = (stage.compensation(), auth_key) {
            if let Err(e) = self.account.logout(auth_key).await {
                warn!("Compensating logout failed: {}", e);
            }
        }
        err
    }

    /// Remote addons that the upcoming overwrite will drop. Best-effort.
    async fn replaced_remote_addons(
        &self,
        auth_key: &AuthKey,
        collection: &[AddonEntry],
    ) -> Vec<String> {
        let remote = match self.account.get_collection(auth_key).await {
            Ok(remote) => remote,
            Err(e) => {
                debug!("Could not read remote collection before push: {}", e);
                return Vec::new();
            }
        };

        let pushed: HashSet<&str> = collection.iter().map(|entry| entry.id()).collect();
        let replaced: Vec<String> = remote
            .iter()
            .map(|entry| entry.id())
            .filter(|id| !pushed.contains(id))
            .map(str::to_string)
            .collect();

        if !replaced.is_empty() {
            warn!(
                "Overwriting remote collection drops {} addon(s): {}",
                replaced.len(),
                replaced.join(", ")
            );
        }
        replaced
    }
}
