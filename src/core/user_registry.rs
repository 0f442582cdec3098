//! Managed Stremio accounts

use crate::core::account::AccountApi;
use crate::core::service::ServiceError;
use crate::storage::JsonStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A remote account administered by this service
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl fmt::Debug for ManagedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedUser")
            .field("email", &self.email)
            .field("last_sync", &self.last_sync)
            .finish_non_exhaustive()
    }
}

/// Public view of a managed user; the password is never exposed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub email: String,
    pub last_sync: Option<DateTime<Utc>>,
}

impl From<&ManagedUser> for UserSummary {
    fn from(user: &ManagedUser) -> Self {
        Self {
            email: user.email.clone(),
            last_sync: user.last_sync,
        }
    }
}

/// Registry of managed users, unique by email
pub struct UserRegistry {
    store: JsonStore<ManagedUser>,
    account: Arc<dyn AccountApi>,
}

impl UserRegistry {
    /// Open the registry backed by the JSON document at `path`
    pub async fn open(
        path: impl Into<PathBuf>,
        account: Arc<dyn AccountApi>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            store: JsonStore::open(path).await?,
            account,
        })
    }

    pub async fn list(&self) -> Result<Vec<UserSummary>, ServiceError> {
        Ok(self.store.load().await?.iter().map(UserSummary::from).collect())
    }

    /// Look up a user including credentials
    pub async fn get(&self, email: &str) -> Result<ManagedUser, ServiceError> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|user| user.email == email)
            .ok_or_else(|| ServiceError::UserNotFound(email.to_string()))
    }

    /// Add a user after checking the credentials against Stremio
    pub async fn add(&self, email: &str, password: &str) -> Result<(), ServiceError> {
        debug!("Adding new user {}", email);

        let auth_key = match self.account.login(email, password).await {
            Ok(key) => key,
            Err(e @ ServiceError::InvalidCredentials(_)) => {
                warn!("Invalid Stremio credentials during user add: {}", email);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.account.logout(&auth_key).await {
            warn!("Logout after credential check failed for {}: {}", email, e);
        }

        let user = ManagedUser {
            email: email.to_string(),
            password: password.to_string(),
            last_sync: None,
        };
        self.store
            .update(move |users| {
                if users.iter().any(|existing| existing.email == user.email) {
                    return Err(ServiceError::DuplicateUser(user.email));
                }
                users.push(user);
                Ok(())
            })
            .await?;

        info!("User added successfully: {}", email);
        Ok(())
    }

    pub async fn remove(&self, email: &str) -> Result<bool, ServiceError> {
        self.store
            .update(|users| {
                let before = users.len();
                users.retain(|user| user.email != email);
                if users.len() == before {
                    return Err(ServiceError::UserNotFound(email.to_string()));
                }
                Ok(())
            })
            .await?;

        info!("User deleted successfully: {}", email);
        Ok(true)
    }

    /// Stamp the time of a successful sync
    pub async fn record_sync(&self, email: &str, at: DateTime<Utc>) -> Result<(), ServiceError> {
        self.store
            .update(|users| {
                let user = users
                    .iter_mut()
                    .find(|user| user.email == email)
                    .ok_or_else(|| ServiceError::UserNotFound(email.to_string()))?;
                user.last_sync = Some(at);
                Ok(())
            })
            .await
    }
}
