//! Locally curated addon list

use crate::core::addon::{parse_transport_url, AddonEntry, HTTP_TRANSPORT};
use crate::core::directory::DirectoryClient;
use crate::core::service::ServiceError;
use crate::storage::JsonStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome counts of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub success: usize,
    pub failed: usize,
    pub duplicates: usize,
}

/// Registry of operator-curated addons, unique by manifest id and transport URL
pub struct AddonRegistry {
    store: JsonStore<AddonEntry>,
    directory: Arc<DirectoryClient>,
}

impl AddonRegistry {
    /// Open the registry backed by the JSON document at `path`
    pub async fn open(
        path: impl Into<PathBuf>,
        directory: Arc<DirectoryClient>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            store: JsonStore::open(path).await?,
            directory,
        })
    }

    /// All entries in insertion order
    pub async fn list(&self) -> Result<Vec<AddonEntry>, ServiceError> {
        self.store.load().await
    }

    /// Fetch the manifest at `url` and append it to the registry
    pub async fn add(&self, url: &str) -> Result<AddonEntry, ServiceError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ServiceError::Validation(
                "Manifest URL is required".to_string(),
            ));
        }

        let manifest = self.directory.fetch_manifest(url).await?;
        let entry = AddonEntry::http(manifest, url);

        let added = entry.clone();
        self.store
            .update(move |entries| {
                if entries.iter().any(|existing| existing.conflicts_with(&entry)) {
                    return Err(ServiceError::DuplicateAddon(entry.id().to_string()));
                }
                entries.push(entry);
                Ok(())
            })
            .await?;

        info!("Addon added successfully: {} ({})", added.id(), url);
        Ok(added)
    }

    /// Remove the entry whose manifest id is `manifest_id`
    pub async fn remove(&self, manifest_id: &str) -> Result<bool, ServiceError> {
        self.store
            .update(|entries| {
                let before = entries.len();
                entries.retain(|entry| entry.id() != manifest_id);
                if entries.len() == before {
                    return Err(ServiceError::AddonNotFound(manifest_id.to_string()));
                }
                Ok(true)
            })
            .await?;

        info!("Addon deleted successfully: {}", manifest_id);
        Ok(true)
    }

    /// Snapshot of the registry suitable for a later [`import`](Self::import)
    pub async fn export(&self) -> Result<Vec<AddonEntry>, ServiceError> {
        self.list().await
    }

    /// Append already-resolved entries, skipping invalid ones and duplicates.
    ///
    /// Entries are not re-fetched. Flags are stripped since curated addons are
    /// never protected. The registry is written once for the whole batch.
    pub async fn import(&self, incoming: Vec<AddonEntry>) -> Result<ImportSummary, ServiceError> {
        let summary = self
            .store
            .update(move |entries| {
                let mut summary = ImportSummary::default();

                for mut entry in incoming {
                    let valid = entry.manifest.validate().and_then(|_| {
                        parse_transport_url(&entry.transport_url).map(|_| ())
                    });
                    if let Err(e) = valid {
                        warn!("Skipping invalid import entry {}: {}", entry.transport_url, e);
                        summary.failed += 1;
                        continue;
                    }

                    if entries.iter().any(|existing| existing.conflicts_with(&entry)) {
                        summary.duplicates += 1;
                        continue;
                    }

                    entry.flags = None;
                    if entry.transport_name.is_none() {
                        entry.transport_name = Some(HTTP_TRANSPORT.to_string());
                    }
                    entries.push(entry);
                    summary.success += 1;
                }

                Ok(summary)
            })
            .await?;

        info!(
            "Import completed: {} added, {} failed, {} duplicates",
            summary.success, summary.failed, summary.duplicates
        );
        Ok(summary)
    }
}
