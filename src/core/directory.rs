//! Remote manifest directory: fetches addon manifests and builds the protected set

use crate::core::addon::{parse_transport_url, AddonEntry, AddonFlags, Manifest, LOCAL_ADDON};
use crate::core::service::{DirectoryConfig, ServiceError};
use reqwest::{header, Client};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Addons pushed ahead of the curated list on every sync.
///
/// Built fresh by [`DirectoryClient::refresh_protected_set`] and handed to the
/// sync orchestrator; nothing caches it between runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtectedAddonSet {
    entries: Vec<AddonEntry>,
}

impl ProtectedAddonSet {
    /// A set holding only the fixed local-files addon
    pub fn local_only() -> Self {
        Self {
            entries: vec![LOCAL_ADDON.clone()],
        }
    }

    pub fn entries(&self) -> &[AddonEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// HTTP client for addon manifests
pub struct DirectoryClient {
    client: Client,
    config: DirectoryConfig,
}

impl DirectoryClient {
    pub fn new(config: DirectoryConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(concat!("stremio-addon-manager/", env!("CARGO_PKG_VERSION")))
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Fetch and validate the manifest served at `url`
    pub async fn fetch_manifest(&self, url: &str) -> Result<Manifest, ServiceError> {
        let parsed = parse_transport_url(url)?;
        debug!("Fetching manifest from {}", parsed);

        let response = self
            .client
            .get(parsed)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::Fetch(format!("Failed to fetch manifest: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::Fetch(format!(
                "Failed to fetch manifest: HTTP error! status: {}",
                response.status().as_u16()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Fetch(format!("Failed to decode manifest: {}", e)))?;

        let manifest = Manifest::from_value(body)?;
        info!(
            "Successfully fetched and validated manifest {} from {}",
            manifest.id(),
            url
        );
        Ok(manifest)
    }

    /// Rebuild the protected addon set.
    ///
    /// The local-files addon is always first. Each configured URL is fetched in
    /// order; failures are logged and that entry is left out of this refresh.
    pub async fn refresh_protected_set(&self) -> ProtectedAddonSet {
        let mut set = ProtectedAddonSet::local_only();

        for url in &self.config.protected_manifest_urls {
            match self.fetch_manifest(url).await {
                Ok(manifest) => {
                    let flags = AddonFlags {
                        official: true,
                        protected: url.contains(&self.config.protected_marker),
                    };
                    set.entries.push(AddonEntry {
                        manifest,
                        transport_url: url.clone(),
                        transport_name: None,
                        flags: Some(flags),
                    });
                }
                Err(e) => {
                    warn!("Skipping protected addon {}: {}", url, e);
                }
            }
        }

        debug!(
            "Protected set refreshed: {} of {} remote manifests available",
            set.len() - 1,
            self.config.protected_manifest_urls.len()
        );
        set
    }
}
