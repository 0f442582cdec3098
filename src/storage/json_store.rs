//! JSON document store backing the addon and user registries

use crate::core::service::ServiceError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// A JSON array persisted as a single document.
///
/// Every mutation runs under the store's mutex, so concurrent updates are
/// applied one after another instead of overwriting each other. Writes go to a
/// temporary file in the same directory which is fsynced and then renamed over
/// the document. The lock is held by the blocking writer itself, so a caller
/// that is dropped mid-write cannot let the next update read a stale document.
pub struct JsonStore<T> {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    /// Open a store, creating an empty document if none exists
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ServiceError::Storage(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let store = Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        };

        if fs::try_exists(&store.path).await? {
            info!("Store exists: {}", store.path.display());
        } else {
            info!("Creating new store: {}", store.path.display());
            let guard = store.write_lock.clone().lock_owned().await;
            store.write(Vec::new(), guard).await?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document
    pub async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ServiceError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            ServiceError::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Read-modify-write the document.
    ///
    /// `f` receives the current items and may mutate them. Returning an error
    /// aborts the update and leaves the document untouched.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let guard = self.write_lock.clone().lock_owned().await;

        let mut items = self.load().await?;
        let result = f(&mut items)?;
        self.write(items, guard).await?;

        Ok(result)
    }

    async fn write(&self, items: Vec<T>, guard: OwnedMutexGuard<()>) -> Result<(), ServiceError> {
        let count = items.len();
        let path = self.path.clone();

        let bytes = serde_json::to_vec_pretty(&items).map_err(|e| {
            ServiceError::Storage(format!("Failed to serialize {}: {}", path.display(), e))
        })?;

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            atomic_write(&path, &bytes)
        })
            .await
            .map_err(|e| ServiceError::Internal(format!("Store writer task failed: {}", e)))??;

        debug!(
            "Store {} updated successfully ({} entries)",
            self.path.display(),
            count
        );
        Ok(())
    }
}

/// Write bytes to `path` via a temp file in the same directory + fsync + rename
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| {
        ServiceError::Storage(format!(
            "Failed to create temp file in {}: {}",
            dir.display(),
            e
        ))
    })?;

    temp.as_file_mut()
        .write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| ServiceError::Storage(format!("Failed to write temp file: {}", e)))?;

    temp.persist(path).map_err(|e| {
        warn!("Failed to rename temp file over {}: {}", path.display(), e);
        ServiceError::Storage(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;

    Ok(())
}
