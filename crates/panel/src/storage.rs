//! Local key/value storage and the read-through personalization cache.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use quickorder_core::{PanelId, UserId};
use thiserror::Error;

use crate::error::PanelError;
use crate::personalization::{PanelSettings, PersonalizationStore};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage lock poisoned")]
    Poisoned,

    #[error("storage io failed: {0}")]
    Io(String),
}

/// Client-local string storage (browser local storage, a file, ...).
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Cache key of a panel layout.
pub fn panel_cache_key(user_id: &UserId, panel_id: &PanelId) -> String {
    format!("panel-config-{user_id}-{panel_id}")
}

/// In-memory storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLocalStorage {
    items: RwLock<HashMap<String, String>>,
}

impl InMemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for InMemoryLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// Read-through cache in front of a remote personalization store.
///
/// Reads are served from local storage when present; misses go to the remote
/// store and populate the cache. Saves go to the remote store first and are
/// mirrored locally only once the remote accepted them. Cache failures are
/// logged and never fail the operation.
#[derive(Debug)]
pub struct CachedPersonalizationStore<S, L> {
    remote: S,
    cache: L,
}

impl<S, L> CachedPersonalizationStore<S, L>
where
    S: PersonalizationStore,
    L: LocalStorage,
{
    pub fn new(remote: S, cache: L) -> Self {
        Self { remote, cache }
    }

    pub fn cache(&self) -> &L {
        &self.cache
    }

    /// Drop the cached copy so the next read goes to the remote store.
    pub fn invalidate(&self, user_id: &UserId, panel_id: &PanelId) -> Result<(), PanelError> {
        self.cache.remove_item(&panel_cache_key(user_id, panel_id))?;
        Ok(())
    }

    fn read_cached(&self, key: &str) -> Option<PanelSettings> {
        let raw = match self.cache.get_item(key) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(key, error = %err, "panel config cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(err) => {
                tracing::warn!(key, error = %err, "dropping unreadable cached panel config");
                if let Err(err) = self.cache.remove_item(key) {
                    tracing::warn!(key, error = %err, "failed to drop cached panel config");
                }
                None
            }
        }
    }

    fn write_cached(&self, key: &str, settings: &PanelSettings) {
        let raw = match serde_json::to_string(settings) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to encode panel config for cache");
                return;
            }
        };
        if let Err(err) = self.cache.set_item(key, &raw) {
            tracing::warn!(key, error = %err, "panel config cache write failed");
        }
    }
}

#[async_trait]
impl<S, L> PersonalizationStore for CachedPersonalizationStore<S, L>
where
    S: PersonalizationStore,
    L: LocalStorage,
{
    async fn get_user_panel_config(
        &self,
        user_id: &UserId,
        panel_id: &PanelId,
    ) -> Result<Option<PanelSettings>, PanelError> {
        let key = panel_cache_key(user_id, panel_id);
        if let Some(settings) = self.read_cached(&key) {
            tracing::debug!(key = %key, "panel config served from cache");
            return Ok(Some(settings));
        }

        let remote = self.remote.get_user_panel_config(user_id, panel_id).await?;
        if let Some(settings) = &remote {
            self.write_cached(&key, settings);
        }
        Ok(remote)
    }

    async fn save_user_panel_config(
        &self,
        user_id: &UserId,
        panel_id: &PanelId,
        settings: &PanelSettings,
    ) -> Result<(), PanelError> {
        self.remote
            .save_user_panel_config(user_id, panel_id, settings)
            .await?;
        self.write_cached(&panel_cache_key(user_id, panel_id), settings);
        Ok(())
    }
}
