//! Saved widget library
//!
//! Saved widgets live as one JSON list under a single namespaced key in a
//! key-value store. The list is most-recent-first and capped; anything that
//! cannot be read back is treated as an empty library.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use widget_engine::PayloadNode;

/// Errors from the backing store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A minimal string key-value slot store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Store keeping one file per key inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path).await?))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.path_for(key), value).await?;
        Ok(())
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.slots.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// A widget the user chose to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWidget {
    pub id: String,
    pub name: String,
    /// Payload root, widget or layout
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Label of the model that produced it
    pub model: String,
}

impl SavedWidget {
    pub fn new(payload: Value, model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: display_name(&payload),
            payload,
            created_at: now,
            updated_at: now,
            model: model.into(),
        }
    }
}

/// Human-readable name for a payload
///
/// Uses the first title-like prop found, falling back to the type name.
pub fn display_name(payload: &Value) -> String {
    const TITLE_FIELDS: [&str; 4] = ["title", "label", "habit", "exercise"];

    let node = PayloadNode::decode(payload);
    if let PayloadNode::Layout(layout) = &node {
        return format!(
            "{} ({} widgets)",
            layout.layout_type.as_str(),
            node.widget_count()
        );
    }

    let props = payload.get("props");
    TITLE_FIELDS
        .iter()
        .find_map(|field| props.and_then(|p| p.get(*field)).and_then(Value::as_str))
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .or_else(|| payload.get("type").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "Untitled widget".to_string())
}

/// The saved widget list on top of a key-value store
pub struct WidgetLibrary<S: KeyValueStore> {
    store: S,
    key: String,
    max_saved: usize,
}

impl<S: KeyValueStore> WidgetLibrary<S> {
    pub fn new(store: S, key: impl Into<String>, max_saved: usize) -> Self {
        Self {
            store,
            key: key.into(),
            max_saved,
        }
    }

    /// All saved widgets, most recent first
    ///
    /// Missing, unreadable or corrupt storage yields an empty list.
    pub async fn list(&self) -> Vec<SavedWidget> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read saved widgets: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<SavedWidget>>(&raw) {
            Ok(widgets) => widgets,
            Err(e) => {
                log::warn!("Saved widget storage is corrupt, ignoring it: {}", e);
                Vec::new()
            }
        }
    }

    /// Save a payload at the front of the list, evicting the oldest past the cap
    pub async fn save(
        &self,
        payload: Value,
        model: impl Into<String>,
    ) -> Result<SavedWidget, StorageError> {
        let saved = SavedWidget::new(payload, model);
        let mut widgets = self.list().await;
        widgets.insert(0, saved.clone());
        widgets.truncate(self.max_saved);
        self.write(&widgets).await?;

        log::info!("Saved widget '{}' ({})", saved.name, saved.id);
        Ok(saved)
    }

    /// Remove a saved widget; returns whether anything was removed
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut widgets = self.list().await;
        let before = widgets.len();
        widgets.retain(|w| w.id != id);
        if widgets.len() == before {
            return Ok(false);
        }
        self.write(&widgets).await?;
        log::info!("Deleted saved widget {}", id);
        Ok(true)
    }

    pub async fn get(&self, id: &str) -> Option<SavedWidget> {
        self.list().await.into_iter().find(|w| w.id == id)
    }

    async fn write(&self, widgets: &[SavedWidget]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(widgets)?;
        self.store.set(&self.key, serialized).await
    }
}
