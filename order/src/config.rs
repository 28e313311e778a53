//! Configuration for the ordering front end.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::draft_store::{DraftStore, FileDraftStore, InMemoryDraftStore, DEFAULT_DRAFT_KEY};
use crate::order_id::DEFAULT_ORDER_PREFIX;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the in-progress draft is kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key, survives restarts
    #[default]
    File,
    /// Process memory only
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Draft storage configuration
    pub storage: StorageConfig,
    /// Order configuration
    pub orders: OrdersConfig,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Draft storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend: file, memory (default: file)
    pub backend: StorageBackend,
    /// Directory holding draft files
    pub dir: PathBuf,
    /// Key the draft is stored under
    pub key: String,
}

/// Order configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// Prefix of every order id
    pub id_prefix: String,
    /// Café name shown in the header
    pub brand: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unrecognized values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend = match var("HANAMO_STORAGE", "file").trim().to_ascii_lowercase().as_str() {
            "file" => StorageBackend::File,
            "memory" => StorageBackend::Memory,
            other => {
                tracing::warn!(value = other, "Unknown HANAMO_STORAGE, using file storage");
                StorageBackend::File
            },
        };

        Self {
            storage: StorageConfig {
                backend,
                dir: PathBuf::from(var("HANAMO_DRAFT_DIR", ".hanamo")),
                key: var("HANAMO_DRAFT_KEY", DEFAULT_DRAFT_KEY),
            },
            orders: OrdersConfig {
                id_prefix: var("HANAMO_ORDER_PREFIX", DEFAULT_ORDER_PREFIX),
                brand: var("HANAMO_BRAND", "Hanamo Home Cafe"),
            },
            log_level: var("HANAMO_LOG", "info"),
        }
    }

    /// Builds the configured draft store
    #[must_use]
    pub fn draft_store(&self) -> Arc<dyn DraftStore> {
        match self.storage.backend {
            StorageBackend::File => Arc::new(FileDraftStore::new(
                self.storage.dir.clone(),
                self.storage.key.clone(),
            )),
            StorageBackend::Memory => Arc::new(InMemoryDraftStore::new()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
