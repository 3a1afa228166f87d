//! Store configuration and construction.

use relface_core::{Error, MemoryStore, Result, StoreBox};
use serde::{Deserialize, Serialize};

use crate::{BucketKey, BucketStore, KeyStyle, MockBackend};

/// Which store backs an interface tree.
///
/// ```rust
/// use relface_bucket::{BucketKey, StoreConfig};
///
/// let config = StoreConfig::from_json(r#"{"type": "bucket", "relation": "slurmd", "bucket": "app"}"#).unwrap();
/// assert!(matches!(config, StoreConfig::Bucket { bucket: BucketKey::App, relation_id: None, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-process map
    Memory,
    /// One bucket of a named relation
    Bucket {
        relation: String,
        bucket: BucketKey,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relation_id: Option<u32>,
        #[serde(default)]
        key_style: KeyStyle,
    },
}

impl StoreConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }
}

/// Builds stores from configuration.
pub trait StoreFactory {
    fn create(&self, config: &StoreConfig) -> Result<StoreBox>;
}

/// Factory whose bucket stores all share one [`MockBackend`].
#[derive(Debug, Clone, Default)]
pub struct MockFactory {
    backend: MockBackend,
}

impl MockFactory {
    pub fn new(backend: MockBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }
}

impl StoreFactory for MockFactory {
    fn create(&self, config: &StoreConfig) -> Result<StoreBox> {
        log::debug!("creating store from {:?}", config);
        match config {
            StoreConfig::Memory => Ok(Box::new(MemoryStore::new())),
            StoreConfig::Bucket {
                relation,
                bucket,
                relation_id,
                key_style,
            } => {
                let mut store = BucketStore::new(self.backend.clone(), relation.clone(), *bucket)
                    .with_key_style(*key_style);
                if let Some(id) = relation_id {
                    store = store.with_relation_id(*id);
                }
                Ok(Box::new(store))
            }
        }
    }
}
