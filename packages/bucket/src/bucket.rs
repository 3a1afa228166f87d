//! Store adapter over an external per-participant relation bucket.

use std::fmt;

use relface_core::{Error, Result, Store};
use serde::{Deserialize, Serialize};

/// Which participant bucket of a relation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKey {
    App,
    Unit,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::App => write!(f, "app"),
            BucketKey::Unit => write!(f, "unit"),
        }
    }
}

/// How fully-qualified keys are spelled in the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// Underscores become hyphens.
    #[default]
    Hyphen,
    /// Keys are used as-is.
    Verbatim,
}

impl KeyStyle {
    pub fn translate(&self, key: &str) -> String {
        match self {
            KeyStyle::Hyphen => key.replace('_', "-"),
            KeyStyle::Verbatim => key.to_string(),
        }
    }
}

/// The external system holding relation buckets.
///
/// Relations are identified by name and numeric id; each has one bucket per
/// [`BucketKey`]. Implementations talk to the real system or, for tests,
/// to memory (see [`MockBackend`](crate::MockBackend)).
pub trait BucketBackend {
    /// Ids of every relation currently established under `relation`.
    fn relation_ids(&self, relation: &str) -> Result<Vec<u32>>;

    fn read(&self, relation: &str, id: u32, bucket: BucketKey, key: &str) -> Result<Option<String>>;

    fn write(&mut self, relation: &str, id: u32, bucket: BucketKey, key: &str, value: String) -> Result<()>;

    /// Remove a key. Returns whether it was present.
    fn remove(&mut self, relation: &str, id: u32, bucket: BucketKey, key: &str) -> Result<bool>;
}

/// [`Store`] bridged onto one bucket of a named relation.
///
/// Without a configured relation id, reads use the single established
/// relation of that name (several is an error, none reads as absent) and
/// writes go to every relation of that name.
#[derive(Debug, Clone)]
pub struct BucketStore<B> {
    backend: B,
    relation: String,
    bucket: BucketKey,
    relation_id: Option<u32>,
    key_style: KeyStyle,
}

impl<B: BucketBackend> BucketStore<B> {
    pub fn new(backend: B, relation: impl Into<String>, bucket: BucketKey) -> Self {
        Self {
            backend,
            relation: relation.into(),
            bucket,
            relation_id: None,
            key_style: KeyStyle::default(),
        }
    }

    /// Pin the store to one relation id.
    #[must_use]
    pub fn with_relation_id(mut self, id: u32) -> Self {
        self.relation_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn bucket(&self) -> BucketKey {
        self.bucket
    }

    pub fn relation_id(&self) -> Option<u32> {
        self.relation_id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_relation(&self) -> Result<Option<u32>> {
        if let Some(id) = self.relation_id {
            return Ok(Some(id));
        }
        let ids = self.backend.relation_ids(&self.relation)?;
        match ids.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => Err(Error::store(format!(
                "{} relations named '{}'; a relation id is required",
                ids.len(),
                self.relation
            ))),
        }
    }

    fn write_relations(&self) -> Result<Vec<u32>> {
        match self.relation_id {
            Some(id) => Ok(vec![id]),
            None => self.backend.relation_ids(&self.relation),
        }
    }
}

impl<B: BucketBackend> Store for BucketStore<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.key_style.translate(key);
        match self.read_relation()? {
            Some(id) => {
                log::trace!("bucket get {}:{}/{} {}", self.relation, id, self.bucket, key);
                self.backend.read(&self.relation, id, self.bucket, &key)
            }
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let key = self.key_style.translate(key);
        let ids = self.write_relations()?;
        if ids.is_empty() {
            return Err(Error::store(format!(
                "no '{}' relation to write {} to",
                self.relation, key
            )));
        }
        for id in ids {
            log::trace!("bucket set {}:{}/{} {}", self.relation, id, self.bucket, key);
            self.backend
                .write(&self.relation, id, self.bucket, &key, value.clone())?;
        }
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.get(key)?.is_none() {
            return Err(Error::NotFound {
                key: key.to_string(),
            });
        }
        let translated = self.key_style.translate(key);
        for id in self.write_relations()? {
            log::trace!("bucket delete {}:{}/{} {}", self.relation, id, self.bucket, translated);
            self.backend
                .remove(&self.relation, id, self.bucket, &translated)?;
        }
        Ok(())
    }
}
