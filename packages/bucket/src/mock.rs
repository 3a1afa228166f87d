//! In-memory stand-in for the external relation system.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use relface_core::{Error, Result};

use crate::{BucketBackend, BucketKey, BucketStore};

type Bucket = BTreeMap<String, String>;
type Relation = BTreeMap<BucketKey, Bucket>;

/// Relation buckets kept in memory: `relation -> id -> bucket -> key -> value`.
///
/// Clones share the same state, so a test can keep one handle while a
/// [`BucketStore`] owns another.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    relations: Rc<RefCell<BTreeMap<String, BTreeMap<u32, Relation>>>>,
}

/// A [`BucketStore`] over [`MockBackend`].
pub type MockBucketStore = BucketStore<MockBackend>;

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish relation `id` under `relation` with empty app and unit
    /// buckets. Re-adding an existing relation keeps its data.
    pub fn add_relation(&self, relation: &str, id: u32) {
        self.relations
            .borrow_mut()
            .entry(relation.to_string())
            .or_default()
            .entry(id)
            .or_insert_with(|| {
                [BucketKey::App, BucketKey::Unit]
                    .into_iter()
                    .map(|b| (b, Bucket::new()))
                    .collect()
            });
    }

    #[must_use]
    pub fn with_relation(self, relation: &str, id: u32) -> Self {
        self.add_relation(relation, id);
        self
    }

    /// Drop relation `id` and its data.
    pub fn remove_relation(&self, relation: &str, id: u32) {
        if let Some(ids) = self.relations.borrow_mut().get_mut(relation) {
            ids.remove(&id);
        }
    }

    /// Copy of one bucket, if the relation exists.
    pub fn bucket(&self, relation: &str, id: u32, bucket: BucketKey) -> Option<Bucket> {
        self.relations
            .borrow()
            .get(relation)?
            .get(&id)?
            .get(&bucket)
            .cloned()
    }

    fn missing(relation: &str, id: u32) -> Error {
        Error::store(format!("no relation {}:{}", relation, id))
    }
}

impl BucketBackend for MockBackend {
    fn relation_ids(&self, relation: &str) -> Result<Vec<u32>> {
        Ok(self
            .relations
            .borrow()
            .get(relation)
            .map(|ids| ids.keys().copied().collect())
            .unwrap_or_default())
    }

    fn read(&self, relation: &str, id: u32, bucket: BucketKey, key: &str) -> Result<Option<String>> {
        Ok(self
            .bucket(relation, id, bucket)
            .and_then(|data| data.get(key).cloned()))
    }

    fn write(&mut self, relation: &str, id: u32, bucket: BucketKey, key: &str, value: String) -> Result<()> {
        let mut relations = self.relations.borrow_mut();
        let data = relations
            .get_mut(relation)
            .and_then(|ids| ids.get_mut(&id))
            .and_then(|buckets| buckets.get_mut(&bucket))
            .ok_or_else(|| Self::missing(relation, id))?;
        data.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, relation: &str, id: u32, bucket: BucketKey, key: &str) -> Result<bool> {
        let mut relations = self.relations.borrow_mut();
        let data = relations
            .get_mut(relation)
            .and_then(|ids| ids.get_mut(&id))
            .and_then(|buckets| buckets.get_mut(&bucket))
            .ok_or_else(|| Self::missing(relation, id))?;
        Ok(data.remove(key).is_some())
    }
}

impl MockBucketStore {
    /// A store over a fresh mock with one established relation (id 0),
    /// the usual shape of a unit test.
    pub fn mock(relation: &str, bucket: BucketKey) -> Self {
        let backend = MockBackend::new().with_relation(relation, 0);
        BucketStore::new(backend, relation, bucket).with_relation_id(0)
    }
}
