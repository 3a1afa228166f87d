//! Store adapters: the flat string-keyed mapping behind an interface tree.
//!
//! Only the root of a tree owns a store. Every node in the tree reaches it
//! through the same shared handle, addressed by fully-qualified keys.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::{Error, Result};

/// Flat mapping from fully-qualified keys to encoded strings.
///
/// Key-naming conventions of a remote backend (for example underscores to
/// hyphens) are the adapter's business, never the interface's.
pub trait Store {
    /// Read the encoded value at a key.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key is absent.
    /// * `Ok(Some(value))` - The stored string.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store an encoded value, creating the key if needed.
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Remove a key. Fails with [`Error::NotFound`] if it is absent.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Whether the key is present.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// A boxed store adapter.
pub type StoreBox = Box<dyn Store>;

/// Shared handle to a tree's single store.
pub(crate) type StoreHandle = Rc<RefCell<StoreBox>>;

pub(crate) fn share(store: StoreBox) -> StoreHandle {
    Rc::new(RefCell::new(store))
}

impl<T: Store + ?Sized> Store for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.as_mut().set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.as_mut().delete(key)
    }
}

/// In-process store backed by an ordered map.
///
/// # Example
///
/// ```rust
/// use relface_core::{MemoryStore, Store};
///
/// let mut store = MemoryStore::new();
/// store.set("net.port", "8080".to_string()).unwrap();
/// assert_eq!(store.get("net.port").unwrap().as_deref(), Some("8080"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    data: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial entries.
    pub fn with_data(data: BTreeMap<String, String>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        log::trace!("memory store set {}", key);
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        log::trace!("memory store delete {}", key);
        match self.data.remove(key) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound {
                key: key.to_string(),
            }),
        }
    }
}

/// A store whose contents stay observable after it is handed to an
/// interface tree. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Rc<RefCell<MemoryStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current entries.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.borrow().data().clone()
    }
}

impl Store for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.inner.borrow_mut().set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.inner.borrow_mut().delete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_delete() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1".to_string()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert!(store.contains("a").unwrap());

        store.set("a", "2".to_string()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        store.delete("a").unwrap();
        assert!(!store.contains("a").unwrap());
    }

    #[test]
    fn delete_absent_is_not_found() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.delete("missing"),
            Err(Error::NotFound {
                key: "missing".to_string()
            })
        );
    }

    #[test]
    fn empty_string_is_a_present_value() {
        let mut store = MemoryStore::new();
        store.set("k", String::new()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(String::new()));
    }

    #[test]
    fn object_safety_works() {
        let mut boxed: StoreBox = Box::new(MemoryStore::new());
        boxed.set("x", "y".to_string()).unwrap();
        assert_eq!(boxed.get("x").unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn shared_store_clones_see_writes() {
        let observer = SharedStore::new();
        let mut writer = observer.clone();
        writer.set("k", "v".to_string()).unwrap();
        assert_eq!(observer.snapshot().get("k").map(String::as_str), Some("v"));
    }
}
