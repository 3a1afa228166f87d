//! Relation bucket adapters for relface.
//!
//! [`BucketStore`] bridges the relface [`Store`](relface_core::Store)
//! contract onto one bucket of an external relation, translating key names
//! at the boundary. [`MockBackend`] stands in for the external system in
//! tests, and [`StoreConfig`] describes which store a tree should use.

mod bucket;
mod config;
mod mock;

pub use bucket::{BucketBackend, BucketKey, BucketStore, KeyStyle};
pub use config::{MockFactory, StoreConfig, StoreFactory};
pub use mock::{MockBackend, MockBucketStore};
