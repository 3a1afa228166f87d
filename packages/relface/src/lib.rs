//! relface: a schema layer for typed, validated key-value data exchanged
//! through flat string-keyed buckets.
//!
//! This crate re-exports the workspace:
//! - the core, at the top level: fields, schemas, interfaces, codecs,
//!   checkers, stores
//! - [`bucket`]: relation bucket adapters and store configuration
//! - [`values`]: ready-made field constructors
//!
//! # Example
//!
//! ```rust
//! use relface::bucket::{BucketKey, MockBucketStore};
//! use relface::{values, Interface, Schema};
//!
//! let port = values::port();
//! let host = values::string();
//! let ctld = Schema::builder("Slurmctld")
//!     .field("host", &host)
//!     .field("port", &port)
//!     .build()
//!     .unwrap();
//! let app = Schema::builder("Cluster").child("slurmctld", &ctld).build().unwrap();
//!
//! let store = MockBucketStore::mock("slurmctld", BucketKey::App);
//! let backend = store.backend().clone();
//! let root = Interface::with_store(&app, Box::new(store));
//!
//! port.set(&root.child("slurmctld").unwrap(), 6817).unwrap();
//! let bucket = backend.bucket("slurmctld", 0, BucketKey::App).unwrap();
//! assert_eq!(bucket["slurmctld.port"], "6817");
//! ```

pub use relface_bucket as bucket;
pub use relface_values as values;

pub use relface_core::*;
