//! relface core: typed, validated namespaces over a flat string-keyed store.
//!
//! The building blocks:
//! - `Field<T>`: a named value descriptor with access mode, default, checker
//!   and codec
//! - `Schema`: the members of an interface type, declared once
//! - `Interface`: a namespace node; nested interfaces form a tree whose
//!   root owns a single `Store`
//! - `Codec` / `Checker`: the two small contracts a field is built from
//!
//! Every node addresses the store with a fully-qualified dotted key, so a
//! tree reads and writes a flat mapping such as
//! `{"slurmctld.port": "6817", "slurmctld.host": "head0"}`.
//!
//! # Example
//!
//! ```rust
//! use relface_core::{Field, IntegerRange, Interface, ParseCodec, Schema, SharedStore};
//!
//! let port = Field::new("Port", ParseCodec::<i64>::new())
//!     .with_default(0)
//!     .with_checker(IntegerRange::new(Some(0), Some(65535)));
//! let net = Schema::builder("Net").field("port", &port).build().unwrap();
//! let app = Schema::builder("App").child("net", &net).build().unwrap();
//!
//! let store = SharedStore::new();
//! let root = Interface::with_store(&app, Box::new(store.clone()));
//! let iface = root.child("net").unwrap();
//!
//! assert_eq!(port.read(&iface).unwrap(), Some(0));
//! port.set(&iface, 8080).unwrap();
//! assert!(port.set(&iface, 70000).is_err());
//! assert_eq!(store.snapshot()["net.port"], "8080");
//! ```

mod access;
mod checker;
mod codec;
mod doc;
mod error;
mod field;
mod interface;
pub mod key;
mod probe;
mod schema;
mod store;

pub use access::Access;
pub use checker::{Checker, FloatRange, IntegerRange, OneOf, Predicate, Range, RangeBound, Regexp, Url};
pub use codec::{BlobCodec, BoolCodec, Codec, JsonCodec, ParseCodec, StringCodec};
pub use doc::{CheckerDoc, CodecDoc, FieldDoc, InterfaceDoc, MemberDoc};
pub use error::{Error, Result};
pub use field::{AnyField, Field, FieldType};
pub use interface::{Interface, Item, Member, MAX_DEPTH};
pub use probe::{probe, ProbeReport};
pub use schema::{ReadyFn, Schema, SchemaBuilder};
pub use store::{MemoryStore, SharedStore, Store, StoreBox};
