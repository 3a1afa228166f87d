//! Ready-made relface field types.
//!
//! Each constructor returns a fresh, unbound [`Field`](relface_core::Field)
//! with its codec, checker and default preset. Adjust with the usual
//! builder methods before registering it in a schema.

mod network;
mod scalar;

pub use network::{ip_address, port, privileged_port, unprivileged_port, url};
pub use scalar::{blob, boolean, float, integer, json, string};
