//! Error types for interface access.
//!
//! Every error is raised synchronously to the caller of the triggering
//! operation. Nothing here is retried or swallowed by the core.

use crate::access::Access;

/// Result alias used throughout relface.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by fields, interfaces and store adapters.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The field does not permit the attempted direction.
    #[error("access error: '{key}' is not {denied}")]
    Access { key: String, denied: Access },

    /// A value failed its checker, either before a write or after a read.
    #[error("check error: '{key}': {message}")]
    Check { key: String, message: String },

    /// The key is not present in the store.
    #[error("not found: '{key}'")]
    NotFound { key: String },

    /// Mount target is already bound and `force` was not given.
    #[error("mount conflict: '{key}' is already bound")]
    MountConflict { key: String },

    /// Mounting would place an interface inside its own subtree.
    #[error("mount cycle: cannot mount an ancestor at '{key}'")]
    MountCycle { key: String },

    /// A member walk went deeper than the recursion budget.
    #[error("interface nesting exceeds depth limit of {limit}")]
    DepthExceeded { limit: usize },

    /// No member with this key exists on the interface.
    #[error("unknown member: '{key}'")]
    UnknownMember { key: String },

    /// The member exists but is a sub-interface, not a field.
    #[error("'{key}' is an interface, not a field")]
    NotAField { key: String },

    /// The member's value type does not match the requested type.
    #[error("type mismatch for '{key}': expected {expected}")]
    TypeMismatch { key: String, expected: String },

    /// A field is already bound under another name.
    #[error("field already bound as '{existing}', cannot rebind as '{requested}'")]
    Rebind { existing: String, requested: String },

    /// A field was used before being attached to any schema.
    #[error("field is not bound to an interface")]
    Unbound,

    /// A member key is not a valid identifier.
    #[error("invalid key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    /// Encoding or decoding the wire string failed.
    #[error("codec error: {message}")]
    Codec { message: String },

    /// The checker itself is misconfigured.
    #[error("checker error: {message}")]
    Checker { message: String },

    /// The backing store failed.
    #[error("store error: {message}")]
    Store { message: String },

    /// Store configuration could not be understood.
    #[error("config error: {message}")]
    Config { message: String },
}

impl Error {
    /// Shorthand for a [`Error::Codec`] error.
    pub fn codec(message: impl Into<String>) -> Self {
        Error::Codec {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Store`] error.
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
        }
    }

    /// Whether this is a validation failure.
    pub fn is_check(&self) -> bool {
        matches!(self, Error::Check { .. })
    }

    /// Whether this is an access violation.
    pub fn is_access(&self) -> bool {
        matches!(self, Error::Access { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::codec(e.to_string())
    }
}
