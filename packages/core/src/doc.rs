//! Introspection documents produced by [`Interface::get_doc`](crate::Interface::get_doc).
//!
//! These are for schema discovery and debugging. Nothing in the core parses
//! them back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Access;

/// Describes a codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecDoc {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// Describes a checker and its configured parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerDoc {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Describes one field of an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    #[serde(rename = "type")]
    pub kind: String,
    pub codec: Option<CodecDoc>,
    pub checker: Option<CheckerDoc>,
    pub description: String,
    pub access: Access,
    /// Live decoded value, present only when requested. Unset renders as null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Either a field or a nested interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberDoc {
    Interface(InterfaceDoc),
    Field(FieldDoc),
}

/// Describes an interface and, recursively, its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDoc {
    pub name: String,
    pub origin: String,
    pub description: String,
    pub values: BTreeMap<String, MemberDoc>,
}

impl InterfaceDoc {
    /// Look up a member document by its local key.
    pub fn member(&self, key: &str) -> Option<&MemberDoc> {
        self.values.get(key)
    }

    /// Look up a field document by its local key.
    pub fn field(&self, key: &str) -> Option<&FieldDoc> {
        match self.values.get(key) {
            Some(MemberDoc::Field(doc)) => Some(doc),
            _ => None,
        }
    }

    /// Look up a nested interface document by its local key.
    pub fn interface(&self, key: &str) -> Option<&InterfaceDoc> {
        match self.values.get(key) {
            Some(MemberDoc::Interface(doc)) => Some(doc),
            _ => None,
        }
    }
}
