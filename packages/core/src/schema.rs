//! Schemas: the static member registry of an interface type.
//!
//! A schema is built once per interface type and names every field and
//! nested interface before any instance exists. Building binds each field's
//! name for good.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::field::{AnyField, Field, FieldType};
use crate::{key, Error, Interface, Result};

/// Readiness predicate for an interface type.
pub type ReadyFn = fn(&Interface) -> Result<bool>;

#[derive(Clone)]
pub(crate) enum SchemaMember {
    Field(Arc<dyn AnyField>),
    Child(Schema),
}

struct SchemaDef {
    name: String,
    origin: String,
    description: String,
    members: BTreeMap<String, SchemaMember>,
    ready: Option<ReadyFn>,
}

/// Definition of an interface type. Cheap to clone.
#[derive(Clone)]
pub struct Schema {
    def: Arc<SchemaDef>,
}

impl Schema {
    /// Start building a schema for the interface type `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            def: SchemaDef {
                name: name.into(),
                origin: String::new(),
                description: String::new(),
                members: BTreeMap::new(),
                ready: None,
            },
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Where the type was defined, typically a module path.
    pub fn origin(&self) -> &str {
        &self.def.origin
    }

    pub fn description(&self) -> &str {
        &self.def.description
    }

    /// Member keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.def.members.keys().map(String::as_str)
    }

    pub(crate) fn members(&self) -> &BTreeMap<String, SchemaMember> {
        &self.def.members
    }

    pub(crate) fn ready(&self) -> Option<ReadyFn> {
        self.def.ready
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.def.name)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Schema`]. The first error encountered is reported by
/// [`SchemaBuilder::build`].
pub struct SchemaBuilder {
    def: SchemaDef,
    error: Option<Error>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.def.origin = origin.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.def.description = description.into();
        self
    }

    /// Register a field under `key`, binding the field's name.
    #[must_use]
    pub fn field<T: FieldType>(mut self, key: &str, field: &Field<T>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = self.claim(key).and_then(|_| field.bind(key)) {
            self.error = Some(e);
            return self;
        }
        self.def
            .members
            .insert(key.to_string(), SchemaMember::Field(Arc::new(field.clone())));
        self
    }

    /// Register a nested interface type under `key`. Every instance gets its
    /// own child instance.
    #[must_use]
    pub fn child(mut self, key: &str, schema: &Schema) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = self.claim(key) {
            self.error = Some(e);
            return self;
        }
        self.def
            .members
            .insert(key.to_string(), SchemaMember::Child(schema.clone()));
        self
    }

    /// Readiness predicate reported by [`Interface::is_ready`].
    #[must_use]
    pub fn ready_when(mut self, ready: ReadyFn) -> Self {
        self.def.ready = Some(ready);
        self
    }

    fn claim(&self, key: &str) -> Result<()> {
        key::validate(key)?;
        if self.def.members.contains_key(key) {
            return Err(Error::InvalidKey {
                key: key.to_string(),
                message: format!("duplicate member in {}", self.def.name),
            });
        }
        Ok(())
    }

    pub fn build(self) -> Result<Schema> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Schema {
                def: Arc::new(self.def),
            }),
        }
    }
}
