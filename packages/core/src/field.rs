//! Field descriptors: named, typed, validated members of an interface.
//!
//! A field never holds state. Reads and writes go through the owning
//! interface to the tree's store, addressed by the field's fully-qualified
//! key. Writes are checked before encoding; reads are decoded and then
//! checked again, so a stale or foreign writer cannot slip a bad value past
//! a reader.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;

use crate::{Access, Checker, Codec, Error, FieldDoc, Interface, Result};

/// Types that can be carried by a [`Field`].
///
/// Serde is the bridge to the dynamic, keyed side of an interface
/// ([`Interface::get`], [`Interface::set`], documents).
pub trait FieldType:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> FieldType for T where
    T: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

#[derive(Clone)]
struct FieldDef<T> {
    kind: String,
    description: String,
    default: Option<T>,
    checker: Option<Arc<dyn Checker<T>>>,
    codec: Arc<dyn Codec<T>>,
    access: Access,
    name: OnceLock<String>,
}

/// A typed field handle.
///
/// Clones share one definition, so binding a field to a schema names every
/// clone. A `with_*` call on a clone of a bound field gives an unbound field
/// with its own definition.
///
/// # Example
///
/// ```rust
/// use relface_core::{Field, IntegerRange, Interface, ParseCodec, Schema};
///
/// let port = Field::new("Port", ParseCodec::<i64>::new())
///     .with_default(0)
///     .with_checker(IntegerRange::new(Some(0), Some(65535)));
/// let schema = Schema::builder("Service").field("port", &port).build().unwrap();
///
/// let iface = Interface::new(&schema);
/// assert_eq!(port.read(&iface).unwrap(), Some(0));
/// port.set(&iface, 8080).unwrap();
/// assert_eq!(port.read(&iface).unwrap(), Some(8080));
/// assert!(port.set(&iface, 99999).is_err());
/// ```
pub struct Field<T> {
    def: Arc<FieldDef<T>>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            def: Arc::clone(&self.def),
        }
    }
}

impl<T: FieldType> Field<T> {
    /// Create a readable, writable field with no default and no checker.
    pub fn new(kind: impl Into<String>, codec: impl Codec<T> + 'static) -> Self {
        Self {
            def: Arc::new(FieldDef {
                kind: kind.into(),
                description: String::new(),
                default: None,
                checker: None,
                codec: Arc::new(codec),
                access: Access::READ_WRITE,
                name: OnceLock::new(),
            }),
        }
    }

    /// A shared definition is copied before it is changed. The copy is
    /// unbound: the name belongs to the schema that bound the original.
    fn def_mut(&mut self) -> &mut FieldDef<T> {
        if Arc::get_mut(&mut self.def).is_none() {
            let mut def = FieldDef::clone(&self.def);
            def.name = OnceLock::new();
            self.def = Arc::new(def);
        }
        Arc::make_mut(&mut self.def)
    }

    #[must_use]
    pub fn with_default(mut self, default: T) -> Self {
        self.def_mut().default = Some(default);
        self
    }

    #[must_use]
    pub fn with_checker(mut self, checker: impl Checker<T> + 'static) -> Self {
        self.def_mut().checker = Some(Arc::new(checker));
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: impl Codec<T> + 'static) -> Self {
        self.def_mut().codec = Arc::new(codec);
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.def_mut().access = access;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.def_mut().description = description.into();
        self
    }

    /// The bound name, if the field has been attached to a schema.
    pub fn name(&self) -> Option<&str> {
        self.def.name.get().map(String::as_str)
    }

    pub fn kind(&self) -> &str {
        &self.def.kind
    }

    pub fn description(&self) -> &str {
        &self.def.description
    }

    pub fn default_value(&self) -> Option<&T> {
        self.def.default.as_ref()
    }

    pub fn access(&self) -> Access {
        self.def.access
    }

    pub fn codec(&self) -> &dyn Codec<T> {
        self.def.codec.as_ref()
    }

    pub fn checker(&self) -> Option<&dyn Checker<T>> {
        self.def.checker.as_deref()
    }

    /// Attach a name. The first name sticks; binding again under the same
    /// name is accepted, under any other name fails.
    pub fn bind(&self, name: &str) -> Result<()> {
        let existing = self.def.name.get_or_init(|| name.to_string());
        if existing == name {
            Ok(())
        } else {
            Err(Error::Rebind {
                existing: existing.clone(),
                requested: name.to_string(),
            })
        }
    }

    fn bound_name(&self) -> Result<&str> {
        self.name().ok_or(Error::Unbound)
    }

    /// Make sure `iface` really owns this field, not another one with the
    /// same name.
    fn ensure_member(&self, iface: &Interface, name: &str) -> Result<()> {
        let member = iface.field_member(name)?;
        if member.definition_id() == self.definition_id() {
            Ok(())
        } else {
            Err(Error::UnknownMember {
                key: iface.fq_key(name),
            })
        }
    }

    fn definition_id(&self) -> *const () {
        Arc::as_ptr(&self.def).cast()
    }

    /// Read the value from `iface`.
    ///
    /// Falls back to the default when nothing is stored. `Ok(None)` means
    /// unset: nothing stored and no default. Unset values are never checked.
    pub fn read(&self, iface: &Interface) -> Result<Option<T>> {
        let name = self.bound_name()?;
        if !self.def.access.can_read() {
            return Err(Error::Access {
                key: iface.fq_key(name),
                denied: Access::READ,
            });
        }
        self.ensure_member(iface, name)?;

        let value = match iface.load(name)? {
            None => self.def.default.clone(),
            Some(encoded) => Some(self.decode(iface, name, &encoded)?),
        };

        if let Some(value) = &value {
            self.run_check(&iface.fq_key(name), value)?;
        }
        Ok(value)
    }

    /// Write a value to `iface`.
    ///
    /// Writing `None` (unset) is a no-op: no access check, no checker, no
    /// store access. A rejected value leaves the store untouched.
    pub fn write(&self, iface: &Interface, value: Option<T>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };

        let name = self.bound_name()?;
        let key = iface.fq_key(name);
        if !self.def.access.can_write() {
            log::debug!("rejected write to read-only field {}", key);
            return Err(Error::Access {
                key,
                denied: Access::WRITE,
            });
        }
        self.ensure_member(iface, name)?;

        if let Err(e) = self.run_check(&key, &value) {
            log::debug!("rejected write to {}: {}", key, e);
            return Err(e);
        }

        let encoded = self
            .def
            .codec
            .encode(&value)
            .map_err(|e| annotate(&key, e))?;
        iface.store(name, encoded)
    }

    /// Write a concrete value. Shorthand for `write(iface, Some(value))`.
    pub fn set(&self, iface: &Interface, value: T) -> Result<()> {
        self.write(iface, Some(value))
    }

    fn decode(&self, iface: &Interface, name: &str, encoded: &str) -> Result<T> {
        self.def
            .codec
            .decode(encoded)
            .map_err(|e| annotate(&iface.fq_key(name), e))
    }

    fn run_check(&self, key: &str, value: &T) -> Result<()> {
        let Some(checker) = &self.def.checker else {
            return Ok(());
        };
        match checker.check(value) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::Check {
                key: key.to_string(),
                message: format!("{:?} rejected by {}", value, checker.doc().kind),
            }),
            Err(Error::Check { message, .. }) => Err(Error::Check {
                key: key.to_string(),
                message,
            }),
            Err(e) => Err(e),
        }
    }
}

fn annotate(key: &str, error: Error) -> Error {
    match error {
        Error::Codec { message } => Error::Codec {
            message: format!("{}: {}", key, message),
        },
        other => other,
    }
}

impl<T: FieldType> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("kind", &self.def.kind)
            .field("name", &self.name())
            .field("access", &self.def.access)
            .field("default", &self.def.default)
            .finish()
    }
}

/// Type-erased view of a [`Field`], as stored in interfaces and schemas.
pub trait AnyField: Send + Sync {
    fn name(&self) -> Option<&str>;

    fn kind(&self) -> &str;

    fn access(&self) -> Access;

    /// Read through the field and convert to JSON.
    fn read_json(&self, iface: &Interface) -> Result<Option<Json>>;

    /// Convert from JSON and write through the field.
    fn write_json(&self, iface: &Interface, value: Option<Json>) -> Result<()>;

    /// Static description of the field (no live value).
    fn doc(&self) -> FieldDoc;

    fn as_any(&self) -> &dyn Any;

    /// Identity of the shared definition.
    #[doc(hidden)]
    fn definition_id(&self) -> *const ();
}

impl<T: FieldType> AnyField for Field<T> {
    fn name(&self) -> Option<&str> {
        Field::name(self)
    }

    fn kind(&self) -> &str {
        Field::kind(self)
    }

    fn access(&self) -> Access {
        Field::access(self)
    }

    fn read_json(&self, iface: &Interface) -> Result<Option<Json>> {
        match self.read(iface)? {
            Some(value) => Ok(Some(serde_json::to_value(value)?)),
            None => Ok(None),
        }
    }

    fn write_json(&self, iface: &Interface, value: Option<Json>) -> Result<()> {
        let Some(json) = value else {
            return Ok(());
        };
        let is_null = json.is_null();
        let typed: T = match serde_json::from_value(json) {
            Ok(typed) => typed,
            // `null` only reaches `T` when `T` has a null of its own.
            Err(_) if is_null => return Ok(()),
            Err(_) => {
                return Err(Error::TypeMismatch {
                    key: self
                        .name()
                        .map(|n| iface.fq_key(n))
                        .unwrap_or_default(),
                    expected: std::any::type_name::<T>().to_string(),
                })
            }
        };
        self.write(iface, Some(typed))
    }

    fn doc(&self) -> FieldDoc {
        FieldDoc {
            kind: self.def.kind.clone(),
            codec: Some(self.def.codec.doc()),
            checker: self.def.checker.as_ref().map(|c| c.doc()),
            description: self.def.description.clone(),
            access: self.def.access,
            value: None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn definition_id(&self) -> *const () {
        Field::definition_id(self)
    }
}
