//! Interfaces: namespace nodes that aggregate fields and nested interfaces.
//!
//! Every node in a tree shares the root's store handle and addresses it with
//! fully-qualified keys built from its prefix. Prefix, store and root are
//! assigned when the tree is built or when a node is mounted, never derived
//! by walking parents at access time.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde_json::Value as Json;

use crate::field::{AnyField, Field, FieldType};
use crate::schema::SchemaMember;
use crate::store::{share, StoreHandle};
use crate::{key, Error, InterfaceDoc, MemberDoc, MemoryStore, Result, Schema, StoreBox};

/// Recursion budget for walks over nested interfaces.
pub const MAX_DEPTH: usize = 100;

/// A bound member of an interface.
#[derive(Clone)]
pub enum Member {
    Field(Arc<dyn AnyField>),
    Interface(Interface),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Field(field) => f
                .debug_struct("Field")
                .field("kind", &field.kind())
                .field("name", &field.name())
                .finish(),
            Member::Interface(iface) => fmt::Debug::fmt(iface, f),
        }
    }
}

/// Result of a keyed read: a decoded value (`None` when unset) or the
/// nested interface itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Value(Option<Json>),
    Interface(Interface),
}

impl Item {
    pub fn value(&self) -> Option<&Json> {
        match self {
            Item::Value(value) => value.as_ref(),
            Item::Interface(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Json> {
        match self {
            Item::Value(value) => value,
            Item::Interface(_) => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Interface> {
        match self {
            Item::Interface(iface) => Some(iface),
            Item::Value(_) => None,
        }
    }
}

struct NodeState {
    prefix: String,
    store: StoreHandle,
    root: Weak<Node>,
    /// The node this one is bound in, and the key it is bound under.
    parent: Option<(Weak<Node>, String)>,
    members: BTreeMap<String, Member>,
}

struct Node {
    schema: Schema,
    state: RefCell<NodeState>,
}

impl Node {
    fn build(
        schema: &Schema,
        store: &StoreHandle,
        root: &Weak<Node>,
        this: &Weak<Node>,
        parent: Option<(Weak<Node>, String)>,
        prefix: String,
    ) -> Node {
        let members = schema
            .members()
            .iter()
            .map(|(key, member)| {
                let member = match member {
                    SchemaMember::Field(field) => Member::Field(Arc::clone(field)),
                    SchemaMember::Child(child) => Member::Interface(Interface {
                        node: Rc::new_cyclic(|weak| {
                            Node::build(
                                child,
                                store,
                                root,
                                weak,
                                Some((this.clone(), key.clone())),
                                key::qualify(&prefix, key),
                            )
                        }),
                    }),
                };
                (key.clone(), member)
            })
            .collect();

        Node {
            schema: schema.clone(),
            state: RefCell::new(NodeState {
                prefix,
                store: Rc::clone(store),
                root: root.clone(),
                parent,
                members,
            }),
        }
    }
}

/// A namespace node.
///
/// `Interface` is a handle: clones refer to the same node, so a node mounted
/// into a tree is addressable through every handle to it.
///
/// # Example
///
/// ```rust
/// use relface_core::{Field, Interface, ParseCodec, Schema, StringCodec};
///
/// let host = Field::new("String", StringCodec);
/// let port = Field::new("Integer", ParseCodec::<i64>::new());
/// let endpoint = Schema::builder("Endpoint")
///     .field("host", &host)
///     .field("port", &port)
///     .build()
///     .unwrap();
/// let service = Schema::builder("Service")
///     .child("endpoint", &endpoint)
///     .build()
///     .unwrap();
///
/// let iface = Interface::new(&service);
/// let ep = iface.child("endpoint").unwrap();
/// port.set(&ep, 8080).unwrap();
///
/// assert_eq!(ep.fq_key("port"), "endpoint.port");
/// assert_eq!(iface.get_all_keys(), vec!["endpoint.host", "endpoint.port"]);
/// ```
#[derive(Clone)]
pub struct Interface {
    node: Rc<Node>,
}

impl Interface {
    /// Instantiate `schema` as a standalone tree with a private in-memory
    /// store. Mounting it elsewhere re-roots it.
    pub fn new(schema: &Schema) -> Self {
        Self::with_store(schema, Box::new(MemoryStore::new()))
    }

    /// Instantiate `schema` as the root of a tree that owns `store`.
    pub fn with_store(schema: &Schema, store: StoreBox) -> Self {
        let store = share(store);
        let node = Rc::new_cyclic(|root| Node::build(schema, &store, root, root, None, String::new()));
        log::debug!("created interface tree {}", schema.name());
        Interface { node }
    }

    fn state(&self) -> Ref<'_, NodeState> {
        self.node.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, NodeState> {
        self.node.state.borrow_mut()
    }

    pub fn schema(&self) -> &Schema {
        &self.node.schema
    }

    /// Name of the interface type.
    pub fn name(&self) -> &str {
        self.node.schema.name()
    }

    /// Dotted path from the tree root to this node; empty at the root.
    pub fn prefix(&self) -> String {
        self.state().prefix.clone()
    }

    /// Fully-qualified key for a local member name.
    pub fn fq_key(&self, key: &str) -> String {
        key::qualify(&self.state().prefix, key)
    }

    /// Whether this node is the root that owns the tree's store.
    pub fn is_root(&self) -> bool {
        std::ptr::eq(self.state().root.as_ptr(), Rc::as_ptr(&self.node))
    }

    /// The tree root, if it is still alive.
    pub fn base(&self) -> Option<Interface> {
        self.state().root.upgrade().map(|node| Interface { node })
    }

    /// Whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Interface) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Members that must never be followed: this node and the tree root.
    fn is_self_or_root(&self, other: &Interface) -> bool {
        other.ptr_eq(self) || std::ptr::eq(self.state().root.as_ptr(), Rc::as_ptr(&other.node))
    }

    fn members(&self) -> Vec<(String, Member)> {
        self.state()
            .members
            .iter()
            .map(|(k, m)| (k.clone(), m.clone()))
            .collect()
    }

    /// The member bound at `key`.
    pub fn member(&self, key: &str) -> Result<Member> {
        self.state()
            .members
            .get(key)
            .cloned()
            .ok_or_else(|| Error::UnknownMember {
                key: self.fq_key(key),
            })
    }

    pub(crate) fn field_member(&self, key: &str) -> Result<Arc<dyn AnyField>> {
        match self.member(key)? {
            Member::Field(field) => Ok(field),
            Member::Interface(_) => Err(Error::NotAField {
                key: self.fq_key(key),
            }),
        }
    }

    fn typed_field<T: FieldType>(&self, key: &str) -> Result<Field<T>> {
        let field = self.field_member(key)?;
        let typed = field.as_any().downcast_ref::<Field<T>>().cloned();
        typed.ok_or_else(|| Error::TypeMismatch {
            key: self.fq_key(key),
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// The nested interface at `key`. This is how to walk down a tree.
    pub fn child(&self, key: &str) -> Result<Interface> {
        match self.member(key)? {
            Member::Interface(iface) => Ok(iface),
            Member::Field(_) => Err(Error::TypeMismatch {
                key: self.fq_key(key),
                expected: "interface".to_string(),
            }),
        }
    }

    /// Whether a field or nested interface is bound at `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.state().members.contains_key(key)
    }

    fn route(&self, key: &str) -> (String, StoreHandle) {
        let state = self.state();
        (key::qualify(&state.prefix, key), Rc::clone(&state.store))
    }

    pub(crate) fn load(&self, key: &str) -> Result<Option<String>> {
        let (fq_key, store) = self.route(key);
        let value = store.borrow().get(&fq_key);
        value
    }

    pub(crate) fn store(&self, key: &str, encoded: String) -> Result<()> {
        let (fq_key, store) = self.route(key);
        let result = store.borrow_mut().set(&fq_key, encoded);
        result
    }

    /// The encoded string stored for field `key`, bypassing codec and checker.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.field_member(key)?;
        self.load(key)
    }

    /// Store an already-encoded string for field `key`, bypassing codec and
    /// checker.
    pub fn set_raw(&self, key: &str, encoded: String) -> Result<()> {
        self.field_member(key)?;
        self.store(key, encoded)
    }

    /// Whether anything is stored for field `key` (defaults do not count).
    pub fn has_value(&self, key: &str) -> Result<bool> {
        Ok(self.get_raw(key)?.is_some())
    }

    /// Keyed read of a local member.
    ///
    /// Fields are read through their codec and checker; nested interfaces
    /// are returned as themselves. Dots are not traversed; use
    /// [`Interface::child`] to walk down.
    pub fn get(&self, key: &str) -> Result<Item> {
        match self.member(key)? {
            Member::Field(field) => Ok(Item::Value(field.read_json(self)?)),
            Member::Interface(iface) => Ok(Item::Interface(iface)),
        }
    }

    /// Keyed write of a local field.
    ///
    /// `null` is the unset value for fields whose type has no null of its
    /// own: writing it is a no-op, as with [`Field::write`] and `None`.
    pub fn set(&self, key: &str, value: Json) -> Result<()> {
        self.field_member(key)?.write_json(self, Some(value))
    }

    /// Typed keyed read.
    pub fn read_as<T: FieldType>(&self, key: &str) -> Result<Option<T>> {
        self.typed_field::<T>(key)?.read(self)
    }

    /// Typed keyed write.
    pub fn write_as<T: FieldType>(&self, key: &str, value: T) -> Result<()> {
        self.typed_field::<T>(key)?.set(self, value)
    }

    /// Remove the stored value of field `key`.
    ///
    /// Fails with [`Error::NotFound`] if nothing is stored.
    pub fn clear(&self, key: &str) -> Result<()> {
        self.field_member(key)?;
        let (fq_key, store) = self.route(key);
        let result = store.borrow_mut().delete(&fq_key);
        result
    }

    /// Remove every stored value of this node and its descendants.
    /// Fields with nothing stored are skipped.
    pub fn clear_all(&self) -> Result<()> {
        self.clear_all_at(0)
    }

    fn clear_all_at(&self, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::DepthExceeded { limit: MAX_DEPTH });
        }
        for (key, member) in self.members() {
            match member {
                Member::Field(_) => {
                    if self.load(&key)?.is_some() {
                        self.clear(&key)?;
                    }
                }
                Member::Interface(child) => {
                    if !self.is_self_or_root(&child) {
                        child.clear_all_at(depth + 1)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Local member names, excluding any member that is this node or the
    /// tree root.
    pub fn get_keys(&self) -> Vec<String> {
        self.members()
            .into_iter()
            .filter(|(_, member)| match member {
                Member::Interface(child) => !self.is_self_or_root(child),
                Member::Field(_) => true,
            })
            .map(|(key, _)| key)
            .collect()
    }

    /// Fully-qualified keys of every field, expanding nested interfaces.
    ///
    /// Expansion stops at [`MAX_DEPTH`]; an interface at the limit is listed
    /// by its own key.
    pub fn get_all_keys(&self) -> Vec<String> {
        self.collect_keys(MAX_DEPTH)
    }

    fn collect_keys(&self, depth: usize) -> Vec<String> {
        let mut keys = Vec::new();
        for (key, member) in self.members() {
            match member {
                Member::Field(_) => keys.push(self.fq_key(&key)),
                Member::Interface(child) => {
                    if self.is_self_or_root(&child) {
                        continue;
                    }
                    if depth > 0 {
                        keys.extend(child.collect_keys(depth - 1));
                    } else {
                        keys.push(self.fq_key(&key));
                    }
                }
            }
        }
        keys
    }

    /// `(key, item)` for every local member. Reads every field eagerly.
    pub fn get_items(&self) -> Result<Vec<(String, Item)>> {
        self.get_keys()
            .into_iter()
            .map(|key| {
                let item = self.get(&key)?;
                Ok((key, item))
            })
            .collect()
    }

    /// Apply several keyed writes in order. Stops at the first failure;
    /// earlier writes stay applied.
    pub fn update<K: AsRef<str>>(&self, values: impl IntoIterator<Item = (K, Json)>) -> Result<()> {
        for (key, value) in values {
            self.set(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Attach `child` under `key` and re-root it (and everything below it)
    /// into this tree.
    ///
    /// Without `force`, an occupied key is a [`Error::MountConflict`] and
    /// nothing changes. A child that is already bound somewhere is moved:
    /// its old binding is removed. Values the child stored under its old
    /// keys are not carried over: they stay where they were, unreachable
    /// through the child's new keys.
    pub fn mount(&self, key: &str, child: &Interface, force: bool) -> Result<()> {
        key::validate(key)?;
        if self.contains(key) && !force {
            log::debug!("refusing to mount {} over {}", child.name(), self.fq_key(key));
            return Err(Error::MountConflict {
                key: self.fq_key(key),
            });
        }
        if child.ptr_eq(self) || child.reaches(self, 0)? {
            return Err(Error::MountCycle {
                key: self.fq_key(key),
            });
        }

        let (root, store, prefix) = {
            let state = self.state();
            (
                state.root.clone(),
                Rc::clone(&state.store),
                key::qualify(&state.prefix, key),
            )
        };
        log::debug!("mounting {} at {}", child.name(), prefix);
        child.rebase(&root, &store, prefix, 0)?;
        child.detach();

        child.state_mut().parent = Some((Rc::downgrade(&self.node), key.to_string()));
        let replaced = self
            .state_mut()
            .members
            .insert(key.to_string(), Member::Interface(child.clone()));
        if let Some(Member::Interface(old)) = replaced {
            if !old.ptr_eq(child) {
                old.state_mut().parent = None;
            }
        }
        Ok(())
    }

    /// Remove this node's binding from its current parent, if any.
    fn detach(&self) {
        let Some((parent, key)) = self.state_mut().parent.take() else {
            return;
        };
        let Some(node) = parent.upgrade() else {
            return;
        };
        let parent = Interface { node };
        let bound_here = matches!(
            parent.state().members.get(&key),
            Some(Member::Interface(iface)) if iface.ptr_eq(self)
        );
        if bound_here {
            log::debug!("unbinding {} from {}", self.name(), parent.fq_key(&key));
            parent.state_mut().members.remove(&key);
        }
    }

    /// Whether `target` is somewhere below this node.
    fn reaches(&self, target: &Interface, depth: usize) -> Result<bool> {
        if depth > MAX_DEPTH {
            return Err(Error::DepthExceeded { limit: MAX_DEPTH });
        }
        for (_, member) in self.members() {
            if let Member::Interface(child) = member {
                if child.ptr_eq(target) {
                    return Ok(true);
                }
                if !self.is_self_or_root(&child) && child.reaches(target, depth + 1)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Point this node and every interface below it at a new root, store
    /// and prefix.
    fn rebase(&self, root: &Weak<Node>, store: &StoreHandle, prefix: String, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::DepthExceeded { limit: MAX_DEPTH });
        }

        let children: Vec<(String, Interface)> = {
            let mut state = self.state_mut();
            state.root = root.clone();
            state.store = Rc::clone(store);
            state.prefix = prefix.clone();
            state
                .members
                .iter()
                .filter_map(|(key, member)| match member {
                    Member::Interface(child) => Some((key.clone(), child.clone())),
                    Member::Field(_) => None,
                })
                .collect()
        };

        for (key, child) in children {
            if child.ptr_eq(self) || std::ptr::eq(root.as_ptr(), Rc::as_ptr(&child.node)) {
                continue;
            }
            child.rebase(root, store, key::qualify(&prefix, &key), depth + 1)?;
        }
        Ok(())
    }

    /// Describe this interface and its members.
    ///
    /// With `show_values`, every readable field also reports its live
    /// decoded value (unset shows as null).
    pub fn get_doc(&self, show_values: bool) -> Result<InterfaceDoc> {
        self.doc_at(show_values, 0)
    }

    fn doc_at(&self, show_values: bool, depth: usize) -> Result<InterfaceDoc> {
        if depth > MAX_DEPTH {
            return Err(Error::DepthExceeded { limit: MAX_DEPTH });
        }

        let mut values = BTreeMap::new();
        for (key, member) in self.members() {
            match member {
                Member::Field(field) => {
                    let mut doc = field.doc();
                    if show_values && field.access().can_read() {
                        doc.value = Some(field.read_json(self)?.unwrap_or(Json::Null));
                    }
                    values.insert(key, MemberDoc::Field(doc));
                }
                Member::Interface(child) => {
                    if self.is_self_or_root(&child) {
                        continue;
                    }
                    values.insert(key, MemberDoc::Interface(child.doc_at(show_values, depth + 1)?));
                }
            }
        }

        let schema = self.schema();
        Ok(InterfaceDoc {
            name: schema.name().to_string(),
            origin: schema.origin().to_string(),
            description: schema.description().to_string(),
            values,
        })
    }

    /// [`Interface::get_doc`] rendered as pretty JSON.
    pub fn doc_json(&self, show_values: bool) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.get_doc(show_values)?)?)
    }

    /// Whether the interface has what it needs. Interface types without a
    /// readiness predicate are never ready.
    pub fn is_ready(&self) -> Result<bool> {
        match self.schema().ready() {
            Some(ready) => ready(self),
            None => Ok(false),
        }
    }
}

impl PartialEq for Interface {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.name())
            .field("prefix", &self.prefix())
            .field("keys", &self.get_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Access, IntegerRange, ParseCodec, SharedStore, StringCodec};
    use collection_literals::btree;
    use serde_json::json;

    struct Fixture {
        host: Field<String>,
        port: Field<i64>,
        endpoint: Schema,
        service: Schema,
    }

    fn fixture() -> Fixture {
        let host = Field::new("String", StringCodec);
        let port = Field::new("Port", ParseCodec::<i64>::new())
            .with_default(0)
            .with_checker(IntegerRange::new(Some(0), Some(65535)));
        let endpoint = Schema::builder("Endpoint")
            .field("host", &host)
            .field("port", &port)
            .ready_when(|iface| iface.has_value("host"))
            .build()
            .unwrap();
        let service = Schema::builder("Service")
            .description("A service with one endpoint")
            .child("endpoint", &endpoint)
            .build()
            .unwrap();
        Fixture {
            host,
            port,
            endpoint,
            service,
        }
    }

    #[test]
    fn root_owns_the_store() {
        let fx = fixture();
        let store = SharedStore::new();
        let root = Interface::with_store(&fx.service, Box::new(store.clone()));
        let ep = root.child("endpoint").unwrap();

        assert!(root.is_root());
        assert!(!ep.is_root());
        assert!(ep.base().unwrap().ptr_eq(&root));
        assert_eq!(ep.prefix(), "endpoint");

        fx.port.set(&ep, 6817).unwrap();
        assert_eq!(
            store.snapshot(),
            btree! { "endpoint.port".to_string() => "6817".to_string() }
        );
    }

    #[test]
    fn keyed_access_matches_field_access() {
        let fx = fixture();
        let ep = Interface::new(&fx.endpoint);

        ep.set("host", json!("head0")).unwrap();
        assert_eq!(fx.host.read(&ep).unwrap().as_deref(), Some("head0"));
        assert_eq!(ep.get("port").unwrap(), Item::Value(Some(json!(0))));
        assert_eq!(ep.read_as::<i64>("port").unwrap(), Some(0));

        ep.write_as("port", 22_i64).unwrap();
        assert_eq!(ep.get("port").unwrap().into_value(), Some(json!(22)));
    }

    #[test]
    fn keyed_access_errors() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let ep = root.child("endpoint").unwrap();

        assert!(matches!(root.get("nope"), Err(Error::UnknownMember { .. })));
        assert!(matches!(
            root.set("endpoint", json!(1)),
            Err(Error::NotAField { .. })
        ));
        assert!(matches!(
            ep.set("port", json!("not a number")),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            ep.read_as::<String>("port"),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            ep.child("port"),
            Err(Error::TypeMismatch { .. })
        ));
        // Dotted keys are not traversed.
        assert!(matches!(
            root.get("endpoint.port"),
            Err(Error::UnknownMember { .. })
        ));
    }

    #[test]
    fn get_returns_child_interface_itself() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let item = root.get("endpoint").unwrap();
        assert!(item.as_interface().unwrap().ptr_eq(&root.child("endpoint").unwrap()));
        assert_eq!(item.value(), None);
    }

    #[test]
    fn contains_and_keys() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        assert!(root.contains("endpoint"));
        assert!(!root.contains("port"));
        assert_eq!(root.get_keys(), vec!["endpoint"]);
        assert_eq!(
            root.child("endpoint").unwrap().get_keys(),
            vec!["host", "port"]
        );
    }

    #[test]
    fn clear_removes_and_then_fails() {
        let fx = fixture();
        let ep = Interface::new(&fx.endpoint);
        fx.port.set(&ep, 80).unwrap();

        ep.clear("port").unwrap();
        assert_eq!(ep.get_raw("port").unwrap(), None);
        // Back to the default.
        assert_eq!(fx.port.read(&ep).unwrap(), Some(0));
        assert_eq!(
            ep.clear("port"),
            Err(Error::NotFound {
                key: "port".to_string()
            })
        );
    }

    #[test]
    fn clear_all_walks_the_tree() {
        let fx = fixture();
        let store = SharedStore::new();
        let root = Interface::with_store(&fx.service, Box::new(store.clone()));
        let ep = root.child("endpoint").unwrap();
        fx.host.set(&ep, "h".to_string()).unwrap();

        root.clear_all().unwrap();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn get_items_reads_eagerly() {
        let fx = fixture();
        let ep = Interface::new(&fx.endpoint);
        fx.host.set(&ep, "h".to_string()).unwrap();

        let items = ep.get_items().unwrap();
        assert_eq!(
            items,
            vec![
                ("host".to_string(), Item::Value(Some(json!("h")))),
                ("port".to_string(), Item::Value(Some(json!(0)))),
            ]
        );
    }

    #[test]
    fn update_applies_in_order_and_stops_on_failure() {
        let fx = fixture();
        let ep = Interface::new(&fx.endpoint);

        ep.update(btree! {
            "host".to_string() => json!("a"),
            "port".to_string() => json!(1),
        })
        .unwrap();
        assert_eq!(fx.port.read(&ep).unwrap(), Some(1));

        let err = ep
            .update(vec![("host", json!("b")), ("port", json!(70000))])
            .unwrap_err();
        assert!(err.is_check());
        assert_eq!(fx.host.read(&ep).unwrap().as_deref(), Some("b"));
        assert_eq!(fx.port.read(&ep).unwrap(), Some(1));
    }

    #[test]
    fn mount_re_roots_the_child() {
        let fx = fixture();
        let store = SharedStore::new();
        let root = Interface::with_store(&fx.service, Box::new(store.clone()));
        let extra = Interface::new(&fx.endpoint);
        assert!(extra.is_root());

        root.mount("backup", &extra, false).unwrap();
        assert!(!extra.is_root());
        assert_eq!(extra.prefix(), "backup");
        assert!(extra.base().unwrap().ptr_eq(&root));

        fx.port.set(&extra, 9000).unwrap();
        assert_eq!(
            store.snapshot().get("backup.port").map(String::as_str),
            Some("9000")
        );
        assert_eq!(
            root.get_all_keys(),
            vec!["backup.host", "backup.port", "endpoint.host", "endpoint.port"]
        );
    }

    #[test]
    fn mount_re_roots_nested_descendants() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let detached = Interface::new(&fx.service);
        let inner = detached.child("endpoint").unwrap();

        root.child("endpoint")
            .unwrap()
            .mount("peer", &detached, false)
            .unwrap();
        assert_eq!(inner.prefix(), "endpoint.peer.endpoint");
        assert!(inner.base().unwrap().ptr_eq(&root));

        fx.host.set(&inner, "x".to_string()).unwrap();
        assert_eq!(
            root.child("endpoint")
                .unwrap()
                .child("peer")
                .unwrap()
                .child("endpoint")
                .unwrap()
                .read_as::<String>("host")
                .unwrap()
                .as_deref(),
            Some("x")
        );
    }

    #[test]
    fn mount_conflict_leaves_original_untouched() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let original = root.child("endpoint").unwrap();
        fx.port.set(&original, 1234).unwrap();

        let intruder = Interface::new(&fx.endpoint);
        assert_eq!(
            root.mount("endpoint", &intruder, false),
            Err(Error::MountConflict {
                key: "endpoint".to_string()
            })
        );
        assert!(root.child("endpoint").unwrap().ptr_eq(&original));
        assert_eq!(original.prefix(), "endpoint");
        assert_eq!(fx.port.read(&original).unwrap(), Some(1234));
        assert!(intruder.is_root());
    }

    #[test]
    fn forced_mount_replaces_and_sees_existing_keys() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        fx.port.set(&root.child("endpoint").unwrap(), 1234).unwrap();

        let replacement = Interface::new(&fx.endpoint);
        root.mount("endpoint", &replacement, true).unwrap();
        assert!(root.child("endpoint").unwrap().ptr_eq(&replacement));
        // Same fully-qualified key, same store entry.
        assert_eq!(fx.port.read(&replacement).unwrap(), Some(1234));
    }

    #[test]
    fn mounting_does_not_migrate_values() {
        let fx = fixture();
        let store = SharedStore::new();
        let root = Interface::with_store(&fx.service, Box::new(store.clone()));
        let node = Interface::new(&fx.endpoint);

        root.mount("a", &node, false).unwrap();
        fx.port.set(&node, 1111).unwrap();
        assert_eq!(node.fq_key("port"), "a.port");

        root.mount("c", &node, false).unwrap();
        assert_eq!(node.fq_key("port"), "c.port");
        assert_eq!(fx.port.read(&node).unwrap(), Some(0));

        // The old entry stays in the store under its old key.
        assert_eq!(
            store.snapshot().get("a.port").map(String::as_str),
            Some("1111")
        );
    }

    #[test]
    fn remount_moves_the_binding() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let node = Interface::new(&fx.endpoint);

        root.mount("a", &node, false).unwrap();
        root.mount("c", &node, false).unwrap();

        assert_eq!(root.get_keys(), vec!["c", "endpoint"]);
        assert!(matches!(root.child("a"), Err(Error::UnknownMember { .. })));
        assert_eq!(
            root.get_all_keys(),
            vec!["c.host", "c.port", "endpoint.host", "endpoint.port"]
        );

        // Remounting under the same key again is a conflict, not a move.
        assert!(matches!(
            root.mount("c", &node, false),
            Err(Error::MountConflict { .. })
        ));
        assert!(root.child("c").unwrap().ptr_eq(&node));
    }

    #[test]
    fn moving_a_schema_child_unbinds_it_from_its_parent() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let ep = root.child("endpoint").unwrap();
        let other = Interface::new(&fx.service);

        other.mount("moved", &ep, false).unwrap();
        assert!(!root.contains("endpoint"));
        assert!(ep.base().unwrap().ptr_eq(&other));
        assert_eq!(ep.prefix(), "moved");

        // Mounting it back restores the original key.
        root.mount("endpoint", &ep, false).unwrap();
        assert!(!other.contains("moved"));
        assert_eq!(ep.fq_key("port"), "endpoint.port");
    }

    #[test]
    fn forced_replacement_leaves_the_old_child_detached() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let original = root.child("endpoint").unwrap();
        let replacement = Interface::new(&fx.endpoint);
        root.mount("endpoint", &replacement, true).unwrap();

        // Mounting the replaced node elsewhere must not unbind its successor.
        root.mount("spare", &original, false).unwrap();
        assert!(root.child("endpoint").unwrap().ptr_eq(&replacement));
        assert!(root.child("spare").unwrap().ptr_eq(&original));
    }

    #[test]
    fn keyed_null_is_unset() {
        let fx = fixture();
        let store = SharedStore::new();
        let ep = Interface::with_store(&fx.endpoint, Box::new(store.clone()));

        assert_eq!(ep.get("host").unwrap(), Item::Value(None));
        ep.set("host", Json::Null).unwrap();
        ep.set("port", Json::Null).unwrap();
        assert!(store.snapshot().is_empty());

        // What get_items reports can be written straight back.
        fx.port.set(&ep, 80).unwrap();
        let values: Vec<(String, Json)> = ep
            .get_items()
            .unwrap()
            .into_iter()
            .map(|(key, item)| (key, item.into_value().unwrap_or(Json::Null)))
            .collect();
        ep.update(values).unwrap();
        assert_eq!(
            store.snapshot(),
            btree! { "port".to_string() => "80".to_string() }
        );
    }

    #[test]
    fn mount_rejects_cycles() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let ep = root.child("endpoint").unwrap();

        assert!(matches!(
            root.mount("me", &root, false),
            Err(Error::MountCycle { .. })
        ));
        assert!(matches!(
            ep.mount("up", &root, false),
            Err(Error::MountCycle { .. })
        ));
    }

    #[test]
    fn mount_rejects_invalid_key() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let child = Interface::new(&fx.endpoint);
        assert!(matches!(
            root.mount("a.b", &child, false),
            Err(Error::InvalidKey { .. })
        ));
    }

    #[test]
    fn deep_mount_chain_is_bounded() {
        let leaf = Schema::builder("Leaf").build().unwrap();
        let top = Interface::new(&leaf);
        let mut current = top.clone();
        for _ in 0..MAX_DEPTH + 2 {
            let next = Interface::new(&leaf);
            current.mount("n", &next, false).unwrap();
            current = next;
        }
        // Expansion stops at the budget instead of recursing forever.
        let keys = top.get_all_keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].split('.').count() > MAX_DEPTH);
    }

    #[test]
    fn doc_lists_members_and_optionally_values() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        fx.port.set(&root.child("endpoint").unwrap(), 443).unwrap();

        let doc = root.get_doc(false).unwrap();
        assert_eq!(doc.name, "Service");
        assert_eq!(doc.description, "A service with one endpoint");
        let ep_doc = doc.interface("endpoint").unwrap();
        assert_eq!(ep_doc.field("port").unwrap().kind, "Port");
        assert_eq!(ep_doc.field("port").unwrap().value, None);

        let doc = root.get_doc(true).unwrap();
        let ep_doc = doc.interface("endpoint").unwrap();
        assert_eq!(ep_doc.field("port").unwrap().value, Some(json!(443)));
        assert_eq!(ep_doc.field("host").unwrap().value, Some(Json::Null));

        let text = root.doc_json(false).unwrap();
        assert!(text.contains("\"endpoint\""));
    }

    #[test]
    fn doc_skips_values_of_write_only_fields() {
        let secret = Field::new("String", StringCodec).with_access(Access::WRITE);
        let schema = Schema::builder("Secret").field("token", &secret).build().unwrap();
        let iface = Interface::new(&schema);
        secret.set(&iface, "s3cr3t".to_string()).unwrap();

        let doc = iface.get_doc(true).unwrap();
        assert_eq!(doc.field("token").unwrap().value, None);
        assert_eq!(doc.field("token").unwrap().access, Access::WRITE);
    }

    #[test]
    fn readiness() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let ep = root.child("endpoint").unwrap();

        assert!(!root.is_ready().unwrap());
        assert!(!ep.is_ready().unwrap());
        fx.host.set(&ep, "h".to_string()).unwrap();
        assert!(ep.is_ready().unwrap());
    }

    #[test]
    fn debug_shows_name_and_keys() {
        let fx = fixture();
        let root = Interface::new(&fx.service);
        let text = format!("{:?}", root);
        assert!(text.contains("Service"));
        assert!(text.contains("endpoint"));
    }
}
