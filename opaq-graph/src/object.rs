//! Heap objects with identity and an intrinsic monitor
//!
//! Every object carries its exact [`Class`], a reentrant monitor and a body. The
//! body of a library view (its delegate) is private to this crate: outside code
//! can only observe a view through the collection operations below, or through
//! a field handle obtained from [`crate::privileged`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use opaq_format::{OpaqError, Result};
use parking_lot::{ReentrantMutex, RwLock};

use crate::class::{Class, EnumType, ViewFamily};
use crate::value::Value;

pub(crate) enum Body {
    Array(RwLock<Vec<Value>>),
    List(RwLock<Vec<Value>>),
    HashSet(RwLock<IndexSet<Value>>),
    TreeSet(RwLock<BTreeSet<Value>>),
    HashMap(RwLock<IndexMap<Value, Value>>),
    TreeMap(RwLock<BTreeMap<Value, Value>>),
    EnumMap {
        key_type: Arc<EnumType>,
        slots: RwLock<Vec<Option<Value>>>,
    },
    AsList {
        backing: ObjRef,
    },
    View {
        delegate: ObjRef,
    },
}

/// A heap object
pub struct Object {
    class: Class,
    monitor: ReentrantMutex<()>,
    body: Body,
}

/// Shared handle to a heap object; equality and hashing use identity
#[derive(Clone)]
pub struct ObjRef(Arc<Object>);

impl ObjRef {
    pub(crate) fn new(class: Class, body: Body) -> Self {
        ObjRef(Arc::new(Object {
            class,
            monitor: ReentrantMutex::new(()),
            body,
        }))
    }

    pub(crate) fn body(&self) -> &Body {
        &self.0.body
    }

    /// Exact runtime class
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    /// True when both handles refer to the same object
    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the object, stable while any handle is alive
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Run `f` while holding this object's monitor
    ///
    /// The monitor is reentrant and released when `f` returns or unwinds.
    pub fn synchronized<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.0.monitor.lock();
        f()
    }

    fn guarded<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.class().view_parts() {
            Some((ViewFamily::Synchronized, _)) => self.synchronized(f),
            _ => f(),
        }
    }

    fn check_mutable(&self, op: &str) -> Result<()> {
        match self.class().view_parts() {
            Some((ViewFamily::Unmodifiable, _)) => Err(self.unsupported(op)),
            _ => Ok(()),
        }
    }

    fn unsupported(&self, op: &str) -> OpaqError {
        OpaqError::UnsupportedOperation(format!("{} on {}", op, self.class()))
    }

    fn mismatch(&self, expected: &str) -> OpaqError {
        OpaqError::TypeMismatch {
            expected: expected.to_string(),
            found: self.class().to_string(),
        }
    }

    /// Number of elements, entries or array slots
    pub fn len(&self) -> usize {
        match self.body() {
            Body::Array(slots) | Body::List(slots) => slots.read().len(),
            Body::HashSet(set) => set.read().len(),
            Body::TreeSet(set) => set.read().len(),
            Body::HashMap(map) => map.read().len(),
            Body::TreeMap(map) => map.read().len(),
            Body::EnumMap { slots, .. } => slots.read().iter().filter(|s| s.is_some()).count(),
            Body::AsList { backing } => backing.len(),
            Body::View { delegate } => self.guarded(|| delegate.len()),
        }
    }

    /// True when [`ObjRef::len`] is zero
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Component class of an array
    pub fn array_component(&self) -> Option<&Class> {
        self.class().component()
    }

    /// Element at `index` of a list or array
    pub fn get(&self, index: usize) -> Result<Value> {
        match self.body() {
            Body::Array(slots) | Body::List(slots) => {
                let slots = slots.read();
                slots
                    .get(index)
                    .cloned()
                    .ok_or(OpaqError::IndexOutOfBounds {
                        index,
                        len: slots.len(),
                    })
            }
            Body::AsList { backing } => backing.get(index),
            Body::View { delegate } if self.class().is_list() => {
                self.guarded(|| delegate.get(index))
            }
            _ => Err(self.mismatch("list or array")),
        }
    }

    /// Replace the element at `index`, returning the previous one
    ///
    /// Arrays apply the store check against their component class; `as_list`
    /// views write through to their backing array.
    pub fn set(&self, index: usize, value: Value) -> Result<Value> {
        match self.body() {
            Body::Array(slots) => {
                let component = self.array_component().ok_or_else(|| self.mismatch("array"))?;
                if !value.is_instance_of(component) {
                    return Err(OpaqError::TypeMismatch {
                        expected: component.to_string(),
                        found: value.class_name(),
                    });
                }
                replace_slot(&mut slots.write(), index, value)
            }
            Body::List(slots) => replace_slot(&mut slots.write(), index, value),
            Body::AsList { backing } => backing.set(index, value),
            Body::View { delegate } if self.class().is_list() => {
                self.check_mutable("set")?;
                self.guarded(|| delegate.set(index, value))
            }
            _ => Err(self.mismatch("list or array")),
        }
    }

    /// Append to a list or insert into a set; returns whether the collection changed
    pub fn add(&self, value: Value) -> Result<bool> {
        match self.body() {
            Body::List(slots) => {
                slots.write().push(value);
                Ok(true)
            }
            Body::HashSet(set) => Ok(set.write().insert(value)),
            Body::TreeSet(set) => Ok(set.write().insert(value)),
            Body::Array(_) | Body::AsList { .. } => Err(self.unsupported("add")),
            Body::View { delegate } if self.class().is_collection() => {
                self.check_mutable("add")?;
                self.guarded(|| delegate.add(value))
            }
            _ => Err(self.mismatch("collection")),
        }
    }

    /// Remove an element from a collection, or a key from a map
    pub fn remove(&self, value: &Value) -> Result<bool> {
        match self.body() {
            Body::List(slots) => {
                let mut slots = slots.write();
                match slots.iter().position(|v| v == value) {
                    Some(pos) => {
                        slots.remove(pos);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            Body::HashSet(set) => Ok(set.write().shift_remove(value)),
            Body::TreeSet(set) => Ok(set.write().remove(value)),
            Body::HashMap(map) => Ok(map.write().shift_remove(value).is_some()),
            Body::TreeMap(map) => Ok(map.write().remove(value).is_some()),
            Body::EnumMap { key_type, slots } => match value {
                Value::Enum(key) if key.declaring_type() == key_type => {
                    Ok(slots.write()[key.ordinal()].take().is_some())
                }
                _ => Ok(false),
            },
            Body::Array(_) | Body::AsList { .. } => Err(self.unsupported("remove")),
            Body::View { delegate } => {
                self.check_mutable("remove")?;
                self.guarded(|| delegate.remove(value))
            }
        }
    }

    /// Element membership for collections and arrays, key membership for maps
    pub fn contains(&self, value: &Value) -> bool {
        match self.body() {
            Body::Array(slots) | Body::List(slots) => slots.read().contains(value),
            Body::HashSet(set) => set.read().contains(value),
            Body::TreeSet(set) => set.read().contains(value),
            Body::HashMap(map) => map.read().contains_key(value),
            Body::TreeMap(map) => map.read().contains_key(value),
            Body::EnumMap { key_type, slots } => match value {
                Value::Enum(key) if key.declaring_type() == key_type => {
                    slots.read()[key.ordinal()].is_some()
                }
                _ => false,
            },
            Body::AsList { backing } => backing.contains(value),
            Body::View { delegate } => self.guarded(|| delegate.contains(value)),
        }
    }

    /// Associate `value` with `key`, returning the previous value
    pub fn put(&self, key: Value, value: Value) -> Result<Option<Value>> {
        match self.body() {
            Body::HashMap(map) => Ok(map.write().insert(key, value)),
            Body::TreeMap(map) => Ok(map.write().insert(key, value)),
            Body::EnumMap { key_type, slots } => match &key {
                Value::Enum(k) if k.declaring_type() == key_type => {
                    Ok(slots.write()[k.ordinal()].replace(value))
                }
                _ => Err(OpaqError::TypeMismatch {
                    expected: key_type.name().to_string(),
                    found: key.class_name(),
                }),
            },
            Body::View { delegate } if self.class().is_map() => {
                self.check_mutable("put")?;
                self.guarded(|| delegate.put(key, value))
            }
            _ => Err(self.mismatch("map")),
        }
    }

    /// Value mapped to `key`
    pub fn lookup(&self, key: &Value) -> Result<Option<Value>> {
        match self.body() {
            Body::HashMap(map) => Ok(map.read().get(key).cloned()),
            Body::TreeMap(map) => Ok(map.read().get(key).cloned()),
            Body::EnumMap { key_type, slots } => Ok(match key {
                Value::Enum(k) if k.declaring_type() == key_type => {
                    slots.read()[k.ordinal()].clone()
                }
                _ => None,
            }),
            Body::View { delegate } if self.class().is_map() => {
                self.guarded(|| delegate.lookup(key))
            }
            _ => Err(self.mismatch("map")),
        }
    }

    /// Snapshot of the elements of a collection or array, in iteration order
    pub fn elements(&self) -> Result<Vec<Value>> {
        match self.body() {
            Body::Array(slots) | Body::List(slots) => Ok(slots.read().clone()),
            Body::HashSet(set) => Ok(set.read().iter().cloned().collect()),
            Body::TreeSet(set) => Ok(set.read().iter().cloned().collect()),
            Body::AsList { backing } => backing.elements(),
            Body::View { delegate } if self.class().is_collection() => {
                self.guarded(|| delegate.elements())
            }
            _ => Err(self.mismatch("collection or array")),
        }
    }

    /// Snapshot of the entries of a map, in iteration order
    pub fn entries(&self) -> Result<Vec<(Value, Value)>> {
        match self.body() {
            Body::HashMap(map) => Ok(map
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Body::TreeMap(map) => Ok(map
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Body::EnumMap { key_type, slots } => Ok(slots
                .read()
                .iter()
                .enumerate()
                .filter_map(|(ordinal, slot)| {
                    let value = slot.clone()?;
                    Some((Value::Enum(key_type.constant(ordinal)?), value))
                })
                .collect()),
            Body::View { delegate } if self.class().is_map() => {
                self.guarded(|| delegate.entries())
            }
            _ => Err(self.mismatch("map")),
        }
    }

    /// Fresh array holding the elements of this collection
    ///
    /// An `as_list` view yields an array with its backing array's component
    /// class; every other collection yields an `Object[]`.
    pub fn to_array(&self) -> Result<ObjRef> {
        match self.body() {
            Body::AsList { backing } => {
                let component = backing
                    .array_component()
                    .cloned()
                    .ok_or_else(|| backing.mismatch("array"))?;
                Ok(crate::collections::raw_array(component, backing.elements()?))
            }
            _ => Ok(crate::collections::raw_array(Class::Object, self.elements()?)),
        }
    }

    pub(crate) fn enum_key_type(&self) -> Option<&Arc<EnumType>> {
        match self.body() {
            Body::EnumMap { key_type, .. } => Some(key_type),
            _ => None,
        }
    }

    pub(crate) fn view_delegate(&self) -> Option<&ObjRef> {
        match self.body() {
            Body::View { delegate } => Some(delegate),
            _ => None,
        }
    }
}

fn replace_slot(slots: &mut [Value], index: usize, value: Value) -> Result<Value> {
    let len = slots.len();
    let slot = slots
        .get_mut(index)
        .ok_or(OpaqError::IndexOutOfBounds { index, len })?;
    Ok(std::mem::replace(slot, value))
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.class(), self.id())
    }
}

impl PartialEq for ObjRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjRef {}

impl Hash for ObjRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl PartialOrd for ObjRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id().cmp(&other.id())
    }
}
