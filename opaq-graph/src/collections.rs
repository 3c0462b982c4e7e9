//! Host collection library
//!
//! Constructors for the public collection classes plus the factory functions
//! that produce the library's opaque classes: fixed-size list views over arrays
//! and synchronized / unmodifiable views over collections and maps. The factory
//! functions are the only way to obtain those classes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use opaq_format::{OpaqError, Result};
use parking_lot::RwLock;

use crate::class::{Class, EnumType, LibraryClass, ViewFamily, ViewShape};
use crate::object::{Body, ObjRef};
use crate::value::Value;

pub(crate) fn raw_array(component: Class, values: Vec<Value>) -> ObjRef {
    ObjRef::new(Class::array_of(component), Body::Array(RwLock::new(values)))
}

/// Allocate an array of `len` default slots (zero for primitives, null otherwise)
pub fn new_array(component: Class, len: usize) -> ObjRef {
    let fill = Value::default_for(&component);
    raw_array(component, vec![fill; len])
}

/// Allocate an array holding `values`, applying the store check to each
pub fn array_of(component: Class, values: Vec<Value>) -> Result<ObjRef> {
    if let Some(bad) = values.iter().find(|v| !v.is_instance_of(&component)) {
        return Err(OpaqError::TypeMismatch {
            expected: component.to_string(),
            found: bad.class_name(),
        });
    }
    Ok(raw_array(component, values))
}

/// Growable random-access list
pub fn array_list(values: impl IntoIterator<Item = Value>) -> ObjRef {
    ObjRef::new(
        Class::ArrayList,
        Body::List(RwLock::new(values.into_iter().collect())),
    )
}

/// Sequential list
pub fn linked_list(values: impl IntoIterator<Item = Value>) -> ObjRef {
    ObjRef::new(
        Class::LinkedList,
        Body::List(RwLock::new(values.into_iter().collect())),
    )
}

/// Insertion-ordered hash set
pub fn hash_set(values: impl IntoIterator<Item = Value>) -> ObjRef {
    ObjRef::new(
        Class::HashSet,
        Body::HashSet(RwLock::new(values.into_iter().collect::<IndexSet<_>>())),
    )
}

/// Sorted set
pub fn tree_set(values: impl IntoIterator<Item = Value>) -> ObjRef {
    ObjRef::new(
        Class::TreeSet,
        Body::TreeSet(RwLock::new(values.into_iter().collect::<BTreeSet<_>>())),
    )
}

/// Insertion-ordered hash map
pub fn hash_map(entries: impl IntoIterator<Item = (Value, Value)>) -> ObjRef {
    ObjRef::new(
        Class::HashMap,
        Body::HashMap(RwLock::new(entries.into_iter().collect::<IndexMap<_, _>>())),
    )
}

/// Sorted map
pub fn tree_map(entries: impl IntoIterator<Item = (Value, Value)>) -> ObjRef {
    ObjRef::new(
        Class::TreeMap,
        Body::TreeMap(RwLock::new(entries.into_iter().collect::<BTreeMap<_, _>>())),
    )
}

/// Empty map keyed by the constants of `key_type`
pub fn enum_map(key_type: Arc<EnumType>) -> ObjRef {
    let slots = vec![None; key_type.len()];
    ObjRef::new(
        Class::EnumMap,
        Body::EnumMap {
            key_type,
            slots: RwLock::new(slots),
        },
    )
}

/// Shallow copy of an enum map, keeping its key type even when it is empty
pub fn enum_map_copy_of(map: &ObjRef) -> Result<ObjRef> {
    let key_type = map.enum_key_type().ok_or_else(|| OpaqError::TypeMismatch {
        expected: Class::EnumMap.to_string(),
        found: map.class().to_string(),
    })?;
    let copy = enum_map(Arc::clone(key_type));
    for (key, value) in map.entries()? {
        copy.put(key, value)?;
    }
    Ok(copy)
}

/// Empty instance of a public collection or map class
pub fn new_collection(class: &Class) -> Result<ObjRef> {
    match class {
        Class::ArrayList => Ok(array_list(Vec::new())),
        Class::LinkedList => Ok(linked_list(Vec::new())),
        Class::HashSet => Ok(hash_set(Vec::new())),
        Class::TreeSet => Ok(tree_set(Vec::new())),
        Class::HashMap => Ok(hash_map(Vec::new())),
        Class::TreeMap => Ok(tree_map(Vec::new())),
        other => Err(OpaqError::UnsupportedOperation(format!(
            "no public constructor for {}",
            other
        ))),
    }
}

/// Fixed-size list view over `array`; `set` writes through, add/remove are rejected
pub fn as_list(array: &ObjRef) -> Result<ObjRef> {
    if array.array_component().is_none() {
        return Err(OpaqError::TypeMismatch {
            expected: "array".to_string(),
            found: array.class().to_string(),
        });
    }
    Ok(ObjRef::new(
        Class::Library(LibraryClass::ArraysAsList),
        Body::AsList {
            backing: array.clone(),
        },
    ))
}

fn view(family: ViewFamily, shape: ViewShape, delegate: &ObjRef) -> ObjRef {
    ObjRef::new(
        Class::view(family, shape),
        Body::View {
            delegate: delegate.clone(),
        },
    )
}

fn require(delegate: &ObjRef, ok: bool, expected: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(OpaqError::TypeMismatch {
            expected: expected.to_string(),
            found: delegate.class().to_string(),
        })
    }
}

fn list_shape(list: &ObjRef) -> Result<ViewShape> {
    require(list, list.class().is_list(), "list")?;
    Ok(if list.class().is_random_access() {
        ViewShape::RandomAccessList
    } else {
        ViewShape::List
    })
}

fn wrap_collection(family: ViewFamily, c: &ObjRef) -> Result<ObjRef> {
    require(c, c.class().is_collection(), "collection")?;
    Ok(view(family, ViewShape::Collection, c))
}

fn wrap_list(family: ViewFamily, list: &ObjRef) -> Result<ObjRef> {
    let shape = list_shape(list)?;
    Ok(view(family, shape, list))
}

fn wrap_set(family: ViewFamily, set: &ObjRef) -> Result<ObjRef> {
    require(set, set.class().is_set(), "set")?;
    Ok(view(family, ViewShape::Set, set))
}

fn wrap_sorted_set(family: ViewFamily, set: &ObjRef) -> Result<ObjRef> {
    require(set, set.class().is_sorted_set(), "sorted set")?;
    Ok(view(family, ViewShape::SortedSet, set))
}

fn wrap_map(family: ViewFamily, map: &ObjRef) -> Result<ObjRef> {
    require(map, map.class().is_map(), "map")?;
    Ok(view(family, ViewShape::Map, map))
}

fn wrap_sorted_map(family: ViewFamily, map: &ObjRef) -> Result<ObjRef> {
    require(map, map.class().is_sorted_map(), "sorted map")?;
    Ok(view(family, ViewShape::SortedMap, map))
}

/// Synchronized view over any collection
pub fn synchronized_collection(c: &ObjRef) -> Result<ObjRef> {
    wrap_collection(ViewFamily::Synchronized, c)
}

/// Synchronized view over a list; random-access delegates yield the random-access class
pub fn synchronized_list(list: &ObjRef) -> Result<ObjRef> {
    wrap_list(ViewFamily::Synchronized, list)
}

/// Synchronized view over a set
pub fn synchronized_set(set: &ObjRef) -> Result<ObjRef> {
    wrap_set(ViewFamily::Synchronized, set)
}

/// Synchronized view over a sorted set
pub fn synchronized_sorted_set(set: &ObjRef) -> Result<ObjRef> {
    wrap_sorted_set(ViewFamily::Synchronized, set)
}

/// Synchronized view over a map
pub fn synchronized_map(map: &ObjRef) -> Result<ObjRef> {
    wrap_map(ViewFamily::Synchronized, map)
}

/// Synchronized view over a sorted map
pub fn synchronized_sorted_map(map: &ObjRef) -> Result<ObjRef> {
    wrap_sorted_map(ViewFamily::Synchronized, map)
}

/// Read-only view over any collection
pub fn unmodifiable_collection(c: &ObjRef) -> Result<ObjRef> {
    wrap_collection(ViewFamily::Unmodifiable, c)
}

/// Read-only view over a list; random-access delegates yield the random-access class
pub fn unmodifiable_list(list: &ObjRef) -> Result<ObjRef> {
    wrap_list(ViewFamily::Unmodifiable, list)
}

/// Read-only view over a set
pub fn unmodifiable_set(set: &ObjRef) -> Result<ObjRef> {
    wrap_set(ViewFamily::Unmodifiable, set)
}

/// Read-only view over a sorted set
pub fn unmodifiable_sorted_set(set: &ObjRef) -> Result<ObjRef> {
    wrap_sorted_set(ViewFamily::Unmodifiable, set)
}

/// Read-only view over a map
pub fn unmodifiable_map(map: &ObjRef) -> Result<ObjRef> {
    wrap_map(ViewFamily::Unmodifiable, map)
}

/// Read-only view over a sorted map
pub fn unmodifiable_sorted_map(map: &ObjRef) -> Result<ObjRef> {
    wrap_sorted_map(ViewFamily::Unmodifiable, map)
}
