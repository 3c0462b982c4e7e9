//! Delegate recovery for every wrapper kind
//!
//! View families need a privileged field handle, resolved at most once per
//! process and remembered even when resolution fails. Enum maps and
//! array-backed lists recover what they need from their contents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use opaq_format::{OpaqError, Result};
use opaq_graph::privileged::FieldHandle;
use opaq_graph::{Class, EnumType, ObjRef, Value, ViewFamily};

/// Lazily resolved delegate field of one view family
#[derive(Debug)]
pub struct DelegateAccessor {
    family: ViewFamily,
    handle: OnceLock<std::result::Result<FieldHandle, String>>,
    resolutions: AtomicUsize,
}

static SYNCHRONIZED: DelegateAccessor = DelegateAccessor::new(ViewFamily::Synchronized);
static UNMODIFIABLE: DelegateAccessor = DelegateAccessor::new(ViewFamily::Unmodifiable);

/// Process-wide accessor for `family`
pub fn accessor(family: ViewFamily) -> &'static DelegateAccessor {
    match family {
        ViewFamily::Synchronized => &SYNCHRONIZED,
        ViewFamily::Unmodifiable => &UNMODIFIABLE,
    }
}

impl DelegateAccessor {
    /// Unresolved accessor
    pub const fn new(family: ViewFamily) -> Self {
        Self {
            family,
            handle: OnceLock::new(),
            resolutions: AtomicUsize::new(0),
        }
    }

    /// Family whose delegate field this accessor reads
    pub fn family(&self) -> ViewFamily {
        self.family
    }

    /// Resolve the field handle on first use; later calls reuse the outcome
    pub fn handle(&self) -> Result<FieldHandle> {
        let outcome = self.handle.get_or_init(|| {
            self.resolutions.fetch_add(1, Ordering::SeqCst);
            FieldHandle::resolve(self.family).map_err(|e| {
                tracing::warn!(family = self.family.name(), error = %e, "delegate field unavailable");
                e.to_string()
            })
        });
        outcome.clone().map_err(OpaqError::AccessorInit)
    }

    /// Number of resolution attempts made so far (zero or one)
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    /// Hidden delegate of `instance`
    pub fn extract(&self, instance: &ObjRef) -> Result<ObjRef> {
        self.handle()?.get(instance)
    }
}

/// Key enumeration type of a non-empty enum map, read off its first key
pub fn enum_key_type(map: &ObjRef) -> Result<Arc<EnumType>> {
    let entries = map.entries()?;
    let (key, _) = entries.first().ok_or(OpaqError::EmptyEnumMap)?;
    key.as_enum()
        .map(|constant| Arc::clone(constant.declaring_type()))
        .ok_or_else(|| OpaqError::TypeMismatch {
            expected: "enum key".to_string(),
            found: key.class_name(),
        })
}

/// Best-effort component class of an array-backed list
///
/// Uses the class of the first element. An empty list, or one whose first
/// element is null, falls back to the component of its `to_array` copy.
pub fn as_list_component(list: &ObjRef) -> Result<Class> {
    let representative = match list.get(0) {
        Ok(Value::Null) | Err(OpaqError::IndexOutOfBounds { .. }) => None,
        Ok(first) => first.class(),
        Err(e) => return Err(e),
    };
    match representative {
        Some(class) => Ok(class),
        None => list
            .to_array()?
            .array_component()
            .cloned()
            .ok_or_else(|| OpaqError::TypeMismatch {
                expected: "array".to_string(),
                found: list.class().to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opaq_graph::{collections, Primitive};
    use rayon::prelude::*;

    #[test]
    fn test_racing_first_use_resolves_once() {
        let accessor = DelegateAccessor::new(ViewFamily::Synchronized);
        let inner = collections::array_list(vec![Value::Int(1)]);
        let view = collections::synchronized_list(&inner).unwrap();

        (0..64).into_par_iter().for_each(|_| {
            assert!(accessor.extract(&view).unwrap().ptr_eq(&inner));
        });
        assert_eq!(accessor.resolutions(), 1);
    }

    #[test]
    fn test_extract_rejects_other_family() {
        let view = collections::unmodifiable_set(&collections::hash_set(vec![])).unwrap();
        assert!(accessor(ViewFamily::Synchronized).extract(&view).is_err());
        assert!(accessor(ViewFamily::Unmodifiable).extract(&view).is_ok());
    }

    #[test]
    fn test_enum_key_type_needs_an_entry() {
        let vipers = EnumType::new("Vipers", ["SNAKE_CHARMER"]);
        let map = collections::enum_map(vipers.clone());
        assert!(matches!(enum_key_type(&map), Err(OpaqError::EmptyEnumMap)));

        map.put(vipers.constant(0).unwrap().into(), Value::Int(1)).unwrap();
        assert_eq!(enum_key_type(&map).unwrap(), vipers);
    }

    #[test]
    fn test_as_list_component_heuristic() {
        let ints = collections::array_of(
            Class::Primitive(Primitive::Int),
            vec![Value::Int(1), Value::Int(2)],
        )
        .unwrap();
        let list = collections::as_list(&ints).unwrap();
        assert_eq!(as_list_component(&list).unwrap(), Class::Integer);

        let empty = collections::as_list(&collections::new_array(Class::String, 0)).unwrap();
        assert_eq!(as_list_component(&empty).unwrap(), Class::String);

        let leading_null = collections::array_of(Class::Number, vec![Value::Null, Value::Long(3)])
            .unwrap();
        let list = collections::as_list(&leading_null).unwrap();
        assert_eq!(as_list_component(&list).unwrap(), Class::Number);
    }
}
