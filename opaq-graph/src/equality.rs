//! Structural equality over object graphs
//!
//! `==` on [`Value`] compares objects by identity. [`Value::deep_eq`] instead
//! walks both graphs: objects are equal when they have the same class and
//! structurally equal contents. Views compare their delegates. Sets and maps
//! are compared without regard to iteration order, since tree collections of
//! objects order by identity. Cycles are handled coinductively.

use ahash::AHashSet;

use crate::object::ObjRef;
use crate::value::Value;

impl Value {
    /// Structural equality across object graphs
    pub fn deep_eq(&self, other: &Value) -> bool {
        Comparator::default().values(self, other)
    }
}

#[derive(Default)]
struct Comparator {
    assumed: AHashSet<(usize, usize)>,
}

impl Comparator {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Ref(a), Value::Ref(b)) => self.objects(a, b),
            (a, b) => a == b,
        }
    }

    fn objects(&mut self, a: &ObjRef, b: &ObjRef) -> bool {
        if a.ptr_eq(b) {
            return true;
        }
        if a.class() != b.class() {
            return false;
        }
        let pair = (a.id(), b.id());
        if !self.assumed.insert(pair) {
            return true;
        }
        let equal = self.contents(a, b);
        if !equal {
            self.assumed.remove(&pair);
        }
        equal
    }

    fn contents(&mut self, a: &ObjRef, b: &ObjRef) -> bool {
        if let (Some(da), Some(db)) = (a.view_delegate(), b.view_delegate()) {
            return self.objects(da, db);
        }

        let class = a.class();
        if class.is_map() {
            if a.enum_key_type() != b.enum_key_type() {
                return false;
            }
            return match (a.entries(), b.entries()) {
                (Ok(ea), Ok(eb)) => self.unordered_entries(&ea, &eb),
                _ => false,
            };
        }

        match (a.elements(), b.elements()) {
            (Ok(ea), Ok(eb)) if class.is_set() => self.unordered(&ea, &eb),
            (Ok(ea), Ok(eb)) => {
                ea.len() == eb.len() && ea.iter().zip(&eb).all(|(x, y)| self.values(x, y))
            }
            _ => false,
        }
    }

    fn unordered(&mut self, a: &[Value], b: &[Value]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let mut unmatched: Vec<&Value> = b.iter().collect();
        for x in a {
            match unmatched.iter().position(|y| self.values(x, y)) {
                Some(pos) => {
                    unmatched.swap_remove(pos);
                }
                None => return false,
            }
        }
        true
    }

    fn unordered_entries(&mut self, a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let mut unmatched: Vec<&(Value, Value)> = b.iter().collect();
        for (ka, va) in a {
            let found = unmatched
                .iter()
                .position(|(kb, vb)| self.values(ka, kb) && self.values(va, vb));
            match found {
                Some(pos) => {
                    unmatched.swap_remove(pos);
                }
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::class::{Class, EnumType};
    use crate::collections;
    use crate::value::Value;

    #[test]
    fn test_distinct_lists_with_equal_contents() {
        let a = collections::array_list(vec!["foo".into(), Value::Int(1)]);
        let b = collections::array_list(vec!["foo".into(), Value::Int(1)]);
        assert_ne!(Value::from(a.clone()), Value::from(b.clone()));
        assert!(Value::from(a).deep_eq(&b.into()));
    }

    #[test]
    fn test_class_must_match() {
        let a = collections::array_list(vec!["foo".into()]);
        let b = collections::linked_list(vec!["foo".into()]);
        assert!(!Value::from(a).deep_eq(&b.into()));
    }

    #[test]
    fn test_views_compare_delegates() {
        let a = collections::synchronized_set(&collections::hash_set(vec!["x".into()])).unwrap();
        let b = collections::synchronized_set(&collections::hash_set(vec!["x".into()])).unwrap();
        let c = collections::unmodifiable_set(&collections::hash_set(vec!["x".into()])).unwrap();
        assert!(Value::from(a.clone()).deep_eq(&b.into()));
        assert!(!Value::from(a).deep_eq(&c.into()));
    }

    #[test]
    fn test_enum_maps_compare_key_type() {
        let vipers = EnumType::new("Vipers", ["SNAKE_CHARMER"]);
        let colors = EnumType::new("Colors", ["BLUE"]);
        let a = collections::enum_map(vipers.clone());
        let b = collections::enum_map(colors);
        assert!(!Value::from(a.clone()).deep_eq(&b.into()));
        assert!(Value::from(a).deep_eq(&collections::enum_map(vipers).into()));
    }

    #[test]
    fn test_sets_of_objects_ignore_order() {
        let a1 = collections::array_list(vec![Value::Int(1)]);
        let a2 = collections::array_list(vec![Value::Int(2)]);
        let b1 = collections::array_list(vec![Value::Int(1)]);
        let b2 = collections::array_list(vec![Value::Int(2)]);
        let a = collections::tree_set(vec![a1.into(), a2.into()]);
        let b = collections::tree_set(vec![b2.into(), b1.into()]);
        assert!(Value::from(a).deep_eq(&b.into()));
    }

    #[test]
    fn test_cycles_terminate() {
        let a = collections::array_list(vec![]);
        a.add(a.clone().into()).unwrap();
        let b = collections::array_list(vec![]);
        b.add(b.clone().into()).unwrap();
        assert!(Value::from(a).deep_eq(&b.into()));
    }

    #[test]
    fn test_arrays_compare_component() {
        let a = collections::array_of(Class::Object, vec!["x".into()]).unwrap();
        let b = collections::array_of(Class::String, vec!["x".into()]).unwrap();
        assert!(!Value::from(a).deep_eq(&b.into()));
    }
}
