//! Dynamically typed values

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::class::{Class, EnumConst, Primitive};
use crate::object::ObjRef;

/// A value in the object graph
///
/// Scalars are compared by content. `Ref` values are compared by object identity,
/// which is what hash-based and sorted collections key on; use
/// [`Value::deep_eq`] for structural comparison.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent reference
    Null,
    /// Boxed boolean
    Bool(bool),
    /// Boxed 32-bit integer
    Int(i32),
    /// Boxed 64-bit integer
    Long(i64),
    /// Boxed double
    Double(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Enumeration constant
    Enum(EnumConst),
    /// Heap object with identity
    Ref(ObjRef),
}

impl Value {
    /// String value
    pub fn str(s: impl Into<Arc<str>>) -> Value {
        Value::Str(s.into())
    }

    /// Runtime class, `None` for null
    pub fn class(&self) -> Option<Class> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(Class::Boolean),
            Value::Int(_) => Some(Class::Integer),
            Value::Long(_) => Some(Class::Long),
            Value::Double(_) => Some(Class::Double),
            Value::Str(_) => Some(Class::String),
            Value::Enum(c) => Some(Class::Enum(Arc::clone(c.declaring_type()))),
            Value::Ref(obj) => Some(obj.class().clone()),
        }
    }

    /// Display name of the runtime class
    pub fn class_name(&self) -> String {
        self.class()
            .map_or_else(|| "null".to_string(), |class| class.to_string())
    }

    /// True for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Referenced object, if any
    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Ref(obj) => Some(obj),
            _ => None,
        }
    }

    /// String contents, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Enumeration constant, if any
    pub fn as_enum(&self) -> Option<&EnumConst> {
        match self {
            Value::Enum(c) => Some(c),
            _ => None,
        }
    }

    /// Array store check: may this value be stored in a slot typed `class`
    pub fn is_instance_of(&self, class: &Class) -> bool {
        match (class, self) {
            (Class::Primitive(p), value) => matches!(
                (p, value),
                (Primitive::Boolean, Value::Bool(_))
                    | (Primitive::Int, Value::Int(_))
                    | (Primitive::Long, Value::Long(_))
                    | (Primitive::Double, Value::Double(_))
            ),
            (_, Value::Null) => true,
            (Class::Object, _) => true,
            (Class::Number, value) => {
                matches!(value, Value::Int(_) | Value::Long(_) | Value::Double(_))
            }
            (class, value) => value.class().as_ref() == Some(class),
        }
    }

    /// Default slot value for an array component
    pub(crate) fn default_for(component: &Class) -> Value {
        match component {
            Class::Primitive(Primitive::Boolean) => Value::Bool(false),
            Class::Primitive(Primitive::Int) => Value::Int(0),
            Class::Primitive(Primitive::Long) => Value::Long(0),
            Class::Primitive(Primitive::Double) => Value::Double(0.0),
            _ => Value::Null,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Long(_) => 3,
            Value::Double(_) => 4,
            Value::Str(_) => 5,
            Value::Enum(_) => 6,
            Value::Ref(_) => 7,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
            (Value::Ref(a), Value::Ref(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Long(l) => l.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Enum(c) => c.hash(state),
            Value::Ref(obj) => obj.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v.into())
    }
}

impl From<EnumConst> for Value {
    fn from(v: EnumConst) -> Self {
        Value::Enum(v)
    }
}

impl From<ObjRef> for Value {
    fn from(v: ObjRef) -> Self {
        Value::Ref(v)
    }
}
