//! Runtime class descriptors

use std::fmt;
use std::sync::Arc;

/// Primitive array component types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    /// `boolean`
    Boolean,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `double`
    Double,
}

impl Primitive {
    /// Boxed class holding values of this primitive
    pub fn boxed(self) -> Class {
        match self {
            Primitive::Boolean => Class::Boolean,
            Primitive::Int => Class::Integer,
            Primitive::Long => Class::Long,
            Primitive::Double => Class::Double,
        }
    }

    /// Source-level name
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Double => "double",
        }
    }
}

/// Interface shape presented by a collection view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewShape {
    /// Plain collection, no positional access
    Collection,
    /// List over a random-access delegate
    RandomAccessList,
    /// List over a sequential delegate
    List,
    /// Set
    Set,
    /// Sorted set
    SortedSet,
    /// Map
    Map,
    /// Sorted map
    SortedMap,
}

impl ViewShape {
    /// Every shape, in catalogue order
    pub const ALL: [ViewShape; 7] = [
        ViewShape::Collection,
        ViewShape::RandomAccessList,
        ViewShape::List,
        ViewShape::Set,
        ViewShape::SortedSet,
        ViewShape::Map,
        ViewShape::SortedMap,
    ];

    /// Shape name as used in library class names
    pub fn name(self) -> &'static str {
        match self {
            ViewShape::Collection => "Collection",
            ViewShape::RandomAccessList => "RandomAccessList",
            ViewShape::List => "List",
            ViewShape::Set => "Set",
            ViewShape::SortedSet => "SortedSet",
            ViewShape::Map => "Map",
            ViewShape::SortedMap => "SortedMap",
        }
    }

    /// True for map shapes
    pub fn is_map(self) -> bool {
        matches!(self, ViewShape::Map | ViewShape::SortedMap)
    }
}

/// Family of a collection view produced by the library factories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewFamily {
    /// Every operation runs under the view's own monitor
    Synchronized,
    /// Read-only view; mutations are rejected
    Unmodifiable,
}

impl ViewFamily {
    /// Family name as used in library class names
    pub fn name(self) -> &'static str {
        match self {
            ViewFamily::Synchronized => "Synchronized",
            ViewFamily::Unmodifiable => "Unmodifiable",
        }
    }
}

/// Concrete classes only obtainable through the host library's factory functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LibraryClass {
    /// Fixed-size list view over an array (`as_list`)
    ArraysAsList,
    /// Synchronized or unmodifiable view over a delegate collection or map
    View(ViewFamily, ViewShape),
}

/// A user enumeration type: a name plus an ordered constant sequence
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumType {
    name: String,
    constants: Vec<String>,
}

impl EnumType {
    /// Declare an enumeration type
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        })
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of constants
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// True when the enumeration declares no constants
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Constant at `ordinal`
    pub fn constant(self: &Arc<Self>, ordinal: usize) -> Option<EnumConst> {
        (ordinal < self.constants.len()).then(|| EnumConst {
            ty: Arc::clone(self),
            ordinal,
        })
    }

    /// Constant named `name`
    pub fn constant_named(self: &Arc<Self>, name: &str) -> Option<EnumConst> {
        let ordinal = self.constants.iter().position(|c| c == name)?;
        self.constant(ordinal)
    }

    /// All constants in ordinal order
    pub fn values(self: &Arc<Self>) -> Vec<EnumConst> {
        (0..self.constants.len())
            .map(|ordinal| EnumConst {
                ty: Arc::clone(self),
                ordinal,
            })
            .collect()
    }
}

/// One constant of an [`EnumType`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumConst {
    ty: Arc<EnumType>,
    ordinal: usize,
}

impl EnumConst {
    /// The enumeration declaring this constant
    pub fn declaring_type(&self) -> &Arc<EnumType> {
        &self.ty
    }

    /// Position in the declaring type
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Constant name
    pub fn name(&self) -> &str {
        &self.ty.constants[self.ordinal]
    }
}

impl fmt::Display for EnumConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty.name, self.name())
    }
}

/// Exact runtime type of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Class {
    /// Boxed boolean
    Boolean,
    /// Boxed 32-bit integer
    Integer,
    /// Boxed 64-bit integer
    Long,
    /// Boxed double
    Double,
    /// Immutable string
    String,
    /// Root reference type; array component only
    Object,
    /// Abstract numeric supertype of the boxed numbers; array component only
    Number,
    /// Primitive; array component only
    Primitive(Primitive),
    /// Enumeration
    Enum(Arc<EnumType>),
    /// Fixed-length array of the component class
    Array(Box<Class>),
    /// Growable random-access list
    ArrayList,
    /// Sequential list
    LinkedList,
    /// Insertion-ordered hash set
    HashSet,
    /// Sorted set
    TreeSet,
    /// Insertion-ordered hash map
    HashMap,
    /// Sorted map
    TreeMap,
    /// Map keyed by the constants of one enumeration
    EnumMap,
    /// Factory-only library class
    Library(LibraryClass),
}

impl Class {
    /// Array class with the given component
    pub fn array_of(component: Class) -> Class {
        Class::Array(Box::new(component))
    }

    /// Synchronized or unmodifiable view class
    pub fn view(family: ViewFamily, shape: ViewShape) -> Class {
        Class::Library(LibraryClass::View(family, shape))
    }

    /// Component class of an array class
    pub fn component(&self) -> Option<&Class> {
        match self {
            Class::Array(component) => Some(component),
            _ => None,
        }
    }

    /// True for primitive component classes
    pub fn is_primitive(&self) -> bool {
        matches!(self, Class::Primitive(_))
    }

    /// Boxed equivalent of a primitive class; other classes are returned unchanged
    pub fn boxed(&self) -> Class {
        match self {
            Class::Primitive(p) => p.boxed(),
            other => other.clone(),
        }
    }

    /// True for classes that never describe a value directly
    pub fn is_abstract(&self) -> bool {
        matches!(self, Class::Object | Class::Number | Class::Primitive(_))
    }

    /// True for scalar value classes (no identity)
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Class::Boolean
                | Class::Integer
                | Class::Long
                | Class::Double
                | Class::String
                | Class::Enum(_)
        )
    }

    /// Family and shape of a view class
    pub fn view_parts(&self) -> Option<(ViewFamily, ViewShape)> {
        match self {
            Class::Library(LibraryClass::View(family, shape)) => Some((*family, *shape)),
            _ => None,
        }
    }

    fn view_shape(&self) -> Option<ViewShape> {
        self.view_parts().map(|(_, shape)| shape)
    }

    /// Lists support constant-time positional access
    pub fn is_random_access(&self) -> bool {
        matches!(
            self,
            Class::ArrayList | Class::Library(LibraryClass::ArraysAsList)
        ) || self.view_shape() == Some(ViewShape::RandomAccessList)
    }

    /// Instances are lists
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Class::ArrayList | Class::LinkedList | Class::Library(LibraryClass::ArraysAsList)
        ) || matches!(
            self.view_shape(),
            Some(ViewShape::RandomAccessList | ViewShape::List)
        )
    }

    /// Instances are sets
    pub fn is_set(&self) -> bool {
        matches!(self, Class::HashSet | Class::TreeSet)
            || matches!(self.view_shape(), Some(ViewShape::Set | ViewShape::SortedSet))
    }

    /// Instances are sorted sets
    pub fn is_sorted_set(&self) -> bool {
        matches!(self, Class::TreeSet) || self.view_shape() == Some(ViewShape::SortedSet)
    }

    /// Instances are collections (lists, sets or plain collection views)
    pub fn is_collection(&self) -> bool {
        self.is_list() || self.is_set() || self.view_shape() == Some(ViewShape::Collection)
    }

    /// Instances are maps
    pub fn is_map(&self) -> bool {
        matches!(self, Class::HashMap | Class::TreeMap | Class::EnumMap)
            || self.view_shape().is_some_and(ViewShape::is_map)
    }

    /// Instances are sorted maps
    pub fn is_sorted_map(&self) -> bool {
        matches!(self, Class::TreeMap) || self.view_shape() == Some(ViewShape::SortedMap)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::Boolean => f.write_str("Boolean"),
            Class::Integer => f.write_str("Integer"),
            Class::Long => f.write_str("Long"),
            Class::Double => f.write_str("Double"),
            Class::String => f.write_str("String"),
            Class::Object => f.write_str("Object"),
            Class::Number => f.write_str("Number"),
            Class::Primitive(p) => f.write_str(p.name()),
            Class::Enum(ty) => f.write_str(ty.name()),
            Class::Array(component) => write!(f, "{}[]", component),
            Class::ArrayList => f.write_str("ArrayList"),
            Class::LinkedList => f.write_str("LinkedList"),
            Class::HashSet => f.write_str("HashSet"),
            Class::TreeSet => f.write_str("TreeSet"),
            Class::HashMap => f.write_str("HashMap"),
            Class::TreeMap => f.write_str("TreeMap"),
            Class::EnumMap => f.write_str("EnumMap"),
            Class::Library(LibraryClass::ArraysAsList) => f.write_str("Arrays$ArrayList"),
            Class::Library(LibraryClass::View(family, shape)) => {
                write!(f, "Collections${}{}", family.name(), shape.name())
            }
        }
    }
}
