//! OPAQ Test Utilities
//!
//! Shared fixtures for tests and benches: sample enum types, value builders
//! and one ready-made wrapper per catalogue kind.

use std::sync::Arc;

use opaq_graph::collections;
use opaq_graph::{Engine, EngineConfig, EnumType, ObjRef, Value, ViewFamily, ViewShape};

/// Install a test-writer tracing subscriber; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .try_init();
}

/// Snake enumeration used as enum-map keys
pub fn vipers() -> Arc<EnumType> {
    EnumType::new(
        "Vipers",
        ["SNAKE_CHARMER", "BLACK_MAMBA", "COPPERHEAD", "GREEN_MAMBA"],
    )
}

/// A second, unrelated enumeration
pub fn colors() -> Arc<EnumType> {
    EnumType::new("Colors", ["BLUE", "BROWN", "GREEN"])
}

/// Engine with the fixture enums registered, before any wrapper codec
pub fn engine_with_enums(config: EngineConfig) -> Engine {
    let mut engine = Engine::new(config);
    engine.register_enum(vipers());
    engine.register_enum(colors());
    engine
}

/// String values
pub fn strings(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::from(*s)).collect()
}

/// Builder for collection and map delegates
#[derive(Debug, Default)]
pub struct DelegateBuilder {
    elements: Vec<Value>,
    entries: Vec<(Value, Value)>,
}

impl DelegateBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection element
    pub fn element(mut self, value: impl Into<Value>) -> Self {
        self.elements.push(value.into());
        self
    }

    /// Add a map entry
    pub fn entry(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Delegate whose class a factory of `shape` accepts and maps back to `shape`
    pub fn build(self, shape: ViewShape) -> ObjRef {
        match shape {
            ViewShape::Collection | ViewShape::Set => collections::hash_set(self.elements),
            ViewShape::RandomAccessList => collections::array_list(self.elements),
            ViewShape::List => collections::linked_list(self.elements),
            ViewShape::SortedSet => collections::tree_set(self.elements),
            ViewShape::Map => collections::hash_map(self.entries),
            ViewShape::SortedMap => collections::tree_map(self.entries),
        }
    }
}

/// Sample delegate for `shape` holding a few strings (or string entries)
pub fn sample_delegate(shape: ViewShape) -> ObjRef {
    DelegateBuilder::new()
        .element("foo")
        .element("bar")
        .entry("foo", "bar")
        .entry("baz", Value::Int(7))
        .build(shape)
}

/// Wrap `delegate` with the factory of `family` for `shape`
pub fn wrap(family: ViewFamily, shape: ViewShape, delegate: &ObjRef) -> opaq_graph::Result<ObjRef> {
    match (family, shape) {
        (ViewFamily::Synchronized, ViewShape::Collection) => {
            collections::synchronized_collection(delegate)
        }
        (ViewFamily::Synchronized, ViewShape::RandomAccessList | ViewShape::List) => {
            collections::synchronized_list(delegate)
        }
        (ViewFamily::Synchronized, ViewShape::Set) => collections::synchronized_set(delegate),
        (ViewFamily::Synchronized, ViewShape::SortedSet) => {
            collections::synchronized_sorted_set(delegate)
        }
        (ViewFamily::Synchronized, ViewShape::Map) => collections::synchronized_map(delegate),
        (ViewFamily::Synchronized, ViewShape::SortedMap) => {
            collections::synchronized_sorted_map(delegate)
        }
        (ViewFamily::Unmodifiable, ViewShape::Collection) => {
            collections::unmodifiable_collection(delegate)
        }
        (ViewFamily::Unmodifiable, ViewShape::RandomAccessList | ViewShape::List) => {
            collections::unmodifiable_list(delegate)
        }
        (ViewFamily::Unmodifiable, ViewShape::Set) => collections::unmodifiable_set(delegate),
        (ViewFamily::Unmodifiable, ViewShape::SortedSet) => {
            collections::unmodifiable_sorted_set(delegate)
        }
        (ViewFamily::Unmodifiable, ViewShape::Map) => collections::unmodifiable_map(delegate),
        (ViewFamily::Unmodifiable, ViewShape::SortedMap) => {
            collections::unmodifiable_sorted_map(delegate)
        }
    }
}

/// Every (family, shape) pair with a sample wrapper over [`sample_delegate`]
pub fn sample_wrappers() -> Vec<(ViewFamily, ViewShape, ObjRef)> {
    let mut out = Vec::new();
    for family in [ViewFamily::Synchronized, ViewFamily::Unmodifiable] {
        for shape in ViewShape::ALL {
            if let Ok(wrapper) = wrap(family, shape, &sample_delegate(shape)) {
                out.push((family, shape, wrapper));
            }
        }
    }
    out
}
