//! The object-graph serialization engine
//!
//! [`Engine`] owns a class registry that assigns every registered class a stable
//! wire id and maps it to the [`Serializer`] responsible for its instances.
//! Scalars, enums and arrays are handled by the engine itself; collections and
//! maps get default serializers at construction; everything else must be
//! registered. Writer and reader must register the same classes in the same
//! order, since ids are handed out sequentially.

use std::sync::Arc;

use ahash::AHashMap;
use bytes::Bytes;
use opaq_format::constants::FIRST_REGISTERED_CLASS;
use opaq_format::{Limits, OpaqError, Result};
use serde::Deserialize;

use crate::builtin::{ArraySerializer, CollectionSerializer, MapSerializer};
use crate::class::{Class, EnumType};
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::object::ObjRef;
use crate::value::Value;

/// Per-class codec plugged into the engine
pub trait Serializer: Send + Sync {
    /// Write the body of `obj`; the class descriptor and reference marker are already written
    fn write(&self, ctx: &mut WriteContext<'_>, obj: &ObjRef) -> Result<()>;

    /// Read the body of an instance of `class`
    fn read(&self, ctx: &mut ReadContext<'_>, class: &Class) -> Result<ObjRef>;

    /// Deep-copy `original`, copying nested values through `ctx`
    fn copy(&self, ctx: &mut CopyContext<'_>, original: &ObjRef) -> Result<ObjRef>;
}

/// Anything that can bind classes to serializers
pub trait RegistrationTarget {
    /// Bind `class` to `serializer`
    fn register(&mut self, class: Class, serializer: Arc<dyn Serializer>) -> Result<()>;
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Track object identity so shared and cyclic references survive encode and copy
    pub references: bool,
    /// Security limits
    pub limits: Limits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            references: true,
            limits: Limits::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone)]
pub(crate) enum Handler {
    Enum(Arc<EnumType>),
    Serializer(Arc<dyn Serializer>),
}

struct Registration {
    id: u64,
    handler: Handler,
}

/// Reference-tracking object-graph serializer
pub struct Engine {
    config: EngineConfig,
    by_class: AHashMap<Class, Registration>,
    by_id: Vec<Class>,
    arrays: Arc<dyn Serializer>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Engine with the default collection and map serializers registered
    pub fn new(config: EngineConfig) -> Self {
        let mut engine = Self {
            config,
            by_class: AHashMap::new(),
            by_id: Vec::new(),
            arrays: Arc::new(ArraySerializer),
        };

        let collections: Arc<dyn Serializer> = Arc::new(CollectionSerializer);
        let maps: Arc<dyn Serializer> = Arc::new(MapSerializer);
        for class in [
            Class::ArrayList,
            Class::LinkedList,
            Class::HashSet,
            Class::TreeSet,
        ] {
            engine.insert(class, Handler::Serializer(Arc::clone(&collections)));
        }
        for class in [Class::HashMap, Class::TreeMap] {
            engine.insert(class, Handler::Serializer(Arc::clone(&maps)));
        }
        engine
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active limits
    pub fn limits(&self) -> &Limits {
        &self.config.limits
    }

    fn insert(&mut self, class: Class, handler: Handler) -> u64 {
        if let Some(existing) = self.by_class.get_mut(&class) {
            existing.handler = handler;
            return existing.id;
        }
        let id = FIRST_REGISTERED_CLASS + self.by_id.len() as u64;
        tracing::debug!(class = %class, id, "registered class");
        self.by_id.push(class.clone());
        self.by_class.insert(class, Registration { id, handler });
        id
    }

    /// Bind `class` to `serializer`, returning its wire id
    ///
    /// Re-registering a class replaces its serializer and keeps its id.
    pub fn register(&mut self, class: Class, serializer: Arc<dyn Serializer>) -> Result<u64> {
        if class.is_scalar() || class.is_abstract() || class.component().is_some() {
            return Err(OpaqError::UnsupportedOperation(format!(
                "{} is handled by the engine and cannot be registered",
                class
            )));
        }
        Ok(self.insert(class, Handler::Serializer(serializer)))
    }

    /// Register an enumeration type, returning its wire id
    pub fn register_enum(&mut self, ty: Arc<EnumType>) -> u64 {
        self.insert(Class::Enum(Arc::clone(&ty)), Handler::Enum(ty))
    }

    /// True when `class` has a registration
    pub fn is_registered(&self, class: &Class) -> bool {
        self.by_class.contains_key(class)
    }

    /// Wire id of a registered class
    pub fn class_id(&self, class: &Class) -> Option<u64> {
        self.by_class.get(class).map(|r| r.id)
    }

    /// Registered classes in id order
    pub fn registered_classes(&self) -> &[Class] {
        &self.by_id
    }

    pub(crate) fn class_by_id(&self, id: u64) -> Result<&Class> {
        id.checked_sub(FIRST_REGISTERED_CLASS)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| self.by_id.get(idx))
            .ok_or(OpaqError::UnknownClassId(id))
    }

    pub(crate) fn handler(&self, class: &Class) -> Result<Handler> {
        if class.component().is_some() {
            return Ok(Handler::Serializer(Arc::clone(&self.arrays)));
        }
        self.by_class
            .get(class)
            .map(|r| r.handler.clone())
            .ok_or_else(|| OpaqError::UnregisteredClass(class.to_string()))
    }

    pub(crate) fn serializer_for(&self, class: &Class) -> Result<Arc<dyn Serializer>> {
        match self.handler(class)? {
            Handler::Serializer(serializer) => Ok(serializer),
            Handler::Enum(_) => Err(OpaqError::TypeMismatch {
                expected: "object class".to_string(),
                found: class.to_string(),
            }),
        }
    }

    /// Fresh write context
    pub fn write_context(&self) -> WriteContext<'_> {
        WriteContext::new(self)
    }

    /// Fresh read context over `bytes`
    pub fn read_context<'a>(&'a self, bytes: &'a [u8]) -> ReadContext<'a> {
        ReadContext::new(self, bytes)
    }

    /// Fresh copy context
    pub fn copy_context(&self) -> CopyContext<'_> {
        CopyContext::new(self)
    }

    /// Encode `value` with its class descriptor
    pub fn encode(&self, value: &Value) -> Result<Bytes> {
        let mut ctx = self.write_context();
        ctx.write_class_and_object(value)?;
        Ok(ctx.finish())
    }

    /// Encode a non-null `value` without its class descriptor
    pub fn encode_as(&self, value: &Value) -> Result<Bytes> {
        let mut ctx = self.write_context();
        ctx.write_object(value)?;
        Ok(ctx.finish())
    }

    /// Decode a value written by [`Engine::encode`]
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let mut ctx = self.read_context(bytes);
        let value = ctx.read_class_and_object()?;
        ctx.finish()?;
        Ok(value)
    }

    /// Decode a value of `class` written by [`Engine::encode_as`]
    pub fn decode_as(&self, bytes: &[u8], class: &Class) -> Result<Value> {
        let mut ctx = self.read_context(bytes);
        let value = ctx.read_object(class)?;
        ctx.finish()?;
        Ok(value)
    }

    /// Deep-copy `value`; objects reachable twice are copied once
    pub fn deep_copy(&self, value: &Value) -> Result<Value> {
        self.copy_context().copy(value)
    }
}

impl RegistrationTarget for Engine {
    fn register(&mut self, class: Class, serializer: Arc<dyn Serializer>) -> Result<()> {
        Engine::register(self, class, serializer).map(|_| ())
    }
}
