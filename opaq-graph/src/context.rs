//! Per-call write, read and copy contexts
//!
//! A context lives for one top-level `encode`, `decode` or `deep_copy` call and
//! owns that call's reference table. Contexts are never shared between threads.

use ahash::AHashMap;
use bytes::Bytes;
use opaq_format::constants::{
    CLASS_ARRAY, CLASS_BOOLEAN, CLASS_DOUBLE, CLASS_INTEGER, CLASS_LONG, CLASS_NULL, CLASS_NUMBER,
    CLASS_OBJECT, CLASS_PRIMITIVE_BOOLEAN, CLASS_PRIMITIVE_DOUBLE, CLASS_PRIMITIVE_INT,
    CLASS_PRIMITIVE_LONG, CLASS_STRING, REF_BACK_OFFSET, REF_NEW,
};
use opaq_format::{OpaqError, Result};

use crate::class::{Class, Primitive};
use crate::engine::{Engine, Handler};
use crate::io::{Input, Output};
use crate::object::ObjRef;
use crate::value::Value;

fn fixed_class_id(class: &Class) -> Option<u64> {
    Some(match class {
        Class::Boolean => CLASS_BOOLEAN,
        Class::Integer => CLASS_INTEGER,
        Class::Long => CLASS_LONG,
        Class::Double => CLASS_DOUBLE,
        Class::String => CLASS_STRING,
        Class::Object => CLASS_OBJECT,
        Class::Number => CLASS_NUMBER,
        Class::Primitive(Primitive::Boolean) => CLASS_PRIMITIVE_BOOLEAN,
        Class::Primitive(Primitive::Int) => CLASS_PRIMITIVE_INT,
        Class::Primitive(Primitive::Long) => CLASS_PRIMITIVE_LONG,
        Class::Primitive(Primitive::Double) => CLASS_PRIMITIVE_DOUBLE,
        _ => return None,
    })
}

fn fixed_class(id: u64) -> Option<Class> {
    Some(match id {
        CLASS_BOOLEAN => Class::Boolean,
        CLASS_INTEGER => Class::Integer,
        CLASS_LONG => Class::Long,
        CLASS_DOUBLE => Class::Double,
        CLASS_STRING => Class::String,
        CLASS_OBJECT => Class::Object,
        CLASS_NUMBER => Class::Number,
        CLASS_PRIMITIVE_BOOLEAN => Class::Primitive(Primitive::Boolean),
        CLASS_PRIMITIVE_INT => Class::Primitive(Primitive::Int),
        CLASS_PRIMITIVE_LONG => Class::Primitive(Primitive::Long),
        CLASS_PRIMITIVE_DOUBLE => Class::Primitive(Primitive::Double),
        _ => return None,
    })
}

/// State of one top-level encode
pub struct WriteContext<'e> {
    engine: &'e Engine,
    out: Output,
    written: AHashMap<usize, (ObjRef, u64)>,
    depth: usize,
}

impl<'e> WriteContext<'e> {
    pub(crate) fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            out: Output::new(),
            written: AHashMap::new(),
            depth: 0,
        }
    }

    /// Engine driving this call
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    /// Raw output buffer
    pub fn output(&mut self) -> &mut Output {
        &mut self.out
    }

    /// Write an unsigned varint
    pub fn write_varint(&mut self, v: u64) {
        self.out.write_varint(v);
    }

    /// Write a class descriptor
    pub fn write_class(&mut self, class: &Class) -> Result<()> {
        if let Some(component) = class.component() {
            self.out.write_varint(CLASS_ARRAY);
            return self.write_class(component);
        }
        if let Some(id) = fixed_class_id(class) {
            self.out.write_varint(id);
            return Ok(());
        }
        let id = self
            .engine
            .class_id(class)
            .ok_or_else(|| OpaqError::UnregisteredClass(class.to_string()))?;
        self.out.write_varint(id);
        Ok(())
    }

    /// Write a value's class descriptor followed by its body; null writes the descriptor alone
    pub fn write_class_and_object(&mut self, value: &Value) -> Result<()> {
        match value.class() {
            None => {
                self.out.write_varint(CLASS_NULL);
                Ok(())
            }
            Some(class) => {
                self.write_class(&class)?;
                self.write_object(value)
            }
        }
    }

    /// Write the body of a non-null value whose class the reader already knows
    pub fn write_object(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => Err(OpaqError::TypeMismatch {
                expected: "non-null value".to_string(),
                found: "null".to_string(),
            }),
            Value::Bool(b) => {
                self.out.write_u8(u8::from(*b));
                Ok(())
            }
            Value::Int(i) => {
                self.out.write_varint_signed(i64::from(*i));
                Ok(())
            }
            Value::Long(l) => {
                self.out.write_varint_signed(*l);
                Ok(())
            }
            Value::Double(d) => {
                self.out.write_f64(*d);
                Ok(())
            }
            Value::Str(s) => {
                self.out.write_str(s);
                Ok(())
            }
            Value::Enum(c) => {
                self.out.write_varint(c.ordinal() as u64);
                Ok(())
            }
            Value::Ref(obj) => self.write_reference(obj),
        }
    }

    fn write_reference(&mut self, obj: &ObjRef) -> Result<()> {
        if self.engine.config().references {
            if let Some((_, index)) = self.written.get(&obj.id()) {
                let index = *index;
                tracing::trace!(class = %obj.class(), index, "back-reference");
                self.out.write_varint(index + REF_BACK_OFFSET);
                return Ok(());
            }
            self.out.write_varint(REF_NEW);
            let index = self.written.len() as u64;
            self.written.insert(obj.id(), (obj.clone(), index));
        }

        let serializer = self.engine.serializer_for(obj.class())?;
        self.depth += 1;
        let result = self
            .engine
            .limits()
            .check_depth(self.depth)
            .and_then(|_| serializer.write(self, obj));
        self.depth -= 1;
        result
    }

    /// Encoded bytes
    pub fn finish(self) -> Bytes {
        self.out.into_bytes()
    }
}

/// State of one top-level decode
pub struct ReadContext<'a> {
    engine: &'a Engine,
    input: Input<'a>,
    objects: Vec<Option<ObjRef>>,
    pending: Vec<usize>,
    depth: usize,
}

impl<'a> ReadContext<'a> {
    pub(crate) fn new(engine: &'a Engine, bytes: &'a [u8]) -> Self {
        Self {
            engine,
            input: Input::new(bytes),
            objects: Vec::new(),
            pending: Vec::new(),
            depth: 0,
        }
    }

    /// Engine driving this call
    pub fn engine(&self) -> &'a Engine {
        self.engine
    }

    /// Raw input cursor
    pub fn input(&mut self) -> &mut Input<'a> {
        &mut self.input
    }

    /// Read an unsigned varint
    pub fn read_varint(&mut self) -> Result<u64> {
        self.input.read_varint()
    }

    /// Read an element count, checked against the collection limit
    ///
    /// Every element occupies at least one byte, so a count larger than the
    /// unread input is truncated before anything is allocated for it.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.input.read_varint()?;
        let len = self.engine.limits().check_collection_len(len)?;
        if len > self.input.remaining() {
            return Err(OpaqError::UnexpectedEof);
        }
        Ok(len)
    }

    /// Read a class descriptor; `None` stands for null
    pub fn read_class(&mut self) -> Result<Option<Class>> {
        let mut dims = 0usize;
        let mut id = self.input.read_varint()?;
        while id == CLASS_ARRAY {
            dims += 1;
            self.engine.limits().check_depth(dims)?;
            id = self.input.read_varint()?;
        }

        let mut class = match id {
            CLASS_NULL if dims == 0 => return Ok(None),
            CLASS_NULL => return Err(OpaqError::Corrupt("array of null class".to_string())),
            id => match fixed_class(id) {
                Some(class) => class,
                None => self.engine.class_by_id(id)?.clone(),
            },
        };
        for _ in 0..dims {
            class = Class::array_of(class);
        }
        Ok(Some(class))
    }

    /// Read a value written by `write_class_and_object`
    pub fn read_class_and_object(&mut self) -> Result<Value> {
        match self.read_class()? {
            None => Ok(Value::Null),
            Some(class) => self.read_object(&class),
        }
    }

    /// Read the body of a value of `class`
    pub fn read_object(&mut self, class: &Class) -> Result<Value> {
        match class {
            Class::Boolean => match self.input.read_u8()? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(OpaqError::Corrupt(format!("invalid boolean byte {}", other))),
            },
            Class::Integer => {
                let raw = self.input.read_varint_signed()?;
                i32::try_from(raw)
                    .map(Value::Int)
                    .map_err(|_| OpaqError::Corrupt(format!("integer {} out of range", raw)))
            }
            Class::Long => Ok(Value::Long(self.input.read_varint_signed()?)),
            Class::Double => Ok(Value::Double(self.input.read_f64()?)),
            Class::String => Ok(Value::str(self.input.read_str(self.engine.limits())?)),
            Class::Enum(_) => {
                let ty = match self.engine.handler(class)? {
                    Handler::Enum(ty) => ty,
                    Handler::Serializer(_) => {
                        return Err(OpaqError::Corrupt(format!("{} is not an enum", class)))
                    }
                };
                let ordinal = self.input.read_varint()?;
                usize::try_from(ordinal)
                    .ok()
                    .and_then(|o| ty.constant(o))
                    .map(Value::Enum)
                    .ok_or_else(|| {
                        OpaqError::Corrupt(format!("ordinal {} out of range for {}", ordinal, ty.name()))
                    })
            }
            class if class.is_abstract() => Err(OpaqError::Corrupt(format!(
                "abstract class {} has no instances",
                class
            ))),
            class => self.read_reference(class).map(Value::Ref),
        }
    }

    fn read_reference(&mut self, class: &Class) -> Result<ObjRef> {
        let serializer = self.engine.serializer_for(class)?;
        if !self.engine.config().references {
            return self.read_nested(|ctx| serializer.read(ctx, class));
        }

        let marker = self.input.read_varint()?;
        if marker != REF_NEW {
            let index = marker - REF_BACK_OFFSET;
            return usize::try_from(index)
                .ok()
                .and_then(|i| self.objects.get(i).cloned().flatten())
                .ok_or(OpaqError::UnresolvedReference(index));
        }

        let slot = self.objects.len();
        self.objects.push(None);
        self.pending.push(slot);
        let result = self.read_nested(|ctx| serializer.read(ctx, class));
        self.pending.pop();
        let obj = result?;
        if self.objects[slot].is_none() {
            self.objects[slot] = Some(obj.clone());
        }
        Ok(obj)
    }

    fn read_nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        let result = self
            .engine
            .limits()
            .check_depth(self.depth)
            .and_then(|_| f(self));
        self.depth -= 1;
        result
    }

    /// Publish the object currently being read so nested back-references resolve to it
    pub fn reference(&mut self, obj: &ObjRef) {
        if let Some(&slot) = self.pending.last() {
            if self.objects[slot].is_none() {
                self.objects[slot] = Some(obj.clone());
            }
        }
    }

    /// Fail if input remains after the top-level value
    pub fn finish(self) -> Result<()> {
        match self.input.remaining() {
            0 => Ok(()),
            n => Err(OpaqError::Corrupt(format!("{} trailing bytes", n))),
        }
    }
}

/// State of one top-level deep copy
pub struct CopyContext<'e> {
    engine: &'e Engine,
    copies: AHashMap<usize, (ObjRef, ObjRef)>,
    originals: Vec<ObjRef>,
    depth: usize,
}

impl<'e> CopyContext<'e> {
    pub(crate) fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            copies: AHashMap::new(),
            originals: Vec::new(),
            depth: 0,
        }
    }

    /// Engine driving this call
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    /// Deep-copy a value; scalars are returned as-is
    pub fn copy(&mut self, value: &Value) -> Result<Value> {
        match value {
            Value::Ref(obj) => self.copy_object(obj).map(Value::Ref),
            scalar => Ok(scalar.clone()),
        }
    }

    /// Deep-copy an object, returning the existing copy on repeated visits
    pub fn copy_object(&mut self, original: &ObjRef) -> Result<ObjRef> {
        let references = self.engine.config().references;
        if references {
            if let Some((_, copy)) = self.copies.get(&original.id()) {
                tracing::trace!(class = %original.class(), "reusing copy");
                return Ok(copy.clone());
            }
        }

        let serializer = self.engine.serializer_for(original.class())?;
        self.depth += 1;
        self.originals.push(original.clone());
        let result = self
            .engine
            .limits()
            .check_depth(self.depth)
            .and_then(|_| serializer.copy(self, original));
        self.originals.pop();
        self.depth -= 1;

        let copy = result?;
        if references {
            self.copies
                .entry(original.id())
                .or_insert_with(|| (original.clone(), copy.clone()));
        }
        Ok(copy)
    }

    /// Associate the object currently being copied with its (partial) copy
    pub fn reference(&mut self, copy: &ObjRef) {
        if !self.engine.config().references {
            return;
        }
        if let Some(original) = self.originals.last() {
            self.copies
                .entry(original.id())
                .or_insert_with(|| (original.clone(), copy.clone()));
        }
    }
}
