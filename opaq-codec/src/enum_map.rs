//! Codec for enum-keyed maps
//!
//! Record layout:
//! `[key enum class descriptor][count varint]{[ordinal varint][value class-and-object]}`.
//! The key type is only recoverable from an entry, so empty maps cannot be
//! written. Copying goes through the map's copy constructor and has no such
//! restriction.

use opaq_format::{OpaqError, Result};
use opaq_graph::collections;
use opaq_graph::{Class, CopyContext, ObjRef, ReadContext, Serializer, Value, WriteContext};

use crate::accessor;

const KIND: &str = "EnumMap";

/// Codec for [`Class::EnumMap`]
#[derive(Debug, Default)]
pub struct EnumMapSerializer;

fn check_class(obj: &ObjRef) -> Result<()> {
    if obj.class() == &Class::EnumMap {
        Ok(())
    } else {
        Err(OpaqError::UnsupportedType(obj.class().to_string()))
    }
}

impl Serializer for EnumMapSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, obj: &ObjRef) -> Result<()> {
        check_class(obj)?;
        let key_type = accessor::enum_key_type(obj)?;
        let entries = obj.entries()?;
        tracing::trace!(key_type = key_type.name(), entries = entries.len(), "writing enum map");

        ctx.write_class(&Class::Enum(key_type))?;
        ctx.write_varint(entries.len() as u64);
        for (key, value) in &entries {
            let ordinal = key
                .as_enum()
                .map(|constant| constant.ordinal())
                .ok_or_else(|| {
                    OpaqError::delegate(
                        KIND,
                        OpaqError::TypeMismatch {
                            expected: "enum key".to_string(),
                            found: key.class_name(),
                        },
                    )
                })?;
            ctx.write_varint(ordinal as u64);
            ctx.write_class_and_object(value)?;
        }
        Ok(())
    }

    fn read(&self, ctx: &mut ReadContext<'_>, _class: &Class) -> Result<ObjRef> {
        let key_type = match ctx.read_class()? {
            Some(Class::Enum(ty)) => ty,
            other => {
                return Err(OpaqError::Corrupt(format!(
                    "enum map key class expected, found {}",
                    other.map_or_else(|| "null".to_string(), |c| c.to_string())
                )))
            }
        };
        let len = ctx.read_len()?;
        tracing::trace!(key_type = key_type.name(), entries = len, "reading enum map");

        let map = collections::enum_map(key_type.clone());
        ctx.reference(&map);
        let constants = key_type.values();
        for _ in 0..len {
            let ordinal = ctx.read_varint()?;
            let key = usize::try_from(ordinal)
                .ok()
                .and_then(|o| constants.get(o).cloned())
                .ok_or_else(|| {
                    OpaqError::Corrupt(format!(
                        "ordinal {} out of range for {}",
                        ordinal,
                        key_type.name()
                    ))
                })?;
            let value = ctx.read_class_and_object()?;
            map.put(Value::Enum(key), value)
                .map_err(|e| OpaqError::delegate(KIND, e))?;
        }
        Ok(map)
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, original: &ObjRef) -> Result<ObjRef> {
        check_class(original)?;
        tracing::trace!("copying enum map");
        let copy =
            collections::enum_map_copy_of(original).map_err(|e| OpaqError::delegate(KIND, e))?;
        ctx.reference(&copy);
        for (key, value) in copy.entries()? {
            let value = ctx.copy(&value)?;
            copy.put(key, value)?;
        }
        Ok(copy)
    }
}
