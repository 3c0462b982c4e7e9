//! Codec for fixed-size array-backed lists
//!
//! Record layout: `[count varint][component class descriptor]{[element class-and-object]}`.
//! The backing array's component class is not observable through the list, so
//! the writer guesses it from the first element (see
//! [`as_list_component`](crate::accessor::as_list_component)). Primitive
//! components are boxed on read. A later element that does not fit the guessed
//! component fails the read.

use opaq_format::{OpaqError, Result};
use opaq_graph::collections;
use opaq_graph::{Class, CopyContext, LibraryClass, ObjRef, ReadContext, Serializer, WriteContext};

use crate::accessor;

const KIND: &str = "Arrays$ArrayList";

/// Codec for lists produced by [`collections::as_list`]
#[derive(Debug, Default)]
pub struct ArraysAsListSerializer;

fn check_class(obj: &ObjRef) -> Result<()> {
    match obj.class() {
        Class::Library(LibraryClass::ArraysAsList) => Ok(()),
        other => Err(OpaqError::UnsupportedType(other.to_string())),
    }
}

impl Serializer for ArraysAsListSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, obj: &ObjRef) -> Result<()> {
        check_class(obj)?;
        let component = accessor::as_list_component(obj).map_err(|e| OpaqError::delegate(KIND, e))?;
        let elements = obj.elements()?;
        tracing::trace!(component = %component, len = elements.len(), "writing array-backed list");

        ctx.write_varint(elements.len() as u64);
        ctx.write_class(&component)?;
        for element in &elements {
            ctx.write_class_and_object(element)?;
        }
        Ok(())
    }

    fn read(&self, ctx: &mut ReadContext<'_>, _class: &Class) -> Result<ObjRef> {
        let len = ctx.read_len()?;
        let component = ctx
            .read_class()?
            .ok_or_else(|| OpaqError::Corrupt("array-backed list without component class".to_string()))?
            .boxed();
        tracing::trace!(component = %component, len, "reading array-backed list");

        let array = collections::new_array(component, len);
        for index in 0..len {
            let element = ctx.read_class_and_object()?;
            array
                .set(index, element)
                .map_err(|e| OpaqError::delegate(KIND, e))?;
        }
        collections::as_list(&array).map_err(|e| OpaqError::delegate(KIND, e))
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, original: &ObjRef) -> Result<ObjRef> {
        check_class(original)?;
        tracing::trace!("copying array-backed list");
        let array = original.to_array()?;
        let copy = ctx.copy_object(&array)?;
        collections::as_list(&copy).map_err(|e| OpaqError::delegate(KIND, e))
    }
}
