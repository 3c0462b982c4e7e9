//! Default serializers for arrays and the public collection classes

use opaq_format::{OpaqError, Result};

use crate::class::Class;
use crate::collections;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Serializer;
use crate::object::ObjRef;
use crate::value::Value;

fn component_of(class: &Class) -> Result<&Class> {
    class.component().ok_or_else(|| OpaqError::TypeMismatch {
        expected: "array".to_string(),
        found: class.to_string(),
    })
}

/// Arrays of any component class
///
/// Primitive slots are written without a class descriptor; every other slot
/// carries its own, so `Object[]` and `Number[]` keep heterogeneous elements.
pub struct ArraySerializer;

impl Serializer for ArraySerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, obj: &ObjRef) -> Result<()> {
        let component = component_of(obj.class())?;
        let elements = obj.elements()?;
        ctx.write_varint(elements.len() as u64);
        for element in &elements {
            if component.is_primitive() {
                ctx.write_object(element)?;
            } else {
                ctx.write_class_and_object(element)?;
            }
        }
        Ok(())
    }

    fn read(&self, ctx: &mut ReadContext<'_>, class: &Class) -> Result<ObjRef> {
        let component = component_of(class)?;
        let len = ctx.read_len()?;
        let array = collections::new_array(component.clone(), len);
        ctx.reference(&array);
        for index in 0..len {
            let element = match component {
                Class::Primitive(p) => ctx.read_object(&p.boxed())?,
                _ => ctx.read_class_and_object()?,
            };
            array.set(index, element)?;
        }
        Ok(array)
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, original: &ObjRef) -> Result<ObjRef> {
        let component = component_of(original.class())?;
        let elements = original.elements()?;
        let copy = collections::new_array(component.clone(), elements.len());
        ctx.reference(&copy);
        for (index, element) in elements.iter().enumerate() {
            copy.set(index, ctx.copy(element)?)?;
        }
        Ok(copy)
    }
}

/// Lists and sets with a public constructor
pub struct CollectionSerializer;

impl Serializer for CollectionSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, obj: &ObjRef) -> Result<()> {
        let elements = obj.elements()?;
        ctx.write_varint(elements.len() as u64);
        for element in &elements {
            ctx.write_class_and_object(element)?;
        }
        Ok(())
    }

    fn read(&self, ctx: &mut ReadContext<'_>, class: &Class) -> Result<ObjRef> {
        let len = ctx.read_len()?;
        let collection = collections::new_collection(class)?;
        ctx.reference(&collection);
        for _ in 0..len {
            let element = ctx.read_class_and_object()?;
            collection.add(element)?;
        }
        Ok(collection)
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, original: &ObjRef) -> Result<ObjRef> {
        let copy = collections::new_collection(original.class())?;
        ctx.reference(&copy);
        for element in original.elements()? {
            copy.add(ctx.copy(&element)?)?;
        }
        Ok(copy)
    }
}

/// Maps with a public constructor
pub struct MapSerializer;

impl Serializer for MapSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, obj: &ObjRef) -> Result<()> {
        let entries = obj.entries()?;
        ctx.write_varint(entries.len() as u64);
        for (key, value) in &entries {
            ctx.write_class_and_object(key)?;
            ctx.write_class_and_object(value)?;
        }
        Ok(())
    }

    fn read(&self, ctx: &mut ReadContext<'_>, class: &Class) -> Result<ObjRef> {
        let len = ctx.read_len()?;
        let map = collections::new_collection(class)?;
        ctx.reference(&map);
        for _ in 0..len {
            let key = ctx.read_class_and_object()?;
            let value = ctx.read_class_and_object()?;
            map.put(key, value)?;
        }
        Ok(map)
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, original: &ObjRef) -> Result<ObjRef> {
        let copy = collections::new_collection(original.class())?;
        ctx.reference(&copy);
        for (key, value) in original.entries()? {
            let key = ctx.copy(&key)?;
            let value: Value = ctx.copy(&value)?;
            copy.put(key, value)?;
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Primitive;
    use crate::engine::Engine;

    #[test]
    fn test_primitive_array_roundtrip() {
        let engine = Engine::default();
        let array = collections::array_of(
            Class::Primitive(Primitive::Long),
            vec![Value::Long(-1), Value::Long(1 << 40)],
        )
        .unwrap();

        let decoded = engine.decode(&engine.encode(&array.clone().into()).unwrap()).unwrap();
        let decoded = decoded.as_object().unwrap();
        assert_eq!(decoded.class(), array.class());
        assert_eq!(decoded.elements().unwrap(), array.elements().unwrap());
    }

    #[test]
    fn test_object_array_keeps_heterogeneous_elements() {
        let engine = Engine::default();
        let array = collections::array_of(
            Class::Object,
            vec![Value::Int(1), "two".into(), Value::Null, Value::Double(3.0)],
        )
        .unwrap();

        let copy = engine.deep_copy(&array.clone().into()).unwrap();
        let copy = copy.as_object().unwrap();
        assert!(!copy.ptr_eq(&array));
        assert_eq!(copy.elements().unwrap(), array.elements().unwrap());
    }

    #[test]
    fn test_string_array_rejects_foreign_element() {
        let engine = Engine::default();
        let objects = collections::array_of(Class::Object, vec![Value::Int(1)]).unwrap();
        let mut bytes = engine.encode(&objects.into()).unwrap().to_vec();
        // Object component id -> String component id
        let pos = bytes.iter().position(|b| *b == 7).unwrap();
        bytes[pos] = 6;
        assert!(matches!(
            engine.decode(&bytes),
            Err(OpaqError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_tree_map_roundtrip_keeps_order() {
        let engine = Engine::default();
        let map = collections::tree_map(vec![
            ("b".into(), Value::Int(2)),
            ("a".into(), Value::Int(1)),
        ]);
        let decoded = engine.decode(&engine.encode(&map.into()).unwrap()).unwrap();
        let entries = decoded.as_object().unwrap().entries().unwrap();
        assert_eq!(
            entries,
            vec![("a".into(), Value::Int(1)), ("b".into(), Value::Int(2))]
        );
    }
}
