//! Enum-keyed map and array-backed list behavior

use opaq_codec::register_all;
use opaq_graph::collections;
use opaq_graph::{Class, Engine, EngineConfig, OpaqError, Primitive, Value};
use opaq_test_utils::{colors, engine_with_enums, init_tracing, strings, vipers};

fn engine() -> Engine {
    init_tracing();
    let mut engine = engine_with_enums(EngineConfig::default());
    register_all(&mut engine).expect("register codecs");
    engine
}

#[test]
fn enum_map_roundtrips_entries_by_ordinal() {
    let engine = engine();
    let vipers = vipers();
    let map = collections::enum_map(vipers.clone());
    map.put(vipers.constant(3).unwrap().into(), "green".into()).unwrap();
    map.put(vipers.constant(0).unwrap().into(), Value::Int(1)).unwrap();
    map.put(
        vipers.constant(1).unwrap().into(),
        collections::array_list(strings(&["nested"])).into(),
    )
    .unwrap();

    let original = Value::from(map);
    let decoded = engine.decode(&engine.encode(&original).unwrap()).unwrap();
    assert!(decoded.deep_eq(&original));

    let decoded = decoded.as_object().unwrap();
    let keys: Vec<String> = decoded
        .entries()
        .unwrap()
        .into_iter()
        .map(|(k, _)| k.as_enum().unwrap().name().to_string())
        .collect();
    assert_eq!(keys, ["SNAKE_CHARMER", "BLACK_MAMBA", "GREEN_MAMBA"]);
}

#[test]
fn empty_enum_map_cannot_be_written() {
    let engine = engine();
    let map = collections::enum_map(vipers());
    assert!(matches!(
        engine.encode(&map.into()),
        Err(OpaqError::EmptyEnumMap)
    ));
}

#[test]
fn empty_enum_map_copy_keeps_key_type() {
    let engine = engine();
    let vipers = vipers();
    let map = collections::enum_map(vipers.clone());

    let copy = engine.deep_copy(&map.clone().into()).unwrap();
    let copy = copy.as_object().unwrap();
    assert!(!copy.ptr_eq(&map));
    assert!(copy.is_empty());

    let wrong_key = colors().constant(0).unwrap();
    assert!(matches!(
        copy.put(wrong_key.into(), Value::Int(1)),
        Err(OpaqError::TypeMismatch { .. })
    ));
    copy.put(vipers.constant(2).unwrap().into(), Value::Int(1))
        .unwrap();
    assert!(map.is_empty());
}

#[test]
fn enum_map_copy_is_deep() {
    let engine = engine();
    let vipers = vipers();
    let inner = collections::array_list(strings(&["a"]));
    let map = collections::enum_map(vipers.clone());
    map.put(vipers.constant(0).unwrap().into(), inner.clone().into())
        .unwrap();

    let copy = engine.deep_copy(&map.into()).unwrap();
    let copied_inner = copy
        .as_object()
        .unwrap()
        .lookup(&vipers.constant(0).unwrap().into())
        .unwrap()
        .unwrap();
    let copied_inner = copied_inner.as_object().unwrap();
    assert!(!copied_inner.ptr_eq(&inner));
    assert_eq!(copied_inner.get(0).unwrap(), Value::from("a"));
}

#[test]
fn primitive_as_list_decodes_boxed() {
    let engine = engine();
    let ints = collections::array_of(
        Class::Primitive(Primitive::Int),
        vec![Value::Int(1), Value::Int(2)],
    )
    .unwrap();
    let list = collections::as_list(&ints).unwrap();

    let decoded = engine.decode(&engine.encode(&list.into()).unwrap()).unwrap();
    let decoded = decoded.as_object().unwrap();
    assert_eq!(decoded.elements().unwrap(), vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(
        decoded.to_array().unwrap().array_component(),
        Some(&Class::Integer)
    );
}

#[test]
fn string_as_list_roundtrips_exactly() {
    let engine = engine();
    let array = collections::array_of(Class::String, strings(&["foo", "bar"])).unwrap();
    let list = Value::from(collections::as_list(&array).unwrap());

    let decoded = engine.decode(&engine.encode(&list).unwrap()).unwrap();
    assert!(decoded.deep_eq(&list));
    let decoded = decoded.as_object().unwrap();
    assert_eq!(
        decoded.to_array().unwrap().array_component(),
        Some(&Class::String)
    );

    decoded.set(1, "baz".into()).unwrap();
    assert!(matches!(
        decoded.add("qux".into()),
        Err(OpaqError::UnsupportedOperation(_))
    ));
    assert_eq!(array.get(1).unwrap(), Value::from("bar"));
}

#[test]
fn empty_as_list_keeps_component() {
    let engine = engine();
    let list = collections::as_list(&collections::new_array(Class::String, 0)).unwrap();

    let decoded = engine.decode(&engine.encode(&list.into()).unwrap()).unwrap();
    let decoded = decoded.as_object().unwrap();
    assert!(decoded.is_empty());
    assert_eq!(
        decoded.to_array().unwrap().array_component(),
        Some(&Class::String)
    );
}

#[test]
fn mixed_number_as_list_fails_on_read() {
    let engine = engine();
    let numbers =
        collections::array_of(Class::Number, vec![Value::Int(1), Value::Double(2.5)]).unwrap();
    let list = collections::as_list(&numbers).unwrap();

    let bytes = engine.encode(&list.clone().into()).unwrap();
    let err = engine.decode(&bytes).unwrap_err();
    assert!(matches!(err, OpaqError::Delegate { ref kind, .. } if kind == "Arrays$ArrayList"));
    assert!(matches!(err.root_cause(), OpaqError::TypeMismatch { .. }));

    // copying keeps the real component
    let copy = engine.deep_copy(&list.into()).unwrap();
    assert_eq!(
        copy.as_object().unwrap().elements().unwrap(),
        vec![Value::Int(1), Value::Double(2.5)]
    );
}

#[test]
fn as_list_shared_between_wrappers() {
    let engine = engine();
    let array = collections::array_of(Class::String, strings(&["a", "b"])).unwrap();
    let list = collections::as_list(&array).unwrap();
    let view = collections::unmodifiable_list(&list).unwrap();
    let outer: Value = collections::array_list(vec![list.into(), view.into()]).into();

    let decoded = engine.decode(&engine.encode(&outer).unwrap()).unwrap();
    let items = decoded.as_object().unwrap().elements().unwrap();
    let decoded_list = items[0].as_object().unwrap();
    let decoded_view = items[1].as_object().unwrap();

    decoded_list.set(0, "z".into()).unwrap();
    assert_eq!(decoded_view.get(0).unwrap(), Value::from("z"));
}
