//! Engine round-trip, reference and limit tests

use opaq_graph::collections;
use opaq_graph::{Class, Engine, EngineConfig, EnumType, OpaqError, Primitive, Value};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn strings(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::from(*s)).collect()
}

#[test]
fn collections_roundtrip_with_exact_class() {
    init_tracing();
    let engine = Engine::default();
    let values = [
        collections::array_list(strings(&["foo", "bar"])),
        collections::linked_list(strings(&["foo"])),
        collections::hash_set(strings(&["a", "b", "c"])),
        collections::tree_set(strings(&["z", "y"])),
        collections::hash_map(vec![("k".into(), Value::Long(9))]),
        collections::tree_map(vec![(Value::Int(2), Value::Null)]),
    ];

    for original in values {
        let original = Value::from(original);
        let bytes = engine.encode(&original).expect("encode");
        let decoded = engine.decode(&bytes).expect("decode");
        assert!(decoded.deep_eq(&original), "{:?}", original);
        assert_eq!(decoded.class(), original.class());
    }
}

#[test]
fn registered_enum_roundtrips_to_same_constant() {
    let mut engine = Engine::default();
    let vipers = EnumType::new("Vipers", ["SNAKE_CHARMER", "BLACK_MAMBA", "COPPERHEAD"]);
    engine.register_enum(vipers.clone());

    let value = Value::from(vipers.constant(2).unwrap());
    let decoded = engine.decode(&engine.encode(&value).unwrap()).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded.as_enum().unwrap().name(), "COPPERHEAD");
}

#[test]
fn unknown_class_id_is_reported() {
    let engine = Engine::default();
    assert!(matches!(
        engine.decode(&[99]),
        Err(OpaqError::UnknownClassId(99))
    ));
}

#[test]
fn truncated_input_is_reported() {
    let engine = Engine::default();
    let list = collections::array_list(strings(&["hello world"]));
    let bytes = engine.encode(&list.into()).unwrap();
    assert!(matches!(
        engine.decode(&bytes[..bytes.len() - 3]),
        Err(OpaqError::UnexpectedEof)
    ));
}

#[test]
fn collection_length_limit_applies_on_read() {
    let engine = Engine::default();
    let list = collections::array_list((0..10).map(Value::Int));
    let bytes = engine.encode(&list.into()).unwrap();

    let mut config = EngineConfig::default();
    config.limits.max_collection_len = 4;
    let strict = Engine::new(config);
    assert!(matches!(
        strict.decode(&bytes),
        Err(OpaqError::LimitExceeded(_))
    ));
}

#[test]
fn encode_as_omits_class_descriptor() {
    let engine = Engine::default();
    let array = collections::array_of(
        Class::Primitive(Primitive::Int),
        vec![Value::Int(1), Value::Int(2)],
    )
    .unwrap();
    let class = array.class().clone();

    let bytes = engine.encode_as(&array.into()).unwrap();
    let decoded = engine.decode_as(&bytes, &class).unwrap();
    assert_eq!(
        decoded.as_object().unwrap().elements().unwrap(),
        vec![Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn shared_map_values_stay_shared_through_copy() {
    init_tracing();
    let engine = Engine::default();
    let shared = collections::tree_set(strings(&["x"]));
    let map = collections::hash_map(vec![
        ("a".into(), shared.clone().into()),
        ("b".into(), shared.into()),
    ]);

    let copy = engine.deep_copy(&map.into()).unwrap();
    let copy = copy.as_object().unwrap();
    let a = copy.lookup(&"a".into()).unwrap().unwrap();
    let b = copy.lookup(&"b".into()).unwrap().unwrap();
    assert!(a.as_object().unwrap().ptr_eq(b.as_object().unwrap()));
}

#[test]
fn opaque_classes_need_registration() {
    let engine = Engine::default();
    let view = collections::unmodifiable_list(&collections::array_list(vec![])).unwrap();
    assert!(matches!(
        engine.encode(&view.into()),
        Err(OpaqError::UnregisteredClass(_))
    ));
}

proptest! {
    #[test]
    fn prop_list_of_scalars_roundtrips(items in prop::collection::vec(
        prop_oneof![
            any::<i32>().prop_map(Value::Int),
            any::<i64>().prop_map(Value::Long),
            any::<bool>().prop_map(Value::Bool),
            "[a-z]{0,8}".prop_map(Value::from),
            Just(Value::Null),
        ],
        0..32,
    )) {
        let engine = Engine::default();
        let list = Value::from(collections::array_list(items.clone()));
        let decoded = engine.decode(&engine.encode(&list).unwrap()).unwrap();
        prop_assert_eq!(decoded.as_object().unwrap().elements().unwrap(), items);
    }
}
