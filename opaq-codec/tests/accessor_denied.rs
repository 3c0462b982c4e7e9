//! Registration when privileged field access is sealed
//!
//! Runs in its own test binary: sealing is process-wide and permanent.

use opaq_codec::accessor::accessor;
use opaq_codec::{
    register_all, register_arrays_as_list, register_enum_map, register_synchronized,
    register_unmodifiable, RecordingTarget,
};
use opaq_graph::privileged;
use opaq_graph::{Class, Engine, OpaqError, ViewFamily};

#[test]
fn sealed_access_fails_registration_and_binds_nothing() {
    opaq_test_utils::init_tracing();
    privileged::seal();

    let mut target = RecordingTarget::new();
    assert!(matches!(
        register_all(&mut target),
        Err(OpaqError::AccessorInit(_))
    ));
    assert!(target.is_empty());

    assert!(matches!(
        register_synchronized(&mut target),
        Err(OpaqError::AccessorInit(_))
    ));
    assert!(matches!(
        register_unmodifiable(&mut target),
        Err(OpaqError::AccessorInit(_))
    ));
    assert!(target.is_empty());

    let mut engine = Engine::default();
    let builtin = engine.registered_classes().len();
    assert!(register_all(&mut engine).is_err());
    assert_eq!(engine.registered_classes().len(), builtin);

    // the failure is remembered; no second resolution is attempted
    assert_eq!(accessor(ViewFamily::Synchronized).resolutions(), 1);
    assert_eq!(accessor(ViewFamily::Unmodifiable).resolutions(), 1);

    register_enum_map(&mut engine).unwrap();
    register_arrays_as_list(&mut engine).unwrap();
    assert!(engine.is_registered(&Class::EnumMap));
}
