//! Concurrent use of one engine and the synchronized family's locking

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use opaq_codec::register_all;
use opaq_graph::collections;
use opaq_graph::{Engine, EngineConfig, Value};
use opaq_test_utils::{engine_with_enums, init_tracing, sample_wrappers, strings};
use rayon::prelude::*;

fn engine() -> Engine {
    init_tracing();
    let mut engine = engine_with_enums(EngineConfig::default());
    register_all(&mut engine).expect("register codecs");
    engine
}

#[test]
fn shared_engine_encodes_from_many_threads() {
    let engine = engine();
    let wrappers = sample_wrappers();

    let failures: usize = (0..256)
        .into_par_iter()
        .map(|i| {
            let (_, _, wrapper) = &wrappers[i % wrappers.len()];
            let original = Value::from(wrapper.clone());
            let decoded = engine.decode(&engine.encode(&original).unwrap()).unwrap();
            let copied = engine.deep_copy(&original).unwrap();
            usize::from(!(decoded.deep_eq(&original) && copied.deep_eq(&original)))
        })
        .sum();
    assert_eq!(failures, 0);
}

#[test]
fn encoding_waits_for_the_views_monitor() {
    let engine = engine();
    let view = collections::synchronized_list(&collections::array_list(strings(&["a"]))).unwrap();
    let released = AtomicBool::new(false);
    let (locked_tx, locked_rx) = mpsc::channel();

    thread::scope(|s| {
        s.spawn(|| {
            view.synchronized(|| {
                locked_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                view.add("b".into()).unwrap();
                released.store(true, Ordering::SeqCst);
            });
        });

        locked_rx.recv().unwrap();
        let bytes = engine.encode(&view.clone().into()).unwrap();
        assert!(released.load(Ordering::SeqCst));

        let decoded = engine.decode(&bytes).unwrap();
        assert_eq!(decoded.as_object().unwrap().len(), 2);
    });
}

#[test]
fn copying_waits_for_the_views_monitor() {
    let engine = engine();
    let view = collections::synchronized_set(&collections::hash_set(strings(&["a"]))).unwrap();
    let released = AtomicBool::new(false);
    let (locked_tx, locked_rx) = mpsc::channel();

    thread::scope(|s| {
        s.spawn(|| {
            view.synchronized(|| {
                locked_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                released.store(true, Ordering::SeqCst);
            });
        });

        locked_rx.recv().unwrap();
        let copy = engine.deep_copy(&view.clone().into()).unwrap();
        assert!(released.load(Ordering::SeqCst));
        assert!(copy.deep_eq(&view.clone().into()));
    });
}

#[test]
fn snapshots_under_concurrent_appends_are_prefixes() {
    let engine = engine();
    let view = collections::synchronized_list(&collections::array_list(vec![])).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                view.add(Value::Int(i)).unwrap();
            }
        });

        for _ in 0..50 {
            let bytes = engine.encode(&view.clone().into()).unwrap();
            let decoded = engine.decode(&bytes).unwrap();
            let items = decoded.as_object().unwrap().elements().unwrap();
            let expected: Vec<Value> = (0..items.len() as i32).map(Value::Int).collect();
            assert_eq!(items, expected);
        }
    });
}
