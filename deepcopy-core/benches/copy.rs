//! Deep copy throughput
//!
//! Compares the reflective copy against a CBOR encode/decode round trip of
//! the same value.
//!
//! Run with: `cargo bench -p deepcopy-core copy`

use criterion::{Criterion, criterion_group, criterion_main};
use deepcopy_core::{CopyOption, Reflect, copy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hint::black_box;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Reflect)]
struct Primitives {
    bytes: Vec<u8>,
    boxed_bytes: Box<Vec<u8>>,
    ints: Vec<i64>,
    int_pointers: Vec<Option<i64>>,
    int_pointer: Option<i64>,
    int: i64,
    text: String,
    by_int: HashMap<i64, String>,
    by_name: HashMap<String, Option<i64>>,
    lists: HashMap<u32, Vec<i64>>,
    array: [String; 4],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Reflect)]
struct Sample {
    x: i64,
    y: i64,
    primitives: Box<Primitives>,
    simple: (String, String),
    i: i64,
    #[serde(skip)]
    #[reflect(skip)]
    z: i64,
}

fn sample() -> Sample {
    let primitives = Primitives {
        bytes: vec![11, 23, 99, 100],
        boxed_bytes: Box::new(vec![11, 23, 99, 100]),
        ints: vec![1, 2, 3, 4],
        int_pointers: vec![Some(7), Some(8), None, Some(9)],
        int_pointer: Some(5),
        int: 5,
        text: String::from("xxxxx"),
        by_int: HashMap::from([
            (1, String::from("x")),
            (2, String::from("U")),
            (3, String::from("axadwa")),
        ]),
        by_name: HashMap::from([
            (String::from("a"), Some(1)),
            (String::from("b"), Some(2)),
            (String::from("rrr"), None),
        ]),
        lists: HashMap::from([(1, vec![1, 2, 3]), (7, vec![4, 7, 3, 9]), (9, vec![7, 3, 9, 6, 1])]),
        array: [
            String::from("a"),
            String::from("b"),
            String::from("c"),
            String::from("d"),
        ],
    };

    Sample {
        x: 99,
        y: 100,
        primitives: Box::new(primitives),
        simple: (String::from("XXX"), String::from("YYYY")),
        i: 100,
        z: -1,
    }
}

fn copy_benchmark(c: &mut Criterion) {
    let source = sample();
    let mut group = c.benchmark_group("copy");

    group.bench_function("reflect", |b| {
        b.iter(|| {
            let mut destination = Sample::default();
            copy(black_box(&source), &mut destination, &[]).unwrap();
            black_box(destination)
        })
    });

    group.bench_function("reflect_cycle_detection", |b| {
        let options = [CopyOption::CycleDetection];
        b.iter(|| {
            let mut destination = Sample::default();
            copy(black_box(&source), &mut destination, &options).unwrap();
            black_box(destination)
        })
    });

    group.bench_function("cbor_round_trip", |b| {
        b.iter(|| {
            let mut buffer = Vec::new();
            ciborium::into_writer(black_box(&source), &mut buffer).unwrap();
            let destination: Sample = ciborium::from_reader(buffer.as_slice()).unwrap();
            black_box(destination)
        })
    });

    group.finish();
}

criterion_group!(benches, copy_benchmark);
criterion_main!(benches);
