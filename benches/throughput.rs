//! Throughput benchmarks - plan-driven encoding vs hand-written byte packing.
//!
//! Plans are warmed before measuring, so these numbers reflect the steady
//! state: one lock-free cache lookup per value, then the leaf walk.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use fixbuf::{ByteOrder, Encoding, Plannable};
use std::hint::black_box;

#[derive(Plannable, Debug, Default, Clone, Copy)]
struct Sample {
    channel: u8,
    timestamp: u64,
    level: i32,
    gain: f32,
    tag: [u8; 4],
}

const SAMPLE_WIDTH: usize = 21;
const BATCH: usize = 1_000;

fn samples() -> Vec<Sample> {
    (0..BATCH)
        .map(|i| Sample {
            channel: (i % 8) as u8,
            timestamp: i as u64 * 1_000,
            level: i as i32 - 500,
            gain: i as f32 * 0.5,
            tag: *b"fxbf",
        })
        .collect()
}

fn encode_manual(sample: &Sample, out: &mut Vec<u8>) {
    out.push(sample.channel);
    out.extend_from_slice(&sample.timestamp.to_be_bytes());
    out.extend_from_slice(&sample.level.to_be_bytes());
    out.extend_from_slice(&sample.gain.to_be_bytes());
    out.extend_from_slice(&sample.tag);
}

fn write_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    group.throughput(Throughput::Bytes((SAMPLE_WIDTH * BATCH) as u64));
    let batch = samples();

    for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
        let encoding = Encoding::from(order);
        encoding.plan_of::<Sample>().unwrap();
        let mut wire = Vec::with_capacity(SAMPLE_WIDTH * BATCH);
        group.bench_function(format!("plan_{order}"), |b| {
            b.iter(|| {
                wire.clear();
                for sample in &batch {
                    encoding.write(&mut wire, &[black_box(sample)]).unwrap();
                }
            })
        });
    }

    // Hand-packed baseline, same layout
    {
        let mut wire = Vec::with_capacity(SAMPLE_WIDTH * BATCH);
        group.bench_function("manual_big-endian", |b| {
            b.iter(|| {
                wire.clear();
                for sample in &batch {
                    encode_manual(black_box(sample), &mut wire);
                }
            })
        });
    }

    group.finish();
}

fn read_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Bytes((SAMPLE_WIDTH * BATCH) as u64));

    let encoding = Encoding::default();
    let mut wire = Vec::new();
    for sample in samples() {
        encoding.write(&mut wire, &[&sample]).unwrap();
    }
    assert_eq!(wire.len(), SAMPLE_WIDTH * BATCH);

    group.bench_function("plan_big-endian", |b| {
        b.iter(|| {
            let mut source = black_box(wire.as_slice());
            let mut sample = Sample::default();
            for _ in 0..BATCH {
                encoding.read(&mut source, &mut [&mut sample]).unwrap();
            }
            black_box(sample)
        })
    });

    group.finish();
}

fn plan_lookup(c: &mut Criterion) {
    let encoding = Encoding::default();
    encoding.plan_of::<Sample>().unwrap();

    c.bench_function("plan_lookup_cached", |b| {
        b.iter(|| black_box(encoding.plan_of::<Sample>().unwrap()))
    });

    c.bench_function("plan_build_cold", |b| {
        b.iter(|| {
            let encoding = Encoding::default();
            black_box(encoding.plan_of::<Sample>().unwrap())
        })
    });
}

criterion_group!(benches, write_throughput, read_throughput, plan_lookup);
criterion_main!(benches);
