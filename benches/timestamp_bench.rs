/*
Per-sample conversions: encoding the boot clock into HHMMSSmmm, parsing it
back (session reader), and quantizing a full 96x96 frame into the model's
int8 input.
*/

use criterion::{Criterion, criterion_group, criterion_main};
use std::{hint::black_box, time::Duration};

use sensor_pipeline::{
    config::FRAME_LEN,
    inferencer::quantize_input,
    pipeline::timestamp::{Timestamp, to_timestamp},
};

fn bench_timestamp(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp");

    group.bench_function("encode", |b| {
        let mut ms = 0u64;
        b.iter(|| {
            ms = ms.wrapping_add(20);
            black_box(to_timestamp(black_box(ms)))
        });
    });

    group.bench_function("parse", |b| {
        b.iter(|| black_box("123456789".parse::<Timestamp>()));
    });

    group.finish();
}

fn bench_quantize_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference_input");
    group.measurement_time(Duration::from_secs(5));

    let frame: Vec<u8> = (0..FRAME_LEN).map(|i| i as u8).collect();
    let mut input = Vec::with_capacity(FRAME_LEN);
    group.bench_function("quantize_96x96", |b| {
        b.iter(|| {
            quantize_input(black_box(&frame), &mut input);
            black_box(input.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_timestamp, bench_quantize_frame);
criterion_main!(benches);
