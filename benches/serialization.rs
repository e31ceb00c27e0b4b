use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use h5blob::batch::{Batch, FieldMapping};
use h5blob::compression::{CompressionDescriptor, CompressionOption};
use h5blob::validator::validate_batch;
use h5blob::writer::Hdf5BinarySerializer;
use ndarray::{Array, Array1};
use std::hint::black_box;

/// Synthetic detector batch of `depth` frames of `size` x `size` pixels
fn detector_batch(depth: usize, size: usize) -> Batch {
    let frames = Array::from_shape_fn((depth, size, size), |(r, y, x)| {
        ((x * 31 + y * 17 + r * 7) % 251) as f32
    });

    Batch::new()
        .with_field("detector_data", frames)
        .with_field("timestamp", Array1::from_shape_fn(depth, |i| i as f64 * 1e-3))
}

fn mapping() -> FieldMapping {
    FieldMapping::new([("detector_data", "data"), ("timestamp", "timestamp")])
        .expect("valid mapping")
}

/// Serialize one batch under every built-in compression option
fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    let depth = 8;
    let size = 256;
    let batch = detector_batch(depth, size);
    group.throughput(Throughput::Bytes((depth * size * size * 4) as u64));

    let options = [
        (CompressionOption::None, 0),
        (CompressionOption::Gzip, 4),
        (CompressionOption::GzipWithShuffle, 4),
    ];

    for (option, level) in options {
        let descriptor = CompressionDescriptor::resolve(option, level).expect("valid level");
        let mut serializer = Hdf5BinarySerializer::with_parts(mapping(), descriptor);

        group.bench_with_input(BenchmarkId::new("serialize_batch", option), &batch, |b, batch| {
            b.iter(|| {
                let blob = serializer.serialize_batch(black_box(batch)).expect("serialize");
                black_box(blob.len())
            })
        });
    }

    group.finish();
}

/// Container overhead as the batch depth grows
fn bench_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth");

    for depth in [1, 16, 64] {
        let batch = detector_batch(depth, 64);
        let mut serializer =
            Hdf5BinarySerializer::with_parts(mapping(), CompressionDescriptor::None);
        group.throughput(Throughput::Elements(depth as u64));

        group.bench_with_input(BenchmarkId::new("records", depth), &batch, |b, batch| {
            b.iter(|| black_box(serializer.serialize_batch(batch).expect("serialize").len()))
        });
    }

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let batch = detector_batch(64, 16);
    let fields = mapping();

    c.bench_function("validate_batch", |b| {
        b.iter(|| validate_batch(black_box(&batch), &fields))
    });
}

criterion_group!(benches, bench_compression, bench_depth, bench_validation);
criterion_main!(benches);
