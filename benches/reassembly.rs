use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use posewire::protocol::{decode, encode};
use posewire::{PoseRecord, RECORD_SIZE, StreamReassembler};

fn sample_stream(records: usize) -> Vec<u8> {
    (0..records)
        .flat_map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32;
            encode(&PoseRecord::new([x, 1.0, 2.0], [0.0, 0.0, 0.0, 1.0]))
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let window = encode(&PoseRecord::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]));

    group.throughput(Throughput::Bytes(RECORD_SIZE as u64));
    group.bench_function("decode_record", |b| {
        b.iter(|| black_box(decode(black_box(&window)).unwrap()));
    });

    group.finish();
}

fn bench_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassembly");

    // Full 64 KB read (2048 records) in one chunk
    let full = sample_stream(2048);
    group.throughput(Throughput::Bytes(full.len() as u64));
    group.bench_function("feed_64kb_single_chunk", |b| {
        b.iter_batched_ref(
            StreamReassembler::new,
            |reassembler| {
                let decoded = reassembler.feed(&full).unwrap().count();
                black_box(decoded);
            },
            BatchSize::SmallInput,
        );
    });

    // Same bytes in unaligned 1500-byte segments
    group.bench_function("feed_64kb_mtu_chunks", |b| {
        b.iter_batched_ref(
            StreamReassembler::new,
            |reassembler| {
                let mut decoded = 0;
                for chunk in full.chunks(1500) {
                    decoded += reassembler.feed(chunk).unwrap().count();
                }
                black_box(decoded);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_feed);
criterion_main!(benches);
