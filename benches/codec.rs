//! Criterion benchmarks for the packet codec.
//!
//! Run with:
//!   cargo bench --bench codec
//!
//! Streams are synthetic but shaped like the common telemetry profiles:
//! constant frames, heavy bit churn, and mostly-static housekeeping with a
//! few live words.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pocketplus::CodecConfig;

const PACKET_BYTES: usize = 90;
const PACKETS: usize = 1000;

fn constant_stream() -> Vec<u8> {
    vec![0u8; PACKET_BYTES * PACKETS]
}

fn churn_stream() -> Vec<u8> {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    let mut packet = [0u8; PACKET_BYTES];
    let mut data = Vec::with_capacity(PACKET_BYTES * PACKETS);
    for _ in 0..PACKETS {
        for _ in 0..8 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            packet[(state as usize) % PACKET_BYTES] ^= (state >> 32) as u8;
        }
        data.extend_from_slice(&packet);
    }
    data
}

fn housekeeping_stream() -> Vec<u8> {
    let base: Vec<u8> = (0..PACKET_BYTES).map(|i| (i * 7) as u8).collect();
    let mut data = Vec::with_capacity(PACKET_BYTES * PACKETS);
    for t in 0..PACKETS as u32 {
        let mut packet = base.clone();
        packet[0] = (t >> 8) as u8;
        packet[1] = t as u8;
        packet[17] = (t / 3) as u8;
        data.extend_from_slice(&packet);
    }
    data
}

fn bench_codec(c: &mut Criterion) {
    let cases: &[(&str, Vec<u8>, CodecConfig)] = &[
        (
            "constant",
            constant_stream(),
            CodecConfig::with_periods(720, 1, 10, 20, 50),
        ),
        (
            "churn",
            churn_stream(),
            CodecConfig::with_periods(720, 7, 10, 20, 50),
        ),
        (
            "housekeeping",
            housekeeping_stream(),
            CodecConfig::with_periods(720, 2, 20, 50, 100),
        ),
    ];

    let mut group = c.benchmark_group("codec");
    for (name, data, cfg) in cases {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("compress", name), data, |b, data| {
            b.iter(|| pocketplus::compress(data, cfg).unwrap())
        });

        let packed = pocketplus::compress(data, cfg).unwrap();
        // Throughput measured in *decompressed* bytes (the meaningful quantity).
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("decompress", name),
            &packed,
            |b, packed| b.iter(|| pocketplus::decompress(packed, cfg).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
