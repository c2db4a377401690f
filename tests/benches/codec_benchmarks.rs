//! # SPA Codec Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | spa-01 header | encode / decode of the 59-byte header |
//! | spa-01 accumulator | splitting a stream of frames delivered in small reads |
//! | spa-01 reply body | encode of an OK reply |

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spa_01_header_codec::{decode, encode, encode_frame, FrameAccumulator, ReplyBody};
use spa_types::{Endpoint, Header};

fn sample_header() -> Header {
    Header {
        badge: 31337,
        origin: Endpoint {
            branch: 101,
            post: 4,
            operator_id: 5005,
            terminal_id: 12,
            ip: [10, 0, 0, 12],
            port: 5100,
        },
        account_product_branch: 101,
        account_product_number: 778_899,
        ..Header::default()
    }
}

fn bench_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("spa-01-header");
    let header = sample_header();
    let bytes = encode(&header);

    group.bench_function("encode", |b| b.iter(|| encode(black_box(&header))));
    group.bench_function("decode", |b| b.iter(|| decode(black_box(&bytes))));
    group.finish();
}

fn bench_accumulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("spa-01-accumulator");
    let frame = encode_frame(&sample_header(), &[0x41; 64]).expect("frame");

    for frames in [10usize, 100, 1000] {
        let stream: Vec<u8> = frame.iter().copied().cycle().take(frame.len() * frames).collect();
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(BenchmarkId::new("chunks_of_16", frames), &stream, |b, stream| {
            b.iter(|| {
                let mut accumulator = FrameAccumulator::new();
                let mut count = 0;
                for chunk in stream.chunks(16) {
                    accumulator.extend(chunk);
                    while let Some(Ok(_)) = accumulator.next_frame() {
                        count += 1;
                    }
                }
                assert_eq!(count, frames);
            })
        });
    }
    group.finish();
}

fn bench_reply(c: &mut Criterion) {
    let body = ReplyBody::ok(1, Bytes::from_static(b"BA CE DI FO GU"));
    c.bench_function("spa-01-reply/encode", |b| {
        b.iter(|| black_box(&body).encode())
    });
}

criterion_group!(benches, bench_header, bench_accumulator, bench_reply);
criterion_main!(benches);
