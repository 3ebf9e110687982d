//! Criterion benchmarks for ltsv_logger

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ltsv_logger::core::escape::append_escaped;
use ltsv_logger::core::timestamp::append_utc_time;
use ltsv_logger::prelude::*;
use ltsv_logger::{append_value, BufferPool};
use std::sync::Arc;

// ============================================================================
// Encoder Benchmarks
// ============================================================================

fn bench_value_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_encoding");
    group.throughput(Throughput::Elements(1));

    let mut buf = Vec::with_capacity(256);
    let cases: [(&str, Value<'static>); 6] = [
        ("int", Value::Int(-1_234_567)),
        ("uint", Value::Uint(u64::MAX)),
        ("f64", Value::F64(std::f64::consts::PI)),
        ("bool", Value::Bool(true)),
        ("bytes", Value::Bytes(b"\x00\x01\x02\x03\xde\xad\xbe\xef")),
        ("str", Value::Str("GET /index.html")),
    ];

    for (name, value) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                buf.clear();
                append_value(&mut buf, black_box(&value));
            });
        });
    }

    group.finish();
}

fn bench_escaping(c: &mut Criterion) {
    let mut group = c.benchmark_group("escaping");
    group.throughput(Throughput::Elements(1));

    let mut buf = Vec::with_capacity(256);

    group.bench_function("plain", |b| {
        b.iter(|| {
            buf.clear();
            append_escaped(&mut buf, black_box("a plain message without specials"));
        });
    });

    group.bench_function("specials", |b| {
        b.iter(|| {
            buf.clear();
            append_escaped(&mut buf, black_box("tab\there\nnewline\\backslash"));
        });
    });

    group.finish();
}

fn bench_timestamp(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp");
    group.throughput(Throughput::Elements(1));

    let mut buf = Vec::with_capacity(64);
    let now = Utc::now();

    group.bench_function("append_utc_time", |b| {
        b.iter(|| {
            buf.clear();
            append_utc_time(&mut buf, black_box(&now));
        });
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_event_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::new(DiscardSink);

    group.bench_function("info_event", |b| {
        b.iter(|| {
            logger
                .info()
                .str("msg", black_box("request done"))
                .u64("status", black_box(200))
                .f64("elapsed", black_box(0.0123))
                .log();
        });
    });

    group.bench_function("info_one_shot", |b| {
        b.iter(|| {
            logger.info_lv(&[
                LV::new("msg", black_box("request done")),
                LV::new("status", black_box(200u16)),
                LV::new("elapsed", black_box(0.0123)),
            ]);
        });
    });

    group.bench_function("lvs_commit", |b| {
        b.iter(|| {
            logger
                .lvs()
                .str("msg", black_box("request done"))
                .u64("status", black_box(200))
                .info();
        });
    });

    group.finish();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::discard();

    group.bench_function("debug_disabled_event", |b| {
        b.iter(|| {
            logger
                .debug()
                .str("msg", black_box("never written"))
                .i64("n", black_box(1))
                .log();
        });
    });

    group.bench_function("debug_disabled_one_shot", |b| {
        b.iter(|| {
            logger.debug_lv(&[LV::new("msg", black_box("never written"))]);
        });
    });

    group.finish();
}

fn bench_error_carrier(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_carrier");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::new(DiscardSink);

    group.bench_function("wrap_and_log", |b| {
        b.iter(|| {
            let err = ErrorFields::new(black_box("not found"))
                .str("path", "/etc/app.conf")
                .i64("attempt", 3);
            logger.err(&err);
        });
    });

    group.bench_function("stack_capture", |b| {
        b.iter(|| {
            logger.error_with_stack(&[LV::new("msg", black_box("boom"))]);
        });
    });

    group.finish();
}

// ============================================================================
// Concurrency Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Arc::new(Logger::new(DiscardSink));

    group.bench_function("multi_thread_4x100", |b| {
        let logger = Arc::clone(&logger);
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        for i in 0..100u64 {
                            logger.info().u64("thread", t).u64("i", i).log();
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

fn bench_buffer_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_pool");
    group.throughput(Throughput::Elements(1));

    let pool = BufferPool::global();

    group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let mut buf = pool.acquire_default();
            buf.push(black_box(b'x'));
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_value_encoding,
    bench_escaping,
    bench_timestamp,
    bench_event_logging,
    bench_level_filtering,
    bench_error_carrier,
    bench_concurrent_logging,
    bench_buffer_pool
);

criterion_main!(benches);
