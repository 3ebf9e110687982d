//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - Every record from every thread arrives exactly once
//! - No record contains bytes from another call
//! - Builders, one-shot calls and carriers can be mixed freely
//! - File output holds up under concurrent writers

use ltsv_logger::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const LINES_PER_THREAD: usize = 1000;

/// Parse `thread:<t>\tseq:<s>\tpad:<pad>` into `(t, s)`, checking the pad.
fn parse_line(line: &str) -> (usize, usize) {
    let fields: Vec<&str> = line.split('\t').collect();
    assert_eq!(fields.len(), 3, "malformed line {:?}", line);

    let t: usize = fields[0]
        .strip_prefix("thread:")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("bad thread field in {:?}", line));
    let s: usize = fields[1]
        .strip_prefix("seq:")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("bad seq field in {:?}", line));

    // The pad repeats the thread's own digit; bytes from another call
    // would show up as a foreign digit.
    let pad = fields[2].strip_prefix("pad:").expect("pad field");
    let digit = char::from(b'0' + t as u8);
    assert!(pad.chars().all(|c| c == digit), "mixed record {:?}", line);
    (t, s)
}

fn check_complete(lines: &[String]) {
    assert_eq!(lines.len(), THREADS * LINES_PER_THREAD);
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        assert!(seen.insert(parse_line(line)), "duplicate record {:?}", line);
    }
}

fn bare_logger(sink: MemorySink) -> Arc<Logger> {
    Arc::new(
        Logger::builder()
            .sink(sink)
            .time_label("")
            .level_label("")
            .build(),
    )
}

#[test]
fn test_concurrent_events_are_not_interleaved() {
    let sink = MemorySink::new();
    let logger = bare_logger(sink.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                let pad = t.to_string().repeat(200);
                for s in 0..LINES_PER_THREAD {
                    logger
                        .info()
                        .u64("thread", t as u64)
                        .u64("seq", s as u64)
                        .str("pad", &pad)
                        .log();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    check_complete(&sink.lines());
    assert_eq!(
        logger.metrics().lines_written(),
        (THREADS * LINES_PER_THREAD) as u64
    );
}

#[test]
fn test_concurrent_one_shot_calls_are_not_interleaved() {
    let sink = MemorySink::new();
    let logger = bare_logger(sink.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                let pad = t.to_string().repeat(64);
                for s in 0..LINES_PER_THREAD {
                    logger.info_lv(&[
                        LV::new("thread", t),
                        LV::new("seq", s),
                        LV::new("pad", pad.as_str()),
                    ]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    check_complete(&sink.lines());
}

#[test]
fn test_mixed_entry_points() {
    let sink = MemorySink::new();
    let logger = bare_logger(sink.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                let pad = t.to_string().repeat(32);
                for s in 0..LINES_PER_THREAD {
                    match s % 3 {
                        0 => logger
                            .error()
                            .u64("thread", t as u64)
                            .u64("seq", s as u64)
                            .str("pad", &pad)
                            .log(),
                        1 => logger
                            .lvs()
                            .lv("thread", t)
                            .lv("seq", s)
                            .str("pad", &pad)
                            .info(),
                        _ => logger.log(
                            LogLevel::Debug,
                            &[
                                LV::new("thread", t),
                                LV::new("seq", s),
                                LV::new("pad", pad.as_str()),
                            ],
                        ),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    check_complete(&sink.lines());
}

#[test]
fn test_concurrent_file_writes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("stress.log");

    let logger = Arc::new(Logger::new(
        FileSink::new(&log_file).expect("Failed to create sink"),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for s in 0..LINES_PER_THREAD {
                    logger.info().u64("thread", t as u64).u64("seq", s as u64).log();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    logger.flush().expect("Failed to flush");

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * LINES_PER_THREAD);
    for line in lines {
        assert!(line.starts_with("time:"), "line {:?}", line);
        assert!(line.contains("\tlevel:Info\tthread:"), "line {:?}", line);
    }
}

#[test]
fn test_error_carriers_across_threads() {
    let sink = MemorySink::new();
    let logger = Arc::new(Logger::builder().sink(sink.clone()).time_label("").build());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for s in 0..100 {
                    let err = ErrorFields::new(format!("failure {}", s)).u64("thread", t as u64);
                    logger.err(&err);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), THREADS * 100);
    assert!(lines
        .iter()
        .all(|l| l.starts_with("level:Error\terr:failure ") && l.contains("\tthread:")));
}
