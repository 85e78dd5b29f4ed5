//! Behavioral properties shared by every dispatcher, checked across worker counts

use concurrently::prelude::*;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use std::thread;
use std::time::Duration;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn sequence(len: i64, multiple: i64) -> Vec<i64> {
    (0..len).map(|i| i * multiple).collect()
}

/// Sleeps a random few hundred microseconds so workers finish out of order
fn jitter() {
    let micros = rand::thread_rng().gen_range(0..400);
    thread::sleep(Duration::from_micros(micros));
}

fn worker_counts(len: usize) -> Vec<usize> {
    vec![1, 4, len.max(1), len.max(1) * 3]
}

#[test]
fn test_map_matches_serial() {
    init_tracing();
    let numbers = sequence(60, 1);
    let expected: Vec<i64> = numbers.iter().map(|n| n * n - 3).collect();

    assert_eq!(map_serial(&numbers, |n| n * n - 3), expected);
    for workers in worker_counts(numbers.len()) {
        let result = map(
            &numbers,
            |n| {
                jitter();
                n * n - 3
            },
            workers,
        )
        .unwrap();
        assert_eq!(result, expected, "workers = {}", workers);
    }
}

#[test]
fn test_filter_matches_serial() {
    init_tracing();
    let numbers = sequence(60, 1);
    let expected: Vec<i64> = numbers.iter().copied().filter(|n| n % 3 == 1).collect();

    assert_eq!(filter_serial(&numbers, |n| n % 3 == 1), expected);
    for workers in worker_counts(numbers.len()) {
        let result = filter(
            &numbers,
            |n| {
                jitter();
                n % 3 == 1
            },
            workers,
        )
        .unwrap();
        assert_eq!(result, expected, "workers = {}", workers);
    }
}

#[test]
fn test_each_invokes_exactly_once() {
    init_tracing();
    let len = 40;
    let indices: Vec<usize> = (0..len).collect();

    for workers in worker_counts(len) {
        let counts: Vec<AtomicUsize> = (0..len).map(|_| AtomicUsize::new(0)).collect();
        each(
            &indices,
            |&i| {
                jitter();
                counts[i].fetch_add(1, Ordering::SeqCst);
            },
            workers,
        )
        .unwrap();

        for (i, count) in counts.iter().enumerate() {
            assert_eq!(count.load(Ordering::SeqCst), 1, "index {} with {} workers", i, workers);
        }
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    init_tracing();
    let numbers = sequence(50, 7);
    let pool = WorkerPool::new(PoolConfig::new().with_num_workers(6)).unwrap();

    let first = pool
        .map(&numbers, |n| {
            jitter();
            n % 11
        })
        .unwrap();
    for _ in 0..5 {
        let again = pool
            .map(&numbers, |n| {
                jitter();
                n % 11
            })
            .unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_doubling_scenario() {
    let result = map(&sequence(10, 1), |n| n * 2, 4).unwrap();
    assert_eq!(result, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
}

#[test]
fn test_even_filter_scenario() {
    let result = filter(&sequence(10, 1), |n| n % 2 == 0, 4).unwrap();
    assert_eq!(result, vec![0, 2, 4, 6, 8]);
}

#[test]
fn test_empty_input_invokes_nothing() {
    let empty: Vec<i64> = Vec::new();
    let calls = AtomicUsize::new(0);
    let count = |_: &i64| {
        calls.fetch_add(1, Ordering::SeqCst);
    };

    for workers in [1, 5] {
        let mapped = map(
            &empty,
            |n| {
                count(n);
                *n
            },
            workers,
        )
        .unwrap();
        assert!(mapped.is_empty());

        let kept = filter(
            &empty,
            |n| {
                count(n);
                true
            },
            workers,
        )
        .unwrap();
        assert!(kept.is_empty());

        each(&empty, count, workers).unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invalid_worker_count_has_no_side_effects() {
    let numbers = sequence(10, 1);
    let calls = AtomicUsize::new(0);

    let err = each(
        &numbers,
        |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        },
        0,
    )
    .unwrap_err();

    assert!(err.is_contract_violation());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_operation_fails_whole_call() {
    init_tracing();
    let numbers = sequence(30, 1);

    let result = filter(
        &numbers,
        |n| {
            if *n == 17 {
                panic!("predicate failed on {}", n);
            }
            true
        },
        4,
    );

    match result {
        Err(Error::WorkerPanicked { message, .. }) => {
            assert_eq!(message, "predicate failed on 17");
        }
        other => panic!("expected a worker panic, got {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn test_panicking_each_fails_whole_call() {
    init_tracing();
    let numbers = sequence(30, 1);

    let result = each(
        &numbers,
        |n| {
            jitter();
            if *n == 13 {
                panic!("side effect failed on {}", n);
            }
        },
        4,
    );

    match result {
        Err(Error::WorkerPanicked { worker, message }) => {
            assert_eq!(worker, 1);
            assert_eq!(message, "side effect failed on 13");
        }
        other => panic!("expected a worker panic, got {:?}", other),
    }
}

#[test]
fn test_failing_try_map_fails_whole_call() {
    init_tracing();
    let numbers = sequence(30, 1);

    for workers in worker_counts(numbers.len()) {
        let result = try_map(
            &numbers,
            |n| {
                jitter();
                if *n == 21 {
                    Err(format!("cannot convert {}", n))
                } else {
                    Ok(n * 10)
                }
            },
            workers,
        );

        match result {
            Err(Error::Operation { index, source }) => {
                assert_eq!(index, 21, "workers = {}", workers);
                assert_eq!(source.to_string(), "cannot convert 21");
            }
            other => panic!("expected an operation error, got {:?}", other.map(|v| v.len())),
        }
    }
}

#[test]
fn test_panicking_try_map_fails_whole_call() {
    init_tracing();
    let numbers = sequence(30, 1);

    let result = try_map(
        &numbers,
        |n| -> Result<i64> {
            if *n == 8 {
                panic!("conversion exploded on {}", n);
            }
            Ok(*n)
        },
        4,
    );

    match result {
        Err(Error::WorkerPanicked { message, .. }) => {
            assert_eq!(message, "conversion exploded on 8");
        }
        other => panic!("expected a worker panic, got {:?}", other.map(|v| v.len())),
    }
}
