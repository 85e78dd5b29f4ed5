//! Simulated I/O-bound work spread across a worker pool
//!
//! Run with `RUST_LOG=concurrently=debug cargo run --example fetch_lengths`
//! to see dispatch logs.

use concurrently::prelude::*;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Pretend to download a page and return its size
fn fetch(url: &String) -> usize {
    thread::sleep(Duration::from_millis(20));
    url.len() * 100
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let urls: Vec<String> = (0..64).map(|i| format!("https://host-{}.example/page", i)).collect();

    let started = Instant::now();
    let serial = map_serial(&urls, fetch);
    println!("map_serial: {} pages in {:?}", serial.len(), started.elapsed());

    for num_workers in [4, 16, 64] {
        let started = Instant::now();
        let sizes = map(&urls, fetch, num_workers)?;
        assert_eq!(sizes, serial);
        println!("map with {:>2} workers: {:?}", num_workers, started.elapsed());
    }

    let pool = WorkerPool::new(PoolConfig::new().with_num_workers(16).with_thread_name_prefix("fetch"))?;
    let large = pool.filter(&urls, |url| fetch(url) > 2750)?;
    println!("{} pages larger than 2750 bytes", large.len());

    pool.each(&urls, |url| {
        tracing::info!(%url, "visited");
    })?;

    Ok(())
}
