// src/bin/round_robin_perf_main.rs

use rust_rings::entry::Item;
use rust_rings::ring_buffer::ImmutableRing;

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// --- Dispatcher Task Function ---
fn dispatcher_task(ring: Arc<ImmutableRing<Item>>, id: usize, iterations: u64) -> HashMap<String, u64> {
    info!(dispatcher = id, "dispatcher thread started");
    let mut hits: HashMap<String, u64> = HashMap::new();
    for _ in 0..iterations {
        let item = ring.next();
        *hits.entry(item.key.clone()).or_default() += 1;
    }
    info!(dispatcher = id, "dispatcher thread finished");
    hits
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    const VALUES: usize = 6;
    const THREADS: usize = 4;
    const ITERATIONS_PER_THREAD: u64 = 10_000_000;

    let values: Vec<Item> = (0..VALUES as u64).map(|i| Item::new(format!("worker-{i}"), i)).collect();
    let ring = match ImmutableRing::new("workers", values) {
        Ok(ring) => Arc::new(ring),
        Err(e) => {
            error!(%e, "could not build ring");
            return;
        }
    };
    info!(%ring, capacity = ring.capacity(), "ring ready");

    let start = Instant::now();
    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || dispatcher_task(ring, id, ITERATIONS_PER_THREAD))
        })
        .collect();

    let mut totals: HashMap<String, u64> = HashMap::new();
    for handle in handles {
        match handle.join() {
            Ok(hits) => {
                for (key, n) in hits {
                    *totals.entry(key).or_default() += n;
                }
            }
            Err(_) => error!("dispatcher thread panicked"),
        }
    }
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let total_calls = THREADS as u64 * ITERATIONS_PER_THREAD;
    println!("\n--- Round Robin Results ---");
    println!("Threads: {THREADS}, calls per thread: {ITERATIONS_PER_THREAD}");
    println!("Elapsed Time: {elapsed_ms} ms");
    if elapsed_ms > 0 {
        println!("Throughput: {} ops/sec", (total_calls * 1000) / elapsed_ms);
    } else {
        println!("Throughput: N/A (elapsed time is 0 or too short)");
    }

    let mut keys: Vec<_> = totals.into_iter().collect();
    keys.sort();
    for (key, n) in keys {
        println!("{key}: {n} ({:.2}%)", n as f64 * 100.0 / total_calls as f64);
    }
}
