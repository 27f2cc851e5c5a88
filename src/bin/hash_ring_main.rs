// src/bin/hash_ring_main.rs

use rust_rings::entry::Item;
use rust_rings::hash_ring::{HashRing, slot_of};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Finds a key whose slot lies in `[low, high)` so the walk-through is deterministic.
fn key_in(low: u64, high: u64) -> Option<String> {
    (0..100_000)
        .map(|i| format!("key-{i}"))
        .find(|k| (low..high).contains(&slot_of(k.as_bytes())))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let ring = match HashRing::new([Item::new("A", 1), Item::new("B", 2), Item::new("C", 3)]) {
        Ok(ring) => ring,
        Err(e) => {
            error!(%e, "could not build hash ring");
            return;
        }
    };
    info!(%ring, "initial ring");

    let Some(key) = key_in(213, 256) else {
        error!("no key found in the migrating range");
        return;
    };
    let lookup = |ring: &HashRing<Item>| ring.get(key.as_bytes()).map(|e| e.to_string());

    info!(key = %key, slot = slot_of(key.as_bytes()), owner = ?lookup(&ring), "before add");

    match ring.add(Item::new("D", 4)) {
        Ok(pending) => {
            info!(previous = %pending.previous_owner(), range = %pending.range(), %ring, "staged D");
            info!(key = %key, owner = ?lookup(&ring), "while staged");
            pending.commit();
            info!(%ring, key = %key, owner = ?lookup(&ring), "after commit");
        }
        Err(e) => error!(%e, "add failed"),
    }

    match ring.add(Item::new("E", 5)) {
        Ok(pending) => {
            info!(previous = %pending.previous_owner(), range = %pending.range(), %ring, "staged E");
            pending.abort();
            info!(%ring, "after abort");
        }
        Err(e) => error!(%e, "add failed"),
    }

    ring.states(|key, state| {
        println!("{key}: {} active={}", state.range, state.active);
        true
    });
}
