// src/sequencer.rs

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU32, Ordering};

/// A monotonically increasing 32-bit counter that owns its cache line.
///
/// Many threads hammer `next()` at once, so the counter is wrapped in
/// `CachePadded` to keep unrelated fields from sharing its line.
/// The counter wraps modulo 2^32.
#[derive(Debug, Default)]
pub struct Sequence {
    value: CachePadded<AtomicU32>,
}

impl Sequence {
    /// Creates a sequence whose first `next()` returns 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a sequence whose first `next()` returns `initial_value`.
    pub fn starting_at(initial_value: u32) -> Self {
        Sequence {
            value: CachePadded::new(AtomicU32::new(initial_value)),
        }
    }

    /// Atomically advances the sequence and returns the value before the increment.
    pub fn next(&self) -> u32 {
        self.value.fetch_add(1, Ordering::AcqRel)
    }

    /// Returns the last value handed out by `next()`.
    ///
    /// Before the first `next()` this is `initial_value - 1` (wrapping).
    pub fn value(&self) -> u32 {
        self.value.load(Ordering::Acquire).wrapping_sub(1)
    }
}
