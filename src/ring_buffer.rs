// src/ring_buffer.rs

use crate::entry::Entry;
use crate::error::RingError;
use crate::sequencer::Sequence;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A fixed set of values handed out round robin without locks.
///
/// The values are repeated cyclically to fill a power-of-two number of
/// slots, so a slot is found with `sequence & mask`. Nothing is inserted
/// or removed after construction; only the private `Sequence` moves.
pub struct ImmutableRing<E> {
    key: String,
    sequence: Sequence,
    entries: Box<[E]>,
    index_mask: u32,
}

impl<E: Entry + Clone> ImmutableRing<E> {
    /// Builds a ring named `key` from `values`.
    ///
    /// Fails if `values` is empty or if two values share a key.
    pub fn new(key: impl Into<String>, values: Vec<E>) -> Result<Self, RingError> {
        let key = key.into();
        if values.is_empty() {
            return Err(RingError::EmptyValues { ring: key });
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in &values {
            *counts.entry(value.key()).or_default() += 1;
        }
        let duplicated: Vec<String> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(k, _)| k.to_string())
            .collect();
        if !duplicated.is_empty() {
            return Err(RingError::DuplicateKeys {
                ring: key,
                keys: duplicated,
            });
        }

        let len = values.len();
        let capacity = match len.checked_next_power_of_two() {
            Some(capacity) if capacity <= 1 << 31 => capacity,
            _ => return Err(RingError::TooManyValues { ring: key, len }),
        };

        let entries: Box<[E]> = (0..capacity).map(|i| values[i % len].clone()).collect();

        debug!(ring = %key, values = len, capacity, "built immutable ring");

        Ok(ImmutableRing {
            key,
            sequence: Sequence::new(),
            entries,
            index_mask: (capacity - 1) as u32,
        })
    }
}

impl<E: Entry> ImmutableRing<E> {
    /// The name this ring was built with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of slots, always a power of two.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Advances the sequence and returns the value in the slot it lands on.
    pub fn next(&self) -> &E {
        self.slot(self.sequence.next())
    }

    /// Returns the value most recently handed out by `next()`.
    ///
    /// Before any `next()` call this is the last slot.
    pub fn head(&self) -> &E {
        self.slot(self.sequence.value())
    }

    /// Finds a value by key with a linear scan over every slot.
    pub fn get(&self, key: &str) -> Option<&E> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// Iterates over the slots in physical order, repeats included.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }

    fn slot(&self, sequence: u32) -> &E {
        &self.entries[(sequence & self.index_mask) as usize]
    }
}

impl<E: Entry> fmt::Display for ImmutableRing<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(e.key())?;
        }
        f.write_str("]")
    }
}

impl<E: Entry> fmt::Debug for ImmutableRing<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableRing")
            .field("key", &self.key)
            .field("capacity", &self.entries.len())
            .field("sequence", &self.sequence.value())
            .finish()
    }
}

// A ring can itself be a member of another ring, keyed by its name.
impl<E: Entry> Entry for ImmutableRing<E> {
    fn key(&self) -> &str {
        &self.key
    }
}
