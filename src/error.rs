// src/error.rs

use crate::hash_ring::SlotRange;

/// Errors produced when building rings or changing hash ring membership.
///
/// A failed mutation never leaves the ring partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// The hash ring already holds one entry per keyspace slot.
    #[error("hash ring is full ({capacity} entries)")]
    Full { capacity: usize },

    /// No active entry has a range wide enough to be split in two.
    #[error("no active entry with a splittable range")]
    NoSplittableEntry,

    /// A declared range intersects the range of an existing entry.
    #[error("range {range} overlaps entry `{key}`")]
    Overlap { key: String, range: SlotRange },

    /// A declared range is empty or reaches past the keyspace.
    #[error("invalid range {range}")]
    InvalidRange { range: SlotRange },

    /// An immutable ring needs at least one value.
    #[error("immutable ring `{ring}` requires at least one value")]
    EmptyValues { ring: String },

    /// Two or more values passed to an immutable ring share a key.
    #[error("immutable ring `{ring}` has duplicated keys [{}]", keys.join(", "))]
    DuplicateKeys { ring: String, keys: Vec<String> },

    /// The ring would be too large to address with a 32-bit sequence.
    #[error("immutable ring `{ring}` cannot hold {len} values")]
    TooManyValues { ring: String, len: usize },
}
