// src/lib.rs

pub mod entry;
pub mod error;
pub mod hash_ring;
pub mod ring_buffer;
pub mod sequencer;

pub use entry::{Entry, Item};
pub use error::RingError;
pub use hash_ring::{EntryState, HashRing, HashRingEntry, MAX_ENTRIES, PendingAdd, SlotRange, slot_of};
pub use ring_buffer::ImmutableRing;
pub use sequencer::Sequence;
