// src/hash_ring.rs

//! A consistent hash ring over a fixed keyspace of `MAX_ENTRIES` slots.
//!
//! Every entry owns a half-open range of slots. A key is hashed onto a slot
//! and served by the active entry whose range contains it. Membership grows
//! in two phases: `add` carves a staged (inactive) range out of the largest
//! active one, and the returned `PendingAdd` is later committed or aborted.

use crate::entry::Entry;
use crate::error::RingError;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Size of the keyspace. Each entry needs at least one slot, so this is
/// also the most entries a ring can hold.
pub const MAX_ENTRIES: u64 = 256;

/// Maps a key onto its keyspace slot.
pub fn slot_of(key: &[u8]) -> u64 {
    xxhash_rust::xxh64::xxh64(key, 0) % MAX_ENTRIES
}

/// A half-open slot interval `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRange {
    pub low: u64,
    pub high: u64,
}

impl SlotRange {
    pub fn new(low: u64, high: u64) -> Self {
        SlotRange { low, high }
    }

    pub fn len(&self) -> u64 {
        self.high.saturating_sub(self.low)
    }

    pub fn is_empty(&self) -> bool {
        self.high <= self.low
    }

    pub fn contains(&self, slot: u64) -> bool {
        self.low <= slot && slot < self.high
    }

    pub fn overlaps(&self, other: &SlotRange) -> bool {
        self.low.max(other.low) < self.high.min(other.high)
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}

/// What `state`/`states` report about an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryState {
    pub active: bool,
    pub range: SlotRange,
}

/// An entry placed on a `HashRing`.
///
/// `active == false` means the entry is staged and does not serve lookups yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRingEntry<E> {
    id: u64,
    entry: E,
    active: bool,
    range: SlotRange,
}

impl<E> HashRingEntry<E> {
    pub fn entry(&self) -> &E {
        &self.entry
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn range(&self) -> SlotRange {
        self.range
    }

    pub fn state(&self) -> EntryState {
        EntryState {
            active: self.active,
            range: self.range,
        }
    }
}

impl<E: Entry> fmt::Display for HashRingEntry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = if self.active { "T" } else { "F" };
        write!(f, "{}:{} ({})", self.entry.key(), self.range, active)
    }
}

// Iteration order: ascending by (high, low).
fn by_range<E>(a: &HashRingEntry<E>, b: &HashRingEntry<E>) -> Ordering {
    (a.range.high, a.range.low).cmp(&(b.range.high, b.range.low))
}

#[derive(Debug)]
struct Entries<E> {
    list: Vec<HashRingEntry<E>>,
    next_id: u64,
}

impl<E> Entries<E> {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.list.iter().position(|e| e.id == id)
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut HashRingEntry<E>> {
        self.list.iter_mut().find(|e| e.id == id)
    }

    fn sort(&mut self) {
        self.list.sort_by(by_range);
    }

    fn is_full(&self) -> bool {
        self.list.len() as u64 >= MAX_ENTRIES
    }

    /// Resolves a slot to the active entry serving it.
    ///
    /// Starts at the entry containing the slot (or, for an uncovered slot,
    /// the last entry sorting before it) and walks backwards in sort order
    /// until an active entry turns up.
    fn lookup(&self, slot: u64) -> Option<&HashRingEntry<E>> {
        let end = match self.list.iter().position(|e| e.range.contains(slot)) {
            Some(i) => i + 1,
            None => self.list.iter().take_while(|e| e.range.high <= slot).count(),
        };
        self.list[..end].iter().rev().find(|e| e.active)
    }
}

/// A consistent hash ring with staged, two-phase membership changes.
///
/// All state sits behind one reader/writer lock: lookups and introspection
/// share it, mutations take it exclusively. Entries are kept sorted by
/// `(high, low)` after every mutation.
#[derive(Debug)]
pub struct HashRing<E> {
    inner: RwLock<Entries<E>>,
}

impl<E> Default for HashRing<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E> HashRing<E> {
    /// Creates a ring with no entries.
    pub fn empty() -> Self {
        HashRing {
            inner: RwLock::new(Entries {
                list: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Creates a ring whose entries evenly partition the keyspace.
    ///
    /// Entry `i` of `n` gets `[i * span, (i + 1) * span)` with
    /// `span = MAX_ENTRIES / n`; the last entry also takes the remainder.
    /// All entries start active.
    pub fn new<I>(entries: I) -> Result<Self, RingError>
    where
        I: IntoIterator<Item = E>,
    {
        let entries: Vec<E> = entries.into_iter().collect();
        let n = entries.len() as u64;
        if n > MAX_ENTRIES {
            return Err(RingError::Full {
                capacity: MAX_ENTRIES as usize,
            });
        }
        if n == 0 {
            return Ok(Self::empty());
        }

        let span = MAX_ENTRIES / n;
        let list = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let i = i as u64;
                let high = if i == n - 1 { MAX_ENTRIES } else { (i + 1) * span };
                HashRingEntry {
                    id: i,
                    entry,
                    active: true,
                    range: SlotRange::new(i * span, high),
                }
            })
            .collect();
        debug!(entries = n, span, "partitioned hash ring");

        Ok(HashRing {
            inner: RwLock::new(Entries { list, next_id: n }),
        })
    }

    /// Number of entries, staged ones included.
    pub fn len(&self) -> usize {
        self.inner.read().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().list.is_empty()
    }
}

impl<E: Entry> HashRing<E> {
    /// Adds an entry over an explicit range. The entry is active at once.
    ///
    /// Fails without touching the ring if it is full, the range is empty or
    /// outside the keyspace, or the range overlaps any existing entry.
    pub fn add_declared(&self, entry: E, low: u64, high: u64) -> Result<(), RingError> {
        let range = SlotRange::new(low, high);
        let mut inner = self.inner.write();
        if inner.is_full() {
            debug!(key = entry.key(), "hash ring full, declared entry rejected");
            return Err(RingError::Full {
                capacity: MAX_ENTRIES as usize,
            });
        }
        if range.is_empty() || range.high > MAX_ENTRIES {
            return Err(RingError::InvalidRange { range });
        }
        if let Some(existing) = inner.list.iter().find(|e| e.range.overlaps(&range)) {
            debug!(key = entry.key(), %range, existing = existing.entry.key(), "declared range overlaps");
            return Err(RingError::Overlap {
                key: existing.entry.key().to_string(),
                range,
            });
        }

        debug!(key = entry.key(), %range, "declared entry");
        let id = inner.allocate_id();
        inner.list.push(HashRingEntry {
            id,
            entry,
            active: true,
            range,
        });
        inner.sort();
        Ok(())
    }

    /// Removes the first entry with `key`. Its slots are left uncovered.
    pub fn remove(&self, key: &str) -> Option<E> {
        let mut inner = self.inner.write();
        let pos = inner.list.iter().position(|e| e.entry.key() == key)?;
        let removed = inner.list.remove(pos);
        debug!(key, range = %removed.range, "removed entry");
        Some(removed.entry)
    }

    /// Reports whether the first entry with `key` is active, and its range.
    pub fn state(&self, key: &str) -> Option<EntryState> {
        self.inner
            .read()
            .list
            .iter()
            .find(|e| e.entry.key() == key)
            .map(HashRingEntry::state)
    }

    /// Visits every entry in sort order until `visit` returns `false`.
    ///
    /// The read lock is held for the whole walk; `visit` must not mutate this ring.
    pub fn states<F>(&self, mut visit: F)
    where
        F: FnMut(&str, EntryState) -> bool,
    {
        let inner = self.inner.read();
        for e in &inner.list {
            if !visit(e.entry.key(), e.state()) {
                break;
            }
        }
    }
}

impl<E: Entry + Clone> HashRing<E> {
    /// Resolves `key` to the entry serving it.
    ///
    /// When the entry owning the key's slot is staged, the nearest active
    /// entry before it in sort order serves instead. Returns `None` only if
    /// there is no such entry.
    pub fn get(&self, key: &[u8]) -> Option<E> {
        let slot = slot_of(key);
        self.inner.read().lookup(slot).map(|e| e.entry.clone())
    }

    /// Stages `entry` over the upper half of the largest active range.
    ///
    /// The source entry shrinks to the lower half immediately, while the new
    /// entry stays inactive until the returned `PendingAdd` is committed.
    /// Aborting it restores the ring exactly.
    pub fn add(&self, entry: E) -> Result<PendingAdd<'_, E>, RingError> {
        let mut inner = self.inner.write();
        if inner.is_full() {
            debug!(key = entry.key(), "hash ring full, entry rejected");
            return Err(RingError::Full {
                capacity: MAX_ENTRIES as usize,
            });
        }

        let source = inner
            .list
            .iter_mut()
            .filter(|e| e.active)
            .max_by_key(|e| e.range.len());
        let source = match source {
            Some(source) if source.range.len() >= 2 => source,
            _ => {
                debug!(key = entry.key(), "no active range to split");
                return Err(RingError::NoSplittableEntry);
            }
        };

        let mid = source.range.low + source.range.len() / 2;
        let range = SlotRange::new(mid, source.range.high);
        source.range.high = mid;
        let source_id = source.id;
        let previous_owner = source.entry.clone();

        debug!(
            key = entry.key(),
            %range,
            source = previous_owner.key(),
            "staged entry"
        );

        let staged_id = inner.allocate_id();
        inner.list.push(HashRingEntry {
            id: staged_id,
            entry,
            active: false,
            range,
        });
        inner.sort();

        Ok(PendingAdd {
            ring: self,
            staged_id,
            source_id,
            previous_owner,
            range,
        })
    }

    /// A copy of every entry in sort order.
    pub fn snapshot(&self) -> Vec<HashRingEntry<E>> {
        self.inner.read().list.clone()
    }
}

impl<E: Entry> fmt::Display for HashRing<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.write_str("[")?;
        for (i, e) in inner.list.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e}")?;
        }
        f.write_str("]")
    }
}

/// A staged entry waiting to be committed or aborted.
///
/// Dropping it resolves nothing: the staged range stays inactive, and
/// keys hashing into it keep falling back to the previous owner.
#[must_use = "a staged entry stays inactive until it is committed or aborted"]
pub struct PendingAdd<'r, E: Entry> {
    ring: &'r HashRing<E>,
    staged_id: u64,
    source_id: u64,
    previous_owner: E,
    range: SlotRange,
}

impl<E: Entry> PendingAdd<'_, E> {
    /// The entry whose range was split to make room.
    pub fn previous_owner(&self) -> &E {
        &self.previous_owner
    }

    /// The range the new entry takes over once committed.
    pub fn range(&self) -> SlotRange {
        self.range
    }

    pub fn low(&self) -> u64 {
        self.range.low
    }

    pub fn high(&self) -> u64 {
        self.range.high
    }

    /// Activates the staged entry.
    ///
    /// Returns `false` if the entry was removed from the ring in the meantime.
    pub fn commit(self) -> bool {
        let mut inner = self.ring.inner.write();
        match inner.find_mut(self.staged_id) {
            Some(staged) => {
                staged.active = true;
                debug!(key = staged.entry.key(), range = %staged.range, "committed entry");
                true
            }
            None => false,
        }
    }

    /// Removes the staged entry and hands its range back to the previous owner.
    ///
    /// Returns `false` if the entry was removed from the ring in the meantime.
    pub fn abort(self) -> bool {
        let mut inner = self.ring.inner.write();
        let Some(pos) = inner.position(self.staged_id) else {
            return false;
        };
        let staged = inner.list.remove(pos);
        if let Some(source) = inner.find_mut(self.source_id) {
            source.range.high = staged.range.high;
        }
        inner.sort();
        debug!(
            key = staged.entry.key(),
            range = %staged.range,
            source = self.previous_owner.key(),
            "aborted entry"
        );
        true
    }
}

impl<E: Entry> fmt::Debug for PendingAdd<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAdd")
            .field("previous_owner", &self.previous_owner.key())
            .field("range", &self.range)
            .finish()
    }
}
