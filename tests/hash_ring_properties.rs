// tests/hash_ring_properties.rs

use proptest::prelude::*;
use rust_rings::hash_ring::{HashRing, MAX_ENTRIES, SlotRange, slot_of};

fn ring_of(n: usize) -> HashRing<String> {
    HashRing::new((0..n).map(|i| format!("n{i}"))).unwrap()
}

proptest! {
    #[test]
    fn prop_new_partitions_exactly(n in 1usize..=256) {
        let ring = ring_of(n);
        prop_assert_eq!(ring.len(), n);

        let mut next_low = 0;
        for e in ring.snapshot() {
            prop_assert!(e.is_active());
            prop_assert_eq!(e.range().low, next_low);
            prop_assert!(e.range().high > e.range().low);
            next_low = e.range().high;
        }
        prop_assert_eq!(next_low, MAX_ENTRIES);
    }

    #[test]
    fn prop_add_then_abort_is_identity(n in 1usize..=128, commits in 0usize..8) {
        let ring = ring_of(n);
        for i in 0..commits {
            let pending = ring.add(format!("c{i}")).unwrap();
            prop_assert!(pending.commit());
        }
        let before = ring.snapshot();

        let pending = ring.add("staged".to_string()).unwrap();
        prop_assert_eq!(ring.len(), before.len() + 1);
        prop_assert!(pending.abort());

        prop_assert_eq!(ring.snapshot(), before);
    }

    #[test]
    fn prop_add_then_commit_conserves_source_range(n in 1usize..=128) {
        let ring = ring_of(n);
        let largest = ring
            .snapshot()
            .into_iter()
            .map(|e| e.range().len())
            .max()
            .unwrap();

        let pending = ring.add("new".to_string()).unwrap();
        let source = pending.previous_owner().clone();
        let staged = pending.range();
        let source_after = ring.state(&source).unwrap().range;
        prop_assert!(pending.commit());

        prop_assert_eq!(source_after.high, staged.low);
        prop_assert_eq!(source_after.len() + staged.len(), largest);
        prop_assert!(ring.state("new").unwrap().active);
    }

    #[test]
    fn prop_overlapping_declared_range_is_rejected(
        n in 1usize..=64,
        low in 0u64..MAX_ENTRIES,
        width in 1u64..64,
    ) {
        let ring = ring_of(n);
        let before = ring.snapshot();
        let high = (low + width).min(MAX_ENTRIES);
        prop_assert!(ring.add_declared("declared".to_string(), low, high).is_err());
        prop_assert_eq!(ring.snapshot(), before);
    }

    #[test]
    fn prop_get_returns_active_owner_at_or_before_slot(
        n in 1usize..=64,
        staged in 0usize..4,
        key in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let ring = ring_of(n);
        for i in 0..staged {
            drop(ring.add(format!("s{i}")).unwrap());
        }

        let slot = slot_of(&key);
        let owner = ring.get(&key).unwrap();
        let entries = ring.snapshot();
        let owner_pos = entries.iter().position(|e| *e.entry() == owner).unwrap();
        let slot_pos = entries.iter().position(|e| e.range().contains(slot)).unwrap();

        prop_assert!(entries[owner_pos].is_active());
        prop_assert!(owner_pos <= slot_pos);
        prop_assert!(entries[owner_pos..slot_pos].iter().skip(1).all(|e| !e.is_active()));
        if entries[slot_pos].is_active() {
            prop_assert_eq!(owner_pos, slot_pos);
        }
        prop_assert!(SlotRange::new(0, MAX_ENTRIES).contains(slot));
    }
}
