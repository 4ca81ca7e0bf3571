// IntMap integration suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Retrieval: every live key maps to its last-set value.
// - Growth: the table doubles before a new key would reach 0.60 of the
//   capacity; growth keeps live entries and forgets deleted ones.
// - Order: iteration follows first insertion; re-inserting a deleted key
//   moves it to the end.
// - Ownership: each stored value is dropped exactly once, whether by
//   overwrite, delete or teardown.
use probe_map::{Cursor, IntMap, MapConfig, MapError, MixHash};
use std::cell::Cell;
use std::rc::Rc;

// Test: growth scenario at the smallest interesting capacity.
// Assumes: capacity 8 has threshold 4.
// Verifies: the 4th insert doubles to 16 before placement; values and
// insertion order survive the rebuild.
#[test]
fn fourth_insert_into_capacity_eight_grows() {
    let mut m = IntMap::new(8).unwrap();
    assert_eq!(m.threshold(), 4);
    for (k, v) in [(1, "a"), (2, "b"), (3, "c")] {
        m.set(k, v).unwrap();
    }
    assert_eq!(m.capacity(), 8);

    m.set(4, "d").unwrap();
    assert_eq!(m.capacity(), 16);
    assert_eq!(m.len(), 4);
    for (k, v) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
        assert_eq!(m.get(k), Some(&v));
    }
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

// Test: tombstone-slot reuse.
// Verifies: a deleted key is absent, and setting it again makes it
// retrievable with the new value and counts it as live.
#[test]
fn delete_then_set_reuses_slot() {
    let mut m = IntMap::new(8).unwrap();
    m.set(5, "x").unwrap();
    assert!(m.delete(5));
    assert_eq!(m.get(5), None);
    assert_eq!(m.len(), 0);
    assert_eq!(m.tombstones(), 1);

    m.set(5, "y").unwrap();
    assert_eq!(m.get(5), Some(&"y"));
    assert_eq!(m.len(), 1);
    assert_eq!(m.tombstones(), 0);
}

// Test: second set of the same key.
// Verifies: the value is replaced and the live count is unchanged.
#[test]
fn set_twice_keeps_count() {
    let mut m = IntMap::new(8).unwrap();
    m.set(9, 1).unwrap();
    m.set(9, 2).unwrap();
    assert_eq!(m.get(9), Some(&2));
    assert_eq!(m.len(), 1);
}

// Test: deleting an absent key.
// Verifies: failure is reported and nothing changes, tombstones included.
#[test]
fn delete_absent_key_is_a_no_op() {
    let mut m = IntMap::new(8).unwrap();
    m.set(1, ()).unwrap();
    assert!(!m.delete(2));
    assert_eq!(m.len(), 1);
    assert_eq!(m.tombstones(), 0);
    assert_eq!(m.capacity(), 8);
}

// Test: bulk inserts across many doublings.
// Verifies: every key keeps its value; keys never inserted are absent;
// deleted keys stay gone after the next growth.
#[test]
fn growth_keeps_live_and_drops_deleted() {
    let mut m = IntMap::new(1).unwrap();
    for k in 0..1000i64 {
        m.set(k, k * 10).unwrap();
    }
    for k in (0..1000i64).step_by(3) {
        assert!(m.delete(k));
    }
    let before = m.capacity();
    for k in 1000..2000i64 {
        m.set(k, k * 10).unwrap();
    }
    assert!(m.capacity() > before);
    for k in 0..2000i64 {
        let expected = (k >= 1000 || k % 3 != 0).then_some(k * 10);
        assert_eq!(m.get(k).copied(), expected, "key {k}");
    }
    assert_eq!(m.get(-1), None);
    assert_eq!(m.get(2000), None);
    assert!(m.len() < m.threshold());
}

// Test: iteration order with deletes and re-inserts.
// Verifies: live keys in first-insertion order; a re-inserted key is last.
#[test]
fn iteration_follows_insertion_order() {
    let mut m = IntMap::new(16).unwrap();
    for k in [40, 7, 19, 3, 88] {
        m.set(k, k).unwrap();
    }
    m.delete(19);
    m.set(7, 700).unwrap();
    m.set(19, 190).unwrap();

    let pairs: Vec<(i64, i64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(pairs, vec![(40, 40), (7, 700), (3, 3), (88, 88), (19, 190)]);
    assert_eq!(m.values().copied().collect::<Vec<_>>(), vec![40, 700, 3, 88, 190]);
    assert_eq!((&m).into_iter().len(), 5);
}

// Test: key, value and entry cursor forms.
// Verifies: each form walks the same order and ends with None.
#[test]
fn cursor_forms_walk_the_same_order() {
    let mut m = IntMap::new(8).unwrap();
    m.set(2, 'b').unwrap();
    m.set(1, 'a').unwrap();

    let mut c = Cursor::start();
    assert_eq!(m.next_key(&mut c), Some(2));
    assert_eq!(m.next_key(&mut c), Some(1));
    assert_eq!(m.next_key(&mut c), None);

    let mut c = Cursor::default();
    assert_eq!(m.next_value(&mut c), Some(&'b'));
    assert_eq!(m.next_value(&mut c), Some(&'a'));
    assert_eq!(m.next_value(&mut c), None);

    let mut c = Cursor::start();
    assert_eq!(m.next_entry(&mut c), Some((2, &'b')));
    assert_eq!(m.next_entry(&mut c), Some((1, &'a')));
    assert_eq!(m.next_entry(&mut c), None);
}

// Test: cursor held across mutation without a rebuild.
// Verifies: entries appended after the cursor position are still visited;
// entries deleted ahead of it are skipped.
#[test]
fn cursor_sees_appends_and_skips_deletes() {
    let mut m = IntMap::new(32).unwrap();
    for k in 1..=3 {
        m.set(k, ()).unwrap();
    }
    let mut c = Cursor::start();
    assert_eq!(m.next_key(&mut c), Some(1));
    m.delete(2);
    m.set(4, ()).unwrap();
    assert_eq!(m.next_key(&mut c), Some(3));
    assert_eq!(m.next_key(&mut c), Some(4));
    assert_eq!(m.next_key(&mut c), None);
}

// Test: cursor held across delete/reinsert churn.
// Assumes: churn on a capacity-8 table fills the ordered index without any
// growth or purge.
// Verifies: the index grows in place, so the cursor still visits the key
// it had not reached and the keys appended after it.
#[test]
fn cursor_survives_ordered_index_growth() {
    let mut m = IntMap::new(8).unwrap();
    for k in 1..=3 {
        m.set(k, ()).unwrap();
    }
    let mut c = Cursor::start();
    assert_eq!(m.next_key(&mut c), Some(1));
    assert_eq!(m.next_key(&mut c), Some(2));

    m.delete(1);
    m.delete(2);
    for _ in 0..5 {
        m.set(9, ()).unwrap();
        m.delete(9);
    }
    m.set(10, ()).unwrap();
    m.set(11, ()).unwrap();
    assert_eq!(m.capacity(), 8);

    let rest: Vec<i64> = std::iter::from_fn(|| m.next_key(&mut c)).collect();
    assert_eq!(rest, vec![3, 10, 11]);
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![3, 10, 11]);
}

// Test: value ownership.
// Assumes: values are owned by the table.
// Verifies: overwrite drops the old value, delete drops the removed value,
// teardown drops the rest; each exactly once.
#[test]
fn values_are_dropped_exactly_once() {
    struct Tracked(Rc<Cell<usize>>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0));
    let mut m = IntMap::new(8).unwrap();
    for k in 0..10 {
        m.set(k, Tracked(drops.clone())).unwrap();
    }
    assert_eq!(drops.get(), 0, "growth must move values, not drop them");

    m.set(3, Tracked(drops.clone())).unwrap();
    assert_eq!(drops.get(), 1);

    assert!(m.delete(4));
    assert_eq!(drops.get(), 2);
    assert!(!m.delete(4));
    assert_eq!(drops.get(), 2);

    let taken = m.remove(5).unwrap();
    assert_eq!(drops.get(), 2);
    drop(taken);
    assert_eq!(drops.get(), 3);

    m.release();
    assert_eq!(drops.get(), 3 + 8);
    assert_eq!(Rc::strong_count(&drops), 1);
}

// Test: caller-owned values.
// Verifies: storing references leaves the referents alive and untouched.
#[test]
fn borrowed_values_stay_caller_owned() {
    let names = vec!["zero".to_string(), "one".to_string()];
    let mut m = IntMap::new(4).unwrap();
    m.set(0, &names[0]).unwrap();
    m.set(1, &names[1]).unwrap();
    m.delete(0);
    drop(m);
    assert_eq!(names[0], "zero");
}

// Test: bounded growth.
// Assumes: max_capacity 8 forbids doubling past 8 slots.
// Verifies: the insert that needs growth fails with CapacityExceeded and
// leaves the table as it was; updates keep working.
#[test]
fn capped_growth_reports_error_and_keeps_contents() {
    let cfg = MapConfig::new(8).with_max_capacity(8);
    let mut m = IntMap::with_config(cfg, MixHash).unwrap();
    for k in 0..3 {
        m.set(k, k).unwrap();
    }
    let err = m.set(3, 3).unwrap_err();
    assert_eq!(err, MapError::CapacityExceeded { requested: 16, max: 8 });
    assert_eq!(m.len(), 3);
    assert_eq!(m.capacity(), 8);
    assert_eq!(m.get(3), None);
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

    m.set(1, 100).unwrap();
    assert_eq!(m.get(1), Some(&100));
}

// Test: explicit grow.
// Verifies: capacity doubles, tombstones are evicted, contents persist.
#[test]
fn explicit_grow_doubles_and_purges() {
    let mut m = IntMap::new(16).unwrap();
    for k in 0..5 {
        m.set(k, k).unwrap();
    }
    m.delete(2);
    m.grow().unwrap();
    assert_eq!(m.capacity(), 32);
    assert_eq!(m.tombstones(), 0);
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![0, 1, 3, 4]);
}

// Test: slot array allocation failure.
// Verifies: a capacity the allocator cannot serve is reported as
// AllocationFailed instead of aborting.
#[cfg(target_pointer_width = "64")]
#[test]
fn unallocatable_capacity_is_reported() {
    assert_eq!(
        IntMap::<()>::new(1 << 62).err(),
        Some(MapError::AllocationFailed { slots: 1 << 62 })
    );
}

// Test: construction errors.
// Verifies: zero and non-power-of-two capacities are rejected.
#[test]
fn invalid_capacities_are_rejected() {
    assert_eq!(
        IntMap::<()>::new(0).err(),
        Some(MapError::InvalidCapacity { capacity: 0 })
    );
    assert_eq!(
        IntMap::<()>::new(10).err(),
        Some(MapError::InvalidCapacity { capacity: 10 })
    );
}
