#![cfg(test)]

// Property tests for the probe table kept inside the crate so they can
// check structural invariants after every step.

use crate::config::MapConfig;
use crate::int_map::IntMap;
use crate::iter::Cursor;
use crate::probe::SlotHasher;
use crate::str_map::StrMap;
use proptest::prelude::*;

// Pool-indexed operations: indices shrink to earlier keys, pool length
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Delete(usize),
    Get(usize),
    Mutate(usize, i32),
    Grow,
    Iterate,
    CursorWalk(usize),
}

fn arb_op(pool_len: usize) -> impl Strategy<Value = OpI> {
    let idx = 0..pool_len;
    prop_oneof![
        4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
        3 => idx.clone().prop_map(OpI::Delete),
        2 => idx.clone().prop_map(OpI::Get),
        1 => (idx, any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
        1 => Just(OpI::Grow),
        1 => Just(OpI::Iterate),
        1 => (0usize..8).prop_map(OpI::CursorWalk),
    ]
}

// Keys are multiples of a small stride so that, under the identity hash,
// many of them share a home slot.
fn arb_int_scenario() -> impl Strategy<Value = (u32, Vec<i64>, Vec<OpI>)> {
    (0u32..4, 1i64..=16, 1usize..=24).prop_flat_map(|(cap_log2, stride, n)| {
        let pool: Vec<i64> = (0..n as i64).map(|i| i * stride - 8 * stride).collect();
        proptest::collection::vec(arb_op(n), 1..80)
            .prop_map(move |ops| (cap_log2, pool.clone(), ops))
    })
}

/// Insertion-ordered reference model: update keeps the position, delete
/// followed by set appends.
#[derive(Default)]
struct Model<K> {
    entries: Vec<(K, i32)>,
}

impl<K: PartialEq + Clone> Model<K> {
    fn set(&mut self, k: K, v: i32) -> Option<i32> {
        match self.entries.iter_mut().find(|(mk, _)| *mk == k) {
            Some((_, mv)) => Some(std::mem::replace(mv, v)),
            None => {
                self.entries.push((k, v));
                None
            }
        }
    }

    fn delete(&mut self, k: &K) -> Option<i32> {
        let at = self.entries.iter().position(|(mk, _)| mk == k)?;
        Some(self.entries.remove(at).1)
    }

    fn get(&self, k: &K) -> Option<i32> {
        self.entries.iter().find(|(mk, _)| mk == k).map(|&(_, v)| v)
    }

    fn get_mut(&mut self, k: &K) -> Option<&mut i32> {
        self.entries.iter_mut().find(|(mk, _)| mk == k).map(|(_, v)| v)
    }
}

// Property: state-machine equivalence of IntMap against an ordered model.
// Invariants exercised across random operation sequences:
// - `set` overwrites in place and never duplicates a key, tombstones or not.
// - `get`/`contains_key` parity; deleted keys are never found.
// - Iteration yields exactly the live entries, in insertion order.
// - `len` parity, `len` below threshold, and the table's structural
//   invariants after every step, across growth and tombstone purges.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_int_map_state_machine((cap_log2, pool, ops) in arb_int_scenario()) {
        let mut sut: IntMap<i32> = IntMap::new(1 << cap_log2).unwrap();
        let mut model: Model<i64> = Model::default();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    let k = pool[i];
                    let prev = sut.insert(k, v).unwrap();
                    prop_assert_eq!(prev, model.set(k, v));
                }
                OpI::Delete(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.remove(k), model.delete(&k));
                    prop_assert!(!sut.contains_key(k));
                }
                OpI::Get(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(k).copied(), model.get(&k));
                    prop_assert_eq!(sut.contains_key(k), model.get(&k).is_some());
                }
                OpI::Mutate(i, d) => {
                    let k = pool[i];
                    match (sut.get_mut(k), model.get_mut(&k)) {
                        (Some(sv), Some(mv)) => {
                            *sv = sv.wrapping_add(d);
                            *mv = mv.wrapping_add(d);
                        }
                        (None, None) => {}
                        _ => {
                            prop_assert!(false, "get_mut presence differs for {}", k);
                        }
                    }
                }
                OpI::Grow => {
                    if sut.capacity() < 1024 {
                        let before = sut.capacity();
                        sut.grow().unwrap();
                        prop_assert!(sut.capacity() >= before * 2);
                        prop_assert_eq!(sut.tombstones(), 0);
                    }
                }
                OpI::Iterate => {
                    let got: Vec<(i64, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                    prop_assert_eq!(&got, &model.entries);
                    prop_assert_eq!(sut.iter().len(), model.entries.len());
                }
                OpI::CursorWalk(steps) => {
                    let mut cursor = Cursor::start();
                    for expected in model.entries.iter().take(steps) {
                        prop_assert_eq!(sut.next_entry(&mut cursor), Some((expected.0, &expected.1)));
                    }
                    if steps >= model.entries.len() {
                        prop_assert_eq!(sut.next_key(&mut cursor), None);
                    }
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.len(), model.entries.len());
            prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
            prop_assert!(sut.is_empty() || sut.len() < sut.threshold());
            sut.assert_invariants();
        }

        let keys: Vec<i64> = sut.keys().copied().collect();
        let expected: Vec<i64> = model.entries.iter().map(|&(k, _)| k).collect();
        prop_assert_eq!(keys, expected);
    }
}

// Collision variant: every byte string hashes to zero, so all keys share
// one probe walk and equality alone tells them apart.
#[derive(Clone, Copy, Default)]
struct ConstHash;

impl SlotHasher<[u8]> for ConstHash {
    fn hash_key(&self, _key: &[u8]) -> u64 {
        0
    }
}

fn arb_str_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-c]{0,3}", 1..=10).prop_flat_map(|pool| {
        let n = pool.len();
        proptest::collection::vec(arb_op(n), 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: StrMap under total hash collision matches the ordered model,
// including across forced growth and tombstone purges.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_str_map_all_collide((pool, ops) in arb_str_scenario()) {
        let config = MapConfig::new(4).with_tombstone_ratio(0.25);
        let mut sut: StrMap<String, i32, ConstHash> = StrMap::with_config(config, ConstHash).unwrap();
        let mut model: Model<String> = Model::default();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    let k = pool[i].clone();
                    let prev = sut.insert(k.clone(), v).unwrap().map(|(_, old)| old);
                    prop_assert_eq!(prev, model.set(k, v));
                }
                OpI::Delete(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.remove(k), model.delete(k));
                }
                OpI::Get(i) | OpI::Mutate(i, _) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k).copied(), model.get(k));
                }
                OpI::Grow => {
                    if sut.capacity() < 256 {
                        sut.grow().unwrap();
                    }
                }
                OpI::Iterate | OpI::CursorWalk(_) => {
                    let got: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(&got, &model.entries);
                }
            }
            prop_assert_eq!(sut.len(), model.entries.len());
            sut.assert_invariants();
        }
    }
}
