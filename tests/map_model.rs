// HashMap property tests against the std::collections model.
//
// Property 1: op-sequence equivalence.
//  - Model: std::collections::HashMap over the same key space.
//  - Operations: insert, remove, get, get_or_insert_with, rehash, clear.
//  - Invariant after each step: the step's return value and len() agree
//    with the model.
//  - Final check: full iteration matches the model pair-for-pair.
//
// Property 2: structural equality and combined hash.
//  - Two maps fed the same pairs through different histories must compare
//    equal and hash equal.
use std::collections::HashMap as StdHashMap;
use std::hash::Hash;
use std::hash::Hasher;

use proptest::prelude::*;
use quad_hash::HashMap;
use siphasher::sip::SipHasher;

fn sip_hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = SipHasher::new_with_keys(3, 7);
    value.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #[test]
    fn prop_matches_std_model(
        ops in proptest::collection::vec((0u8..=5u8, 0u16..64u16, any::<u16>()), 1..400)
    ) {
        let mut map: HashMap<u16, u16> = HashMap::new();
        let mut model: StdHashMap<u16, u16> = StdHashMap::new();

        for (op, key, value) in ops {
            match op {
                0 | 1 => {
                    prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                }
                2 => {
                    prop_assert_eq!(map.remove(&key), model.remove(&key));
                }
                3 => {
                    prop_assert_eq!(map.get(&key), model.get(&key));
                }
                4 => {
                    let got = *map.get_or_insert_with(key, || value);
                    let expected = *model.entry(key).or_insert(value);
                    prop_assert_eq!(got, expected);
                }
                5 => {
                    // Maintenance only; contents must be untouched.
                    map.rehash();
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(map.len(), model.len());
            prop_assert_eq!(map.is_empty(), model.is_empty());
        }

        for (k, v) in map.iter() {
            prop_assert_eq!(model.get(k), Some(v));
        }
        let collected: StdHashMap<u16, u16> = map.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(collected, model);
    }

    #[test]
    fn prop_clear_resets_to_fresh_state(
        pairs in proptest::collection::vec((0u16..64u16, any::<u16>()), 0..100)
    ) {
        let mut map: HashMap<u16, u16> = HashMap::new();
        for (k, v) in &pairs {
            map.insert(*k, *v);
        }

        map.clear();
        prop_assert!(map.is_empty());
        for (k, _) in &pairs {
            prop_assert_eq!(map.get(k), None);
        }

        // The cleared map keeps working.
        map.insert(1, 1);
        prop_assert_eq!(map.len(), 1);
        prop_assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn prop_equal_contents_hash_equal(
        pairs in proptest::collection::vec((0u16..64u16, any::<u16>()), 0..100),
        churn in proptest::collection::vec(0u16..64u16, 0..100)
    ) {
        let mut a: HashMap<u16, u16> = HashMap::new();
        let mut b: HashMap<u16, u16> = HashMap::with_capacity(pairs.len() * 4);

        for (k, v) in &pairs {
            a.insert(*k, *v);
        }
        // Same final contents by a different route: churn first, insert in
        // reverse, then fix up removals.
        for k in &churn {
            b.insert(*k, 0);
        }
        for k in &churn {
            b.remove(k);
        }
        for (k, v) in pairs.iter().rev() {
            b.insert(*k, *v);
        }
        for k in &churn {
            if !pairs.iter().any(|(pk, _)| pk == k) {
                b.remove(k);
            }
        }
        // Reversed insertion means earlier duplicates won in `b`; replay the
        // forward order to converge on `a`'s values.
        for (k, v) in &pairs {
            b.insert(*k, *v);
        }

        prop_assert_eq!(&a, &b);
        prop_assert_eq!(sip_hash_of(&a), sip_hash_of(&b));
    }
}
