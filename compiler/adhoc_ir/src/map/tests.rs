#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn identity(v: &u32) -> u32 {
    *v
}

fn pair_key(v: &(u32, String)) -> u32 {
    v.0
}

// ── Sizing ──────────────────────────────────────────────────────

#[test]
fn test_choose_size_first_prime_above_double() {
    assert_eq!(choose_size(0), 7);
    assert_eq!(choose_size(3), 7);
    assert_eq!(choose_size(4), 13);
    assert_eq!(choose_size(500), 1021);
    assert_eq!(choose_size(10_000_000), 20_000_001);
}

#[test]
fn test_load_stays_at_most_half() {
    let mut map = NodeMap::create(identity, 1);
    for key in 1..=1000u32 {
        map.add(key).unwrap();
        assert!(map.len() * 2 <= map.capacity());
    }
}

// ── Add / retrieve ──────────────────────────────────────────────

#[test]
fn test_duplicate_rejected() {
    let mut map = NodeMap::create(pair_key, 4);
    assert_eq!(map.add((5, "a".into())), Ok(5));
    assert_eq!(map.add((5, "b".into())), Err(MapError::Duplicate { key: 5 }));
    assert_eq!(map.retrieve(5).map(|v| v.1.as_str()), Some("a"));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_reserved_key_rejected() {
    let mut map = NodeMap::create(identity, 4);
    assert_eq!(map.add(0), Err(MapError::ReservedKey));
    assert!(map.is_empty());
    assert_eq!(map.retrieve(0), None);
}

#[test]
fn test_colliding_keys_probe_past_each_other() {
    // 7, 14 and 21 share a home slot in a 7-slot table.
    let mut map = NodeMap::create(identity, 2);
    assert_eq!(map.capacity(), 7);
    map.add(7).unwrap();
    map.add(14).unwrap();
    map.add(21).unwrap();
    assert_eq!(map.retrieve(14), Some(&14));
    assert_eq!(map.retrieve(21), Some(&21));
    assert_eq!(map.retrieve(28), None);
}

#[test]
fn test_djb2_known_values() {
    assert_eq!(djb2(""), 5381);
    assert_eq!(djb2("a"), 5381 * 33 + 97);
    assert_ne!(djb2("ab"), djb2("ba"));
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn distinct_keys_all_retrievable(keys in prop::collection::hash_set(1u32..u32::MAX, 0..400)) {
        let mut map = NodeMap::create(identity, 4);
        for key in &keys {
            prop_assert_eq!(map.add(*key), Ok(*key));
        }
        for key in &keys {
            prop_assert_eq!(map.retrieve(*key), Some(key));
        }
        prop_assert!(map.iter().all(|(k, _)| k != 0));
        prop_assert_eq!(map.len(), keys.len());
    }

    #[test]
    fn destroy_visits_each_live_entry_once(keys in prop::collection::hash_set(1u32..50_000, 0..300)) {
        let mut map = NodeMap::create(identity, 0);
        for key in &keys {
            map.add(*key).unwrap();
        }
        let mut seen = Vec::new();
        let count = map.destroy(|v| seen.push(v));
        seen.sort_unstable();
        let mut expected: Vec<u32> = keys.iter().copied().collect();
        expected.sort_unstable();
        prop_assert_eq!(count, keys.len());
        prop_assert_eq!(seen, expected);
    }
}
