//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store invariants over arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use crate::cache::{CacheStore, LruTracker, TtlPolicy};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates cache keys shaped like `category:user:range`
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,48}".prop_map(|s| s)
}

fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,128}".prop_map(|s| s)
}

/// Unique keys, in generation order
fn unique_keys_strategy(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(valid_key_strategy(), range).prop_map(|keys| {
        let mut seen = HashSet::new();
        keys.into_iter()
            .filter(|key| seen.insert(key.clone()))
            .collect()
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Statistics track every read and write exactly.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut expected_sets: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value, None);
                    expected_sets += 1;
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.sets, expected_sets, "Sets mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // A value read back before expiry is the value written.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), value.clone(), Some(Duration::from_secs(60)));

        prop_assert_eq!(store.get(&key), Some(value));
    }

    // Reading never alters the stored value.
    #[test]
    fn prop_get_is_idempotent(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        reads in 1usize..20
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        store.set(key.clone(), value.clone(), None);

        for _ in 0..reads {
            prop_assert_eq!(store.get(&key), Some(value.clone()));
        }

        let entry = store.peek(&key).unwrap();
        prop_assert_eq!(&entry.value, &value);
        prop_assert_eq!(entry.hit_count, reads as u64);
        prop_assert_eq!(store.len(), 1);
    }

    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), value, None);
        prop_assert!(store.delete(&key));
        prop_assert!(store.get(&key).is_none(), "Key should not exist after delete");
        prop_assert!(!store.delete(&key), "Second delete finds nothing");
    }

    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), value1, None);
        store.set(key.clone(), value2.clone(), None);

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // The store never holds more than its capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..200
        )
    ) {
        let max_entries = 50;
        let mut store = CacheStore::new(max_entries, TEST_DEFAULT_TTL);

        for (key, value) in entries {
            store.set(key, value, None);
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // Inserting max_size + 1 distinct keys leaves max_size entries and drops the LRU key.
    #[test]
    fn prop_lru_eviction_order(
        keys in unique_keys_strategy(3..12),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy()
    ) {
        prop_assume!(keys.len() >= 2);
        prop_assume!(!keys.contains(&new_key));

        let capacity = keys.len();
        let mut store = CacheStore::new(capacity, TEST_DEFAULT_TTL);

        for key in &keys {
            store.set(key.clone(), format!("value_{}", key), None);
        }
        prop_assert_eq!(store.len(), capacity);

        store.set(new_key.clone(), new_value, None);

        prop_assert_eq!(store.len(), capacity, "Cache should remain at capacity after eviction");
        prop_assert!(store.get(&keys[0]).is_none(), "Oldest key '{}' should have been evicted", keys[0]);
        prop_assert!(store.get(&new_key).is_some());
        for key in keys.iter().skip(1) {
            prop_assert!(store.get(key).is_some(), "Key '{}' should still exist", key);
        }
    }

    // A read makes its key the most recently used, so it survives the next eviction.
    #[test]
    fn prop_lru_access_tracking(
        keys in unique_keys_strategy(3..10),
        access_index in any::<prop::sample::Index>(),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy()
    ) {
        prop_assume!(keys.len() >= 3);
        prop_assume!(!keys.contains(&new_key));

        let capacity = keys.len();
        let mut store = CacheStore::new(capacity, TEST_DEFAULT_TTL);

        for key in &keys {
            store.set(key.clone(), format!("value_{}", key), None);
        }

        let accessed = access_index.index(capacity);
        store.get(&keys[accessed]);

        let expected_evicted = if accessed == 0 { &keys[1] } else { &keys[0] };
        store.set(new_key.clone(), new_value, None);

        prop_assert!(store.peek(&keys[accessed]).is_some(), "Accessed key should not be evicted");
        prop_assert!(store.peek(expected_evicted).is_none(), "Key '{}' should have been evicted", expected_evicted);
        prop_assert!(store.peek(&new_key).is_some());
    }

    // The arena tracker agrees with a naive recency list.
    #[test]
    fn prop_lru_tracker_matches_reference(ops in prop::collection::vec((0u8..3, 0u8..8), 1..100)) {
        let mut lru = LruTracker::new();
        let mut reference: Vec<String> = Vec::new();

        for (op, id) in ops {
            let key = format!("k{}", id);
            match op {
                0 => {
                    lru.touch(&key);
                    reference.retain(|k| k != &key);
                    reference.insert(0, key);
                }
                1 => {
                    lru.remove(&key);
                    reference.retain(|k| k != &key);
                }
                _ => {
                    prop_assert_eq!(lru.evict_oldest(), reference.pop());
                }
            }
            prop_assert_eq!(lru.iter().collect::<Vec<_>>(), reference.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn prop_ttl_policy_fallback(category in "[a-z]{1,12}", default_ms in 1u64..1_000_000) {
        let policy = TtlPolicy::new(Duration::from_millis(default_ms));
        prop_assert_eq!(policy.resolve(Some(&category)), Duration::from_millis(default_ms));
    }
}

// Expiry checks run on the paused tokio clock, so cases cost no wall time.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        ttl_ms in 1u64..10_000
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        rt.block_on(async move {
            let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
            store.set(key.clone(), value.clone(), Some(Duration::from_millis(ttl_ms)));

            prop_assert_eq!(store.get(&key), Some(value));

            tokio::time::advance(Duration::from_millis(ttl_ms)).await;

            prop_assert!(store.get(&key).is_none(), "Entry should not be found after TTL expires");
            prop_assert!(store.is_empty(), "Expired entry should be removed from storage");
            Ok(())
        })?;
    }
}

// == Concurrent Access ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Concurrent tasks sharing one store keep it within capacity and consistent.
    #[test]
    fn prop_concurrent_operation_correctness(
        initial_entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..20
        ),
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async move {
            let store = crate::cache::shared::<String>(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

            {
                let mut cache = store.write().await;
                for (key, value) in &initial_entries {
                    cache.set(key.clone(), value.clone(), None);
                }
            }

            let mut handles = vec![];
            for op in operations {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    let mut cache = store.write().await;
                    match op {
                        CacheOp::Set { key, value } => cache.set(key, value, None),
                        CacheOp::Get { key } => {
                            cache.get(&key);
                        }
                        CacheOp::Delete { key } => {
                            cache.delete(&key);
                        }
                    }
                }));
            }

            for handle in handles {
                handle.await.expect("Task should not panic");
            }

            let cache = store.read().await;
            let stats = cache.stats();

            prop_assert!(stats.total_entries <= TEST_MAX_ENTRIES);
            prop_assert_eq!(stats.total_entries, cache.keys().len());
            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=100.0).contains(&hit_rate), "Hit rate out of range: {}", hit_rate);
            Ok(())
        })?;
    }
}
