// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `InMemoryStore`.

use std::{sync::Arc, thread, time::Duration};

use memento_memory::InMemoryStore;
use memento_store::{CacheStore, DynamicStoreExt, ItemPolicy};
use tick::ClockControl;

fn store_with_control() -> (InMemoryStore<String>, ClockControl) {
    let control = ClockControl::new();
    let store = InMemoryStore::builder(control.to_clock()).name("test").build();
    (store, control)
}

#[test]
fn add_then_get_returns_value() {
    let (store, _control) = store_with_control();

    assert!(store.add("k", "v".to_string(), ItemPolicy::NoExpiration, None).unwrap());
    assert_eq!(store.get("k", None).unwrap().as_deref(), Some("v"));
    assert!(store.contains("k", None).unwrap());
}

#[test]
fn add_does_not_overwrite_live_entry() {
    let (store, _control) = store_with_control();

    assert!(store.add("k", "first".to_string(), ItemPolicy::NoExpiration, None).unwrap());
    assert!(!store.add("k", "second".to_string(), ItemPolicy::NoExpiration, None).unwrap());
    assert_eq!(store.get("k", None).unwrap().as_deref(), Some("first"));
}

#[test]
fn regions_are_isolated() {
    let (store, _control) = store_with_control();

    store.add("k", "one".to_string(), ItemPolicy::NoExpiration, Some("R1")).unwrap();
    store.add("k", "two".to_string(), ItemPolicy::NoExpiration, Some("R2")).unwrap();
    store.add("k", "none".to_string(), ItemPolicy::NoExpiration, None).unwrap();

    assert_eq!(store.get("k", Some("R1")).unwrap().as_deref(), Some("one"));
    assert_eq!(store.get("k", Some("R2")).unwrap().as_deref(), Some("two"));
    assert_eq!(store.get("k", None).unwrap().as_deref(), Some("none"));
    assert_eq!(store.len(), Some(3));
}

#[test]
fn delete_region_removes_only_that_region() {
    let (store, _control) = store_with_control();

    store.add("a", "1".to_string(), ItemPolicy::NoExpiration, Some("R1")).unwrap();
    store.add("b", "2".to_string(), ItemPolicy::NoExpiration, Some("R1")).unwrap();
    store.add("a", "3".to_string(), ItemPolicy::NoExpiration, Some("R2")).unwrap();
    store.add("a", "4".to_string(), ItemPolicy::NoExpiration, None).unwrap();

    store.delete_region("R1").unwrap();

    assert!(!store.contains("a", Some("R1")).unwrap());
    assert!(!store.contains("b", Some("R1")).unwrap());
    assert!(store.contains("a", Some("R2")).unwrap());
    assert!(store.contains("a", None).unwrap());
    assert_eq!(store.region_count(), 1);
}

#[test]
fn delete_region_with_blank_name_is_noop() {
    let (store, _control) = store_with_control();
    store.add("a", "1".to_string(), ItemPolicy::NoExpiration, None).unwrap();

    store.delete_region("").unwrap();
    store.delete_region("   ").unwrap();

    assert_eq!(store.len(), Some(1));
}

#[test]
fn delete_missing_key_is_ok() {
    let (store, _control) = store_with_control();
    store.delete("missing", None).unwrap();
    store.delete("missing", Some("nowhere")).unwrap();
}

#[test]
fn deleting_last_key_drops_its_region() {
    let (store, _control) = store_with_control();
    store.add("a", "1".to_string(), ItemPolicy::NoExpiration, Some("R1")).unwrap();
    store.add("b", "2".to_string(), ItemPolicy::NoExpiration, Some("R1")).unwrap();
    store.add("a", "3".to_string(), ItemPolicy::NoExpiration, Some("R2")).unwrap();

    store.delete("a", Some("R1")).unwrap();
    assert_eq!(store.region_count(), 2);

    store.delete("b", Some("R1")).unwrap();
    assert_eq!(store.region_count(), 1);
    assert_eq!(store.get("a", Some("R2")).unwrap().as_deref(), Some("3"));

    assert!(store.add("b", "4".to_string(), ItemPolicy::NoExpiration, Some("R1")).unwrap());
    assert_eq!(store.region_count(), 2);
}

#[test]
fn absolute_expiration_elapses() {
    let (store, control) = store_with_control();
    store.add("k", "v".to_string(), ItemPolicy::absolute_secs(10), None).unwrap();

    control.advance(Duration::from_secs(9));
    assert!(store.get("k", None).unwrap().is_some());

    control.advance(Duration::from_secs(1));
    assert_eq!(store.get("k", None).unwrap(), None);
    assert!(!store.contains("k", None).unwrap());
}

#[test]
fn sliding_expiration_is_extended_by_reads() {
    let (store, control) = store_with_control();
    store.add("k", "v".to_string(), ItemPolicy::sliding_secs(10), Some("R")).unwrap();

    for _ in 0..5 {
        control.advance(Duration::from_secs(8));
        assert!(store.get("k", Some("R")).unwrap().is_some());
    }

    control.advance(Duration::from_secs(10));
    assert_eq!(store.get("k", Some("R")).unwrap(), None);
}

#[test]
fn contains_does_not_extend_sliding_expiration() {
    let (store, control) = store_with_control();
    store.add("k", "v".to_string(), ItemPolicy::sliding_secs(10), None).unwrap();

    control.advance(Duration::from_secs(8));
    assert!(store.contains("k", None).unwrap());

    control.advance(Duration::from_secs(2));
    assert!(!store.contains("k", None).unwrap());
}

#[test]
fn purge_expired_reclaims_entries_and_empty_regions() {
    let (store, control) = store_with_control();
    store.add("a", "1".to_string(), ItemPolicy::absolute_secs(5), Some("R1")).unwrap();
    store.add("b", "2".to_string(), ItemPolicy::absolute_secs(5), None).unwrap();
    store.add("c", "3".to_string(), ItemPolicy::NoExpiration, Some("R2")).unwrap();

    control.advance(Duration::from_secs(5));

    assert_eq!(store.purge_expired(), 2);
    assert_eq!(store.region_count(), 1);
    assert_eq!(store.len(), Some(1));
}

#[test]
fn clear_removes_everything() {
    let (store, _control) = store_with_control();
    store.add("a", "1".to_string(), ItemPolicy::NoExpiration, Some("R1")).unwrap();
    store.add("b", "2".to_string(), ItemPolicy::NoExpiration, None).unwrap();

    store.clear();

    assert_eq!(store.is_empty(), Some(true));
    assert_eq!(store.region_count(), 0);
}

#[test]
fn clones_share_state() {
    let (store, _control) = store_with_control();
    let dynamic = store.clone().into_dynamic();

    dynamic.add("k", "v".to_string(), ItemPolicy::NoExpiration, Some("R")).unwrap();

    assert!(store.contains("k", Some("R")).unwrap());
    assert_eq!(store.name(), Some("test"));
}

#[test]
fn concurrent_adds_admit_exactly_one_winner() {
    let control = ClockControl::new();
    let store = Arc::new(InMemoryStore::<usize>::new(control.to_clock()));

    let winners: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|id| {
                let store = Arc::clone(&store);
                scope.spawn(move || usize::from(store.add("k", id, ItemPolicy::NoExpiration, Some("R")).unwrap()))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).sum()
    });

    assert_eq!(winners, 1);
    assert_eq!(store.len(), Some(1));
}
