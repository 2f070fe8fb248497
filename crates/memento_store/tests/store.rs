// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `CacheStore` provided methods and `DynamicStore`.

use std::collections::HashMap;
use std::sync::Mutex;

use memento_store::{CacheStore, DynamicStore, DynamicStoreExt, Error, ItemPolicy, Result, region::qualified_key};

/// Minimal implementation that only provides required methods
#[derive(Default)]
struct MinimalStore {
    data: Mutex<HashMap<String, i32>>,
}

impl CacheStore<i32> for MinimalStore {
    fn add(&self, key: &str, value: i32, _policy: ItemPolicy, region: Option<&str>) -> Result<bool> {
        let mut data = self.data.lock().expect("lock poisoned");
        let key = qualified_key(key, region).into_owned();
        if data.contains_key(&key) {
            return Ok(false);
        }
        data.insert(key, value);
        Ok(true)
    }

    fn get(&self, key: &str, region: Option<&str>) -> Result<Option<i32>> {
        Ok(self.data.lock().expect("lock poisoned").get(qualified_key(key, region).as_ref()).copied())
    }

    fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
        Ok(self.data.lock().expect("lock poisoned").contains_key(qualified_key(key, region).as_ref()))
    }

    fn delete(&self, key: &str, region: Option<&str>) -> Result<()> {
        self.data.lock().expect("lock poisoned").remove(qualified_key(key, region).as_ref());
        Ok(())
    }

    fn delete_region(&self, _region: &str) -> Result<()> {
        Err(Error::from_message("regions not supported"))
    }
}

#[test]
fn default_len_is_unknown() {
    let store = MinimalStore::default();
    assert_eq!(store.len(), None);
    assert_eq!(store.is_empty(), None);
}

#[test]
fn add_optional_some_adds() {
    let store = MinimalStore::default();
    assert!(store.add_optional("k", Some(1), ItemPolicy::NoExpiration, None).expect("add failed"));
    assert_eq!(store.get("k", None).expect("get failed"), Some(1));
}

#[test]
fn add_optional_none_is_not_stored() {
    let store = MinimalStore::default();
    assert!(!store.add_optional("k", None, ItemPolicy::NoExpiration, None).expect("add failed"));
    assert!(!store.contains("k", None).expect("contains failed"));
}

#[test]
fn dynamic_store_shares_backend_between_clones() {
    let first: DynamicStore<i32> = MinimalStore::default().into_dynamic();
    let second = first.clone();

    first.add("k", 5, ItemPolicy::NoExpiration, Some("R")).expect("add failed");

    assert_eq!(second.get("k", Some("R")).expect("get failed"), Some(5));
    second.delete("k", Some("R")).expect("delete failed");
    assert!(!first.contains("k", Some("R")).expect("contains failed"));
}

#[test]
fn dynamic_store_forwards_errors() {
    let store = DynamicStore::new(MinimalStore::default());
    let error = store.delete_region("R").expect_err("should fail");
    assert!(error.to_string().contains("regions not supported"));
}

#[cfg(feature = "test-util")]
mod mock {
    use memento_store::testing::{MockStore, StoreOp};

    use super::*;

    #[test]
    fn mock_records_operations_with_regions() {
        let store = MockStore::new();
        store.add("k", 1, ItemPolicy::absolute_secs(5), Some("R")).expect("add failed");
        let _ = store.get("k", None).expect("get failed");

        assert_eq!(
            store.operations(),
            vec![
                StoreOp::Add {
                    key: "k".to_string(),
                    value: 1,
                    policy: ItemPolicy::absolute_secs(5),
                    region: Some("R".to_string()),
                },
                StoreOp::Get {
                    key: "k".to_string(),
                    region: None,
                },
            ]
        );
        assert_eq!(store.policy_of("k", Some("R")), Some(ItemPolicy::absolute_secs(5)));
    }
}
