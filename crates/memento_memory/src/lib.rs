// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Concurrent in-memory store for method-result caching.
//!
//! This crate provides [`InMemoryStore`], a [`CacheStore`](memento_store::CacheStore)
//! backed by `dashmap`. Every region lives in its own sub-map, so deleting a region
//! never scans unrelated entries. Expiration is evaluated against an injected
//! [`tick::Clock`], which makes time-dependent behavior testable with a controlled clock.
//!
//! # Quick Start
//!
//! ```
//! use memento_memory::InMemoryStore;
//! use memento_store::{CacheStore, ItemPolicy};
//! use tick::runtime::InactiveClock;
//!
//! let (clock, _driver) = InactiveClock::default().activate();
//! let store = InMemoryStore::<String>::builder(clock).name("orders").build();
//!
//! store.add("order:1", "shipped".to_string(), ItemPolicy::absolute_secs(300), Some("orders")).unwrap();
//! assert_eq!(store.get("order:1", Some("orders")).unwrap().as_deref(), Some("shipped"));
//!
//! store.delete_region("orders").unwrap();
//! assert_eq!(store.get("order:1", Some("orders")).unwrap(), None);
//! ```
//!
//! # Expiration
//!
//! Expired entries are invisible to reads and are removed lazily when they are touched.
//! Call [`InMemoryStore::purge_expired`] to reclaim them eagerly.

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::InMemoryStoreBuilder;
#[doc(inline)]
pub use store::InMemoryStore;
