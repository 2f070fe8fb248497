// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for settings resolution.

use std::sync::Arc;

use memento::{CacheSettings, CallSite, ConfigErrorKind, MethodCache, SettingsRepository};
use memento_store::testing::MockStore;

#[test]
fn contexts_switch_caching_per_call_site() {
    let repository = Arc::new(SettingsRepository::new());
    repository.register("cached", CacheSettings::new()).unwrap();
    repository.register("live", CacheSettings::disabled()).unwrap();
    let cache = MethodCache::<i32, _>::with_settings(MockStore::new(), repository);

    let cached = cache.cached(CallSite::new("Prices", "list")).context("cached").build().unwrap();
    let live = cache.cached(CallSite::new("Prices", "quote")).context("live").build().unwrap();

    assert_eq!(cached.get_or_insert(&[], || 1), 1);
    assert_eq!(cached.get_or_insert(&[], || 2), 1);
    assert_eq!(live.get_or_insert(&[], || 1), 1);
    assert_eq!(live.get_or_insert(&[], || 2), 2);
    assert_eq!(cache.store().entry_count(), 1);
}

#[test]
fn call_site_context_is_used_by_default() {
    let repository = Arc::new(SettingsRepository::new());
    repository.add("type-level", CacheSettings::disabled());
    let cache = MethodCache::<i32, _>::with_settings(MockStore::new(), repository);

    let method = cache
        .cached(CallSite::new("Prices", "quote").with_context("type-level"))
        .build()
        .unwrap();

    assert!(!method.settings().cache_enabled());
}

#[test]
fn unknown_context_uses_defaults() {
    let cache = MethodCache::<i32, _>::with_settings(MockStore::new(), Arc::new(SettingsRepository::new()));

    let settings = cache.resolve_settings(Some("nowhere"));

    assert_eq!(*settings, CacheSettings::default());
    assert!(Arc::ptr_eq(&settings, &cache.resolve_settings(None)));
}

#[test]
fn duplicate_registration_is_rejected() {
    let repository = SettingsRepository::new();
    repository.register("ctx", CacheSettings::new()).unwrap();

    let error = repository.register("ctx", CacheSettings::disabled()).unwrap_err();

    assert_eq!(error.kind(), &ConfigErrorKind::DuplicateContext("ctx".to_string()));
    assert!(repository.resolve(Some("ctx")).cache_enabled());
}

#[test]
fn global_repository_backs_new_caches() {
    let context = "settings-test-global-context";
    SettingsRepository::global().add(context, CacheSettings::disabled());
    let cache = MethodCache::<i32, _>::new(MockStore::new());

    assert!(!cache.resolve_settings(Some(context)).cache_enabled());
    assert!(std::ptr::eq(cache.settings_repository(), SettingsRepository::global()));
}

#[cfg(feature = "serde")]
#[test]
fn settings_deserialize_with_defaults() {
    let settings: CacheSettings = serde_json::from_str(r#"{ "disable_cache_logging": true }"#).unwrap();
    assert!(settings.cache_enabled());
    assert!(settings.disable_cache_logging());

    let settings: CacheSettings = serde_json::from_str(r#"{ "cache_enabled": false }"#).unwrap();
    assert_eq!(settings, CacheSettings::disabled());

    let json = serde_json::to_string(&CacheSettings::default()).unwrap();
    assert_eq!(json, r#"{"cache_enabled":true,"disable_cache_logging":false}"#);
}
