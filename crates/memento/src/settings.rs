// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Named cache settings contexts.

use std::sync::{Arc, LazyLock};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::{ConfigError, ConfigErrorKind};

/// Settings that apply to every call site bound to one context.
///
/// # Examples
///
/// ```
/// use memento::CacheSettings;
///
/// let settings = CacheSettings::default().with_cache_logging_disabled(true);
/// assert!(settings.cache_enabled());
/// assert!(settings.disable_cache_logging());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(default))]
pub struct CacheSettings {
    cache_enabled: bool,
    disable_cache_logging: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            disable_cache_logging: false,
        }
    }
}

impl CacheSettings {
    /// Creates settings with caching and logging enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates settings that bypass the cache.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default().with_cache_enabled(false)
    }

    /// Sets whether results are cached.
    #[must_use]
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Sets whether cache decisions are logged.
    #[must_use]
    pub fn with_cache_logging_disabled(mut self, disabled: bool) -> Self {
        self.disable_cache_logging = disabled;
        self
    }

    /// Returns `true` if results are cached.
    #[must_use]
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Returns `true` if cache decisions are not logged.
    #[must_use]
    pub fn disable_cache_logging(&self) -> bool {
        self.disable_cache_logging
    }
}

static GLOBAL: LazyLock<SettingsRepository> = LazyLock::new(SettingsRepository::new);

/// Maps context names to [`CacheSettings`].
///
/// Contexts are append-only: the first registration of a name wins and later
/// ones never overwrite it. Safe to use from many threads without external locking.
///
/// # Examples
///
/// ```
/// use memento::{CacheSettings, SettingsRepository};
///
/// let repository = SettingsRepository::new();
/// assert!(repository.add("reports", CacheSettings::disabled()));
/// assert!(!repository.add("reports", CacheSettings::default()));
///
/// assert!(!repository.resolve(Some("reports")).cache_enabled());
/// assert!(repository.resolve(Some("unknown")).cache_enabled());
/// assert!(repository.resolve(None).cache_enabled());
/// ```
#[derive(Debug)]
pub struct SettingsRepository {
    contexts: DashMap<String, Arc<CacheSettings>>,
    default: Arc<CacheSettings>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
            default: Arc::new(CacheSettings::default()),
        }
    }

    /// Returns the process-wide repository.
    ///
    /// Call sites resolve their settings here unless they are built from a
    /// [`MethodCache`](crate::MethodCache) that was given its own repository.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Adds settings for `context`.
    ///
    /// Returns `false` and leaves the existing settings untouched if the context is already present.
    pub fn add(&self, context: impl Into<String>, settings: impl Into<Arc<CacheSettings>>) -> bool {
        match self.contexts.entry(context.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(settings.into());
                true
            }
        }
    }

    /// Adds settings for `context`, treating an existing context as a configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::DuplicateContext`] if the context is already present.
    pub fn register(&self, context: impl Into<String>, settings: impl Into<Arc<CacheSettings>>) -> Result<(), ConfigError> {
        let context = context.into();
        match self.contexts.entry(context) {
            Entry::Occupied(occupied) => Err(ConfigError::new(ConfigErrorKind::DuplicateContext(occupied.key().clone()))),
            Entry::Vacant(vacant) => {
                vacant.insert(settings.into());
                Ok(())
            }
        }
    }

    /// Returns the settings registered for `context`.
    #[must_use]
    pub fn get(&self, context: &str) -> Option<Arc<CacheSettings>> {
        self.contexts.get(context).map(|settings| Arc::clone(settings.value()))
    }

    /// Returns the shared default settings: caching and logging enabled.
    #[must_use]
    pub fn default_settings(&self) -> Arc<CacheSettings> {
        Arc::clone(&self.default)
    }

    /// Returns the settings for `context`, or the defaults when the context is
    /// blank, absent or unknown.
    #[must_use]
    pub fn resolve(&self, context: Option<&str>) -> Arc<CacheSettings> {
        context
            .filter(|name| !name.trim().is_empty())
            .and_then(|name| self.get(name))
            .unwrap_or_else(|| self.default_settings())
    }

    /// Returns the number of registered contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns `true` if no context is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn default_settings_are_enabled_with_logging() {
        let settings = SettingsRepository::new().default_settings();
        assert!(settings.cache_enabled());
        assert!(!settings.disable_cache_logging());
    }

    #[test]
    fn default_settings_are_shared() {
        let repository = SettingsRepository::new();
        assert!(Arc::ptr_eq(&repository.default_settings(), &repository.resolve(None)));
    }

    #[test]
    fn first_writer_wins() {
        let repository = SettingsRepository::new();
        assert!(repository.add("ctx", CacheSettings::disabled()));
        assert!(!repository.add("ctx", CacheSettings::new()));
        assert_eq!(repository.get("ctx").as_deref(), Some(&CacheSettings::disabled()));
    }

    #[test]
    fn register_rejects_duplicates() {
        let repository = SettingsRepository::new();
        repository.register("ctx", CacheSettings::new()).unwrap();

        let error = repository.register("ctx", CacheSettings::disabled()).unwrap_err();

        assert_eq!(error.kind(), &ConfigErrorKind::DuplicateContext("ctx".to_string()));
        assert!(repository.get("ctx").unwrap().cache_enabled());
    }

    #[test]
    fn blank_context_resolves_to_default() {
        let repository = SettingsRepository::new();
        repository.add(" ", CacheSettings::disabled());
        assert!(repository.resolve(Some(" ")).cache_enabled());
    }

    #[test]
    fn concurrent_adds_admit_one_writer() {
        let repository = SettingsRepository::new();

        let successes = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| repository.add("shared", CacheSettings::new())))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).filter(|added| *added).count()
        });

        assert_eq!(successes, 1);
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn global_is_a_single_instance() {
        assert!(std::ptr::eq(SettingsRepository::global(), SettingsRepository::global()));
    }
}
