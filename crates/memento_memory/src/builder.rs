// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.

use std::marker::PhantomData;

use tick::Clock;

use crate::store::InMemoryStore;

/// Builder for configuring an [`InMemoryStore`].
///
/// # Examples
///
/// ```
/// use memento_memory::InMemoryStore;
/// use tick::runtime::InactiveClock;
///
/// let (clock, _driver) = InactiveClock::default().activate();
/// let store = InMemoryStore::<i32>::builder(clock)
///     .initial_capacity(128)
///     .name("lookups")
///     .build();
///
/// assert_eq!(store.name(), Some("lookups"));
/// ```
#[derive(Debug)]
pub struct InMemoryStoreBuilder<V> {
    pub(crate) clock: Clock,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
    _phantom: PhantomData<V>,
}

impl<V> InMemoryStoreBuilder<V> {
    /// Creates a builder whose store reads time from `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            initial_capacity: None,
            name: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the pre-allocation hint for unregioned entries.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name for the store, reported by [`InMemoryStore::name`].
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured store.
    #[must_use]
    pub fn build(self) -> InMemoryStore<V>
    where
        V: Clone + Send + Sync,
    {
        InMemoryStore::from_builder(self)
    }
}
