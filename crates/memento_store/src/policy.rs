// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Expiration policies and their translation into deadlines.

use std::time::{Duration, Instant};

/// The expiration rule attached to a cache entry.
///
/// Absolute and sliding expiration are mutually exclusive; the enum makes it
/// impossible to request both for the same entry.
///
/// # Examples
///
/// ```
/// use memento_store::ItemPolicy;
/// use std::time::Duration;
///
/// assert_eq!(ItemPolicy::absolute_secs(0), ItemPolicy::NoExpiration);
/// assert_eq!(
///     ItemPolicy::sliding_secs(30).sliding_expiration(),
///     Some(Duration::from_secs(30))
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ItemPolicy {
    /// The entry stays until it is deleted.
    #[default]
    NoExpiration,

    /// The entry expires a fixed time after it was added.
    Absolute(Duration),

    /// The entry expires after a period without reads. Every successful read re-arms the window.
    Sliding(Duration),
}

impl ItemPolicy {
    /// Creates an absolute expiration of `seconds`. Zero means no expiration.
    #[must_use]
    pub fn absolute_secs(seconds: u64) -> Self {
        if seconds == 0 {
            Self::NoExpiration
        } else {
            Self::Absolute(Duration::from_secs(seconds))
        }
    }

    /// Creates a sliding expiration of `seconds`. Zero means no expiration.
    #[must_use]
    pub fn sliding_secs(seconds: u64) -> Self {
        if seconds == 0 {
            Self::NoExpiration
        } else {
            Self::Sliding(Duration::from_secs(seconds))
        }
    }

    /// Returns the absolute expiration, if this is an absolute policy.
    #[must_use]
    pub fn absolute_expiration(&self) -> Option<Duration> {
        match self {
            Self::Absolute(duration) => Some(*duration),
            Self::NoExpiration | Self::Sliding(_) => None,
        }
    }

    /// Returns the sliding window, if this is a sliding policy.
    #[must_use]
    pub fn sliding_expiration(&self) -> Option<Duration> {
        match self {
            Self::Sliding(duration) => Some(*duration),
            Self::NoExpiration | Self::Absolute(_) => None,
        }
    }

    /// Translates the policy into an [`Expiry`] for an entry added at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use memento_store::ItemPolicy;
    /// use std::time::{Duration, Instant};
    ///
    /// let now = Instant::now();
    /// let expiry = ItemPolicy::absolute_secs(60).expiry(now);
    /// assert_eq!(expiry.expires_at(), Some(now + Duration::from_secs(60)));
    /// assert!(!expiry.is_expired(now));
    /// ```
    #[must_use]
    pub fn expiry(&self, now: Instant) -> Expiry {
        match self {
            Self::NoExpiration => Expiry::never(),
            Self::Absolute(duration) => Expiry {
                expires_at: now.checked_add(*duration),
                sliding: None,
            },
            Self::Sliding(window) => Expiry {
                expires_at: now.checked_add(*window),
                sliding: Some(*window),
            },
        }
    }
}

/// The deadline state of a stored entry.
///
/// Created from an [`ItemPolicy`] when the entry is added. A deadline that does not
/// fit in an [`Instant`] is treated as "never expires".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Expiry {
    expires_at: Option<Instant>,
    sliding: Option<Duration>,
}

impl Expiry {
    /// An expiry that never elapses.
    #[must_use]
    pub fn never() -> Self {
        Self {
            expires_at: None,
            sliding: None,
        }
    }

    /// Returns the current deadline, if any.
    #[must_use]
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Returns the sliding window, if any.
    #[must_use]
    pub fn sliding(&self) -> Option<Duration> {
        self.sliding
    }

    /// Returns `true` once `now` has reached the deadline.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Re-arms a sliding deadline after a successful read at `now`.
    ///
    /// Absolute deadlines are left untouched.
    pub fn touch(&mut self, now: Instant) {
        if let Some(window) = self.sliding {
            self.expires_at = now.checked_add(window);
        }
    }
}
