// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Region naming helpers.
//!
//! A region is a named partition of the key space that can be deleted in bulk.
//! Backends with hierarchical storage should keep one sub-map per region.
//! Flat key-value backends can instead qualify every key with a reserved prefix
//! token and delete a region by prefix scan:
//!
//! ```
//! use memento_store::region::{qualified_key, region_prefix};
//!
//! assert_eq!(qualified_key("user:1", Some("users")), "Region=##users##user:1");
//! assert_eq!(qualified_key("user:1", None), "user:1");
//! assert!(qualified_key("user:1", Some("users")).starts_with(&region_prefix("users")));
//! ```
//!
//! The prefix scheme collides if an application key happens to start with the
//! reserved token. That risk is accepted for flat backends only.

use std::borrow::Cow;

const REGION_TOKEN_START: &str = "Region=##";
const REGION_TOKEN_END: &str = "##";

/// Maps blank region names to "no region".
///
/// `None`, the empty string and whitespace-only names all address the
/// unpartitioned part of a store.
#[must_use]
pub fn normalize_region(region: Option<&str>) -> Option<&str> {
    region.filter(|name| !name.trim().is_empty())
}

/// Returns the reserved prefix token for `region`.
#[must_use]
pub fn region_prefix(region: &str) -> String {
    format!("{REGION_TOKEN_START}{region}{REGION_TOKEN_END}")
}

/// Qualifies `key` with the prefix token of `region`.
///
/// Keys without a (non-blank) region are returned unchanged.
#[must_use]
pub fn qualified_key<'a>(key: &'a str, region: Option<&str>) -> Cow<'a, str> {
    match normalize_region(region) {
        Some(region) => Cow::Owned(region_prefix(region) + key),
        None => Cow::Borrowed(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_regions_normalize_to_none() {
        assert_eq!(normalize_region(None), None);
        assert_eq!(normalize_region(Some("")), None);
        assert_eq!(normalize_region(Some("  \t")), None);
        assert_eq!(normalize_region(Some("orders")), Some("orders"));
    }

    #[test]
    fn same_key_in_different_regions_qualifies_differently() {
        let first = qualified_key("k", Some("R1"));
        let second = qualified_key("k", Some("R2"));
        assert_ne!(first, second);
        assert!(!first.starts_with(&region_prefix("R2")));
    }

    #[test]
    fn unregioned_key_is_borrowed() {
        assert!(matches!(qualified_key("k", Some(" ")), Cow::Borrowed("k")));
    }
}
