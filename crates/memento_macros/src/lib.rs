// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(hidden)]

//! Macros for the [`memento`](https://docs.rs/memento) crate.

use memento_macros_impl::cache_key_derive_impl;
use proc_macro::TokenStream;

/// Derives `memento::CacheKey` from the fields marked `#[cache_key]`.
#[cfg_attr(test, mutants::skip)] // The macro is tested indirectly through the `memento` crate's tests, so we can skip it in mutation testing here.
#[proc_macro_derive(CacheKey, attributes(cache_key))]
pub fn cache_key(input: TokenStream) -> TokenStream {
    let output = cache_key_derive_impl(input.into());
    output.into()
}
