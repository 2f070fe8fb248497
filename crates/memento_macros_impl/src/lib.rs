// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(hidden)]

//! Macros for the [`memento`](https://docs.rs/memento) crate.

mod cache_key;

use proc_macro2::TokenStream;

pub use crate::cache_key::cache_key;

/// Expands `#[derive(CacheKey)]`, turning parse failures into compile errors.
#[must_use]
#[cfg_attr(test, mutants::skip)] // not relevant for auto-generated proc macros
pub fn cache_key_derive_impl(input: TokenStream) -> TokenStream {
    cache_key(input).unwrap_or_else(|err| err.to_compile_error())
}
