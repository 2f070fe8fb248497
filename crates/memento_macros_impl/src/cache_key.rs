// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `#[derive(CacheKey)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Index, Member, Result, parse2};

const MARKER: &str = "cache_key";

/// Returns `true` if `field` carries the `#[cache_key]` marker.
fn is_marked(field: &Field) -> Result<bool> {
    let mut marked = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(MARKER)) {
        attr.meta.require_path_only()?;
        marked = true;
    }
    Ok(marked)
}

/// Derives `memento::CacheKey` for a struct.
///
/// The key is the concatenation of the `Display` output of every field marked
/// with `#[cache_key]`, in declaration order, without separators.
///
/// # Errors
///
/// Fails for enums and unions, for structs with no marked field, and for markers
/// that carry arguments.
pub fn cache_key(input: TokenStream) -> Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "CacheKey can only be derived for structs"));
    };

    let mut members = Vec::new();
    for (index, field) in data_struct.fields.iter().enumerate() {
        if is_marked(field)? {
            members.push(
                field
                    .ident
                    .clone()
                    .map_or_else(|| Member::Unnamed(Index::from(index)), Member::Named),
            );
        }
    }

    if members.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "CacheKey derive requires at least one field marked with #[cache_key]",
        ));
    }

    let format = "{}".repeat(members.len());

    Ok(quote! {
        impl #impl_generics ::memento::CacheKey for #name #ty_generics #where_clause {
            fn cache_key(&self) -> ::std::string::String {
                ::std::format!(#format, #(&self.#members),*)
            }
        }
    })
}
