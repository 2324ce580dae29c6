use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod fragment;
mod merge;

/// Derives [`Merge`](trait.Merge.html) for a struct.
///
/// Every field is merged recursively, so each field type must itself implement `Merge`.
/// Leaf values are typically wrapped in [`Option`], where `Some` in `self` wins over `defaults`.
///
/// # Supported attributes
///
/// ## `#[merge(path_overrides(merge = "path::to::merge"))]`
///
/// Overrides the path to the `merge` module (defaults to `::syndesis_operator::config::merge`).
/// Mostly useful inside the `syndesis_operator` crate itself.
///
/// ## `#[merge(bound = "T: Trait")]`
///
/// Adds extra where-clause predicates to the generated impl.
///
/// # Example
///
/// ```
/// # use syndesis_operator::config::merge::{Merge, merge};
/// #[derive(Merge, Debug, PartialEq, Eq)]
/// struct Image {
///     name: Option<String>,
///     tag: Option<String>,
/// }
///
/// let overlay = Image { name: None, tag: Some("1.13".to_string()) };
/// let base = Image { name: Some("jaeger-agent".to_string()), tag: Some("latest".to_string()) };
/// assert_eq!(
///     merge(overlay, &base),
///     Image { name: Some("jaeger-agent".to_string()), tag: Some("1.13".to_string()) },
/// );
/// ```
#[proc_macro_derive(Merge, attributes(merge))]
pub fn derive_merge(input: TokenStream) -> TokenStream {
    merge::derive(parse_macro_input!(input as DeriveInput)).into()
}

/// Derives [`FromFragment`](trait.FromFragment.html) and generates a sparse `{Name}Fragment` twin.
///
/// Every field of the fragment has the type `<T as FromFragment>::Fragment`, which is `Option<T>`
/// for atomic values and the nested fragment type for structs.
///
/// # Supported attributes
///
/// ## `#[fragment(path_overrides(fragment = "path::to::fragment"))]`
///
/// Overrides the path to the `fragment` module (defaults to `::syndesis_operator::config::fragment`).
///
/// ## `#[fragment_attrs(...)]`
///
/// Forwards attributes to the generated fragment type, for example
/// `#[fragment_attrs(derive(Merge, Default), serde(default))]`. Works on structs and fields.
///
/// ## `#[fragment(default)]` (field)
///
/// Validates a missing value to `Default::default()` instead of failing with "field is required".
#[proc_macro_derive(Fragment, attributes(fragment, fragment_attrs))]
pub fn derive_fragment(input: TokenStream) -> TokenStream {
    fragment::derive(parse_macro_input!(input as DeriveInput)).into()
}
