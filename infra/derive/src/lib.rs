#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by the SecureVault crates: error enums, API models,
//! documented handlers and feature slices.
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own macros.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a request/response model.
///
/// * Adds `Debug`, `Serialize` and `Deserialize` when they are not derived already.
/// * Adds `utoipa::ToSchema` behind the `server` feature.
/// * Applies `rename_all = "camelCase"` and `deny_unknown_fields` unless told otherwise.
///
/// ```rust,ignore
/// use svault_derive::api_model;
///
/// #[api_model(deny_unknown_fields = false)]
/// pub struct EntryPayload {
///     pub title: Option<String>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Documents an Axum handler through `utoipa::path` (only with the `server` feature).
///
/// Accepts the usual `utoipa::path` arguments.
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)), tag = "System")]
/// pub async fn health_handler() -> Json<HealthResponse> { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a crate error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` when missing.
/// * `<Name>Ext` trait with `.context(...)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant that wraps a source error.
/// * `From<Source>` for those variants.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use in `#[error(...)]` strings.
///
/// # Requirements
///
/// Every variant uses named fields. A variant with a `source` (or `#[source]`/`#[from]`)
/// field must also carry `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[svault_error]
/// pub enum StoreError {
///     #[error("Database error{}: {source}", format_context(.context))]
///     Database { source: surrealdb::Error, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn svault_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Declares a feature slice.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is an `Arc` handle that derefs
/// to it and implements `svault_kernel::domain::registry::FeatureSlice`.
///
/// ```rust,ignore
/// #[svault_derive::svault_slice]
/// pub struct VaultSlice {
///     pub service: VaultService,
/// }
///
/// let slice = VaultSlice::new(VaultSliceInner { service });
/// ```
#[proc_macro_attribute]
pub fn svault_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
