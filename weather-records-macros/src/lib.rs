//! Procedural macros for weather-records
//!
//! This crate provides two derives that replace runtime field introspection
//! with a field table generated at compile time:
//!
//! - `#[derive(Document)]` declares the ordered `(name, accessor, setter)` table
//!   of a persisted entity.
//! - `#[derive(SparsePatch)]` enumerates the present fields of a patch object,
//!   skipping its identity and embedded filter fields.
//!
//! Both derives emit `crate::` paths and are only meant to be used inside the
//! `weather-records` crate.

use darling::{FromDeriveInput, FromField, ast::Data};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Ident, parse_macro_input};

/// Options for `#[document(...)]` on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(document), supports(struct_named))]
struct DocumentArgs {
    ident: Ident,
    data: Data<(), DocumentFieldArgs>,
    /// Name of the collection the entity is stored in
    collection: String,
}

/// Options for `#[document(...)]` on a field
#[derive(Debug, FromField)]
#[darling(attributes(document))]
struct DocumentFieldArgs {
    ident: Option<Ident>,
    /// Marks the identity field (exactly one per document)
    #[darling(default)]
    id: bool,
    /// Stored field name, if it differs from the Rust field name
    #[darling(default)]
    rename: Option<String>,
}

/// Options for `#[patch(...)]` on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(patch), supports(struct_named))]
struct PatchArgs {
    ident: Ident,
    data: Data<(), PatchFieldArgs>,
}

/// Options for `#[patch(...)]` on a field
#[derive(Debug, FromField)]
#[darling(attributes(patch))]
struct PatchFieldArgs {
    ident: Option<Ident>,
    ty: syn::Type,
    /// The embedded sparse filter selecting which records receive the patch
    #[darling(default)]
    filter: bool,
    /// Identity fields are never assigned
    #[darling(default)]
    identity: bool,
    /// Target document field name, if it differs from the Rust field name
    #[darling(default)]
    rename: Option<String>,
}

/// Derive the field table of a persisted entity.
///
/// Every named field becomes one entry of `Document::fields()`, in declaration
/// order. Field values convert through `IntoValue` / `FromValue`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, Document)]
/// #[document(collection = "WeatherData")]
/// pub struct Reading {
///     #[document(id)]
///     pub id: RecordId,
///     pub device_name: Option<String>,
///     pub time: DateTime<Utc>,
/// }
/// ```
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let args = match DocumentArgs::from_derive_input(&input) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    TokenStream::from(impl_document(&args, &input))
}

fn impl_document(args: &DocumentArgs, input: &DeriveInput) -> TokenStream2 {
    let struct_name = &args.ident;
    let collection = &args.collection;

    let fields = match args.data.as_ref().take_struct() {
        Some(fields) => fields.fields,
        None => {
            return syn::Error::new_spanned(input, "Document only supports structs")
                .to_compile_error();
        }
    };

    let mut id_ident = None;
    let mut id_name = None;
    let mut entries = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return syn::Error::new_spanned(input, "Document requires named fields")
                .to_compile_error();
        };
        let name = field
            .rename
            .clone()
            .unwrap_or_else(|| ident.to_string());

        if field.id {
            if id_ident.is_some() {
                return syn::Error::new_spanned(ident, "only one field may be #[document(id)]")
                    .to_compile_error();
            }
            id_ident = Some(ident.clone());
            id_name = Some(name.clone());
        }

        entries.push(quote! {
            crate::store::Field {
                name: #name,
                get: |doc: &#struct_name| crate::store::IntoValue::into_value(doc.#ident.clone()),
                set: |doc: &mut #struct_name, value: crate::store::Value| {
                    doc.#ident = crate::store::FromValue::from_value(value)?;
                    Ok(())
                },
            }
        });
    }

    let (Some(id_ident), Some(id_name)) = (id_ident, id_name) else {
        return syn::Error::new_spanned(input, "Document requires one #[document(id)] field")
            .to_compile_error();
    };

    quote! {
        impl crate::store::Document for #struct_name {
            const COLLECTION: &'static str = #collection;
            const ID_FIELD: &'static str = #id_name;

            fn fields() -> &'static [crate::store::Field<Self>] {
                const FIELDS: &[crate::store::Field<#struct_name>] = &[
                    #(#entries),*
                ];
                FIELDS
            }

            fn id(&self) -> crate::store::RecordId {
                self.#id_ident
            }

            fn set_id(&mut self, id: crate::store::RecordId) {
                self.#id_ident = id;
            }
        }
    }
}

/// Derive `SparsePatch` for a patch object.
///
/// Each field not marked `filter` or `identity` is checked for presence through
/// `PatchField::present`; present fields become assignments named after the
/// target document field. Exactly one field must be marked `#[patch(filter)]`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Default, Deserialize, SparsePatch)]
/// pub struct ReadingPatch {
///     pub temperature: Option<f64>,
///     #[patch(filter)]
///     pub filter: ReadingFilter,
/// }
/// ```
#[proc_macro_derive(SparsePatch, attributes(patch))]
pub fn derive_sparse_patch(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let args = match PatchArgs::from_derive_input(&input) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    TokenStream::from(impl_sparse_patch(&args, &input))
}

fn impl_sparse_patch(args: &PatchArgs, input: &DeriveInput) -> TokenStream2 {
    let struct_name = &args.ident;

    let fields = match args.data.as_ref().take_struct() {
        Some(fields) => fields.fields,
        None => {
            return syn::Error::new_spanned(input, "SparsePatch only supports structs")
                .to_compile_error();
        }
    };

    let mut filter_field: Option<(&Ident, &syn::Type)> = None;
    let mut checks = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return syn::Error::new_spanned(input, "SparsePatch requires named fields")
                .to_compile_error();
        };

        if field.filter {
            if filter_field.is_some() {
                return syn::Error::new_spanned(ident, "only one field may be #[patch(filter)]")
                    .to_compile_error();
            }
            filter_field = Some((ident, &field.ty));
            continue;
        }
        if field.identity {
            continue;
        }

        let name = field
            .rename
            .clone()
            .unwrap_or_else(|| ident.to_string());

        checks.push(quote! {
            if let Some(value) = crate::compose::PatchField::present(&self.#ident) {
                present.push((#name, value));
            }
        });
    }

    let Some((filter_ident, filter_ty)) = filter_field else {
        return syn::Error::new_spanned(input, "SparsePatch requires one #[patch(filter)] field")
            .to_compile_error();
    };

    quote! {
        impl crate::compose::SparsePatch for #struct_name {
            type Filter = #filter_ty;

            fn filter(&self) -> &Self::Filter {
                &self.#filter_ident
            }

            fn present_fields(&self) -> Vec<(&'static str, crate::store::Value)> {
                let mut present = Vec::new();
                #(#checks)*
                present
            }
        }
    }
}
