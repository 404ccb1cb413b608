//! Procedural macros for entity metadata
//!
//! This crate provides the `Entity` derive, which implements the entity
//! contract and, with `#[soft_deletable(...)]`, decorates the type as
//! soft-deletable when an ORM discovers it. The `#[model]` attribute adds
//! the derive together with the serde derives an entity needs.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod model_macro;
mod parsing;

use codegen::generate_entity_impl;
use model_macro::model_attribute;
use parsing::{parse_entity_attributes, parse_soft_deletable_attribute, struct_field_names};

/// Derive macro for the `Entity` trait
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
/// #[entity(name = "users")]
/// #[soft_deletable(field = "deleted_at", value = "chrono::Utc::now")]
/// pub struct User {
///     pub id: Uuid,
///     pub name: String,
///     pub deleted_at: Option<DateTime<Utc>>,
/// }
/// ```
///
/// * `entity(name)` defaults to the snake_case struct name.
/// * `entity(primary_key)` defaults to `id`.
/// * `soft_deletable(value)` is any expression callable with no arguments;
///   `value_initial` is the value of a record that is not deleted and
///   defaults to null.
///
/// Field names are matched against the Rust field names; structs that rename
/// fields through serde must name the serialized field.
#[proc_macro_derive(Entity, attributes(entity, soft_deletable))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let fields = match struct_field_names(&input) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    let entity = match parse_entity_attributes(&input, &fields) {
        Ok(entity) => entity,
        Err(e) => return e.to_compile_error().into(),
    };

    let soft_deletable = match parse_soft_deletable_attribute(&input.attrs, &fields) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    generate_entity_impl(&input.ident, &input.generics, &entity, soft_deletable.as_ref()).into()
}

/// Convenience attribute macro that adds all necessary derives for an entity
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
