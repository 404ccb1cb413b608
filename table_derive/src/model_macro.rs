use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput};

/// Convenience attribute macro that adds all necessary derives for an entity
///
/// Usage:
/// ```rust,ignore
/// use soft_deletable::prelude::*;
///
/// #[model]
/// #[entity(name = "users")]
/// pub struct User {
///     pub id: Uuid,
///     pub name: String,
/// }
/// ```
pub fn model_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    if !matches!(input.data, Data::Struct(_)) {
        return syn::Error::new_spanned(&input.ident, "model can only be used on structs")
            .to_compile_error()
            .into();
    }

    // Add all the necessary derives to the struct
    let expanded = quote! {
        #[derive(
            Debug,
            Clone,
            ::soft_deletable::serde::Serialize,
            ::soft_deletable::serde::Deserialize,
            ::soft_deletable::Entity
        )]
        #[serde(crate = "::soft_deletable::serde")]
        #input
    };

    TokenStream::from(expanded)
}
