//! Code generation for the `Entity` derive

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Generics, Ident};

use crate::parsing::{EntityInfo, SoftDeletableInfo};

pub fn generate_entity_impl(
    name: &Ident,
    generics: &Generics,
    entity: &EntityInfo,
    soft_deletable: Option<&SoftDeletableInfo>,
) -> TokenStream {
    let entity_name = &entity.name;
    let primary_key = &entity.primary_key;
    let decorate = soft_deletable.map(generate_decorate);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics ::soft_deletable::store_object::Entity for #name #ty_generics #where_clause {
            fn entity_name() -> &'static str {
                #entity_name
            }

            fn primary_key_field() -> &'static str {
                #primary_key
            }

            #decorate
        }
    }
}

fn generate_decorate(info: &SoftDeletableInfo) -> TokenStream {
    let field = &info.field;
    let value = &info.value;
    let value_initial = info
        .value_initial
        .as_ref()
        .map(|initial| quote! { .with_value_initial(#initial) });

    quote! {
        fn decorate(metadata: &::soft_deletable::store_object::MetadataStorage) {
            ::soft_deletable::SoftDeletable::with_config(
                ::soft_deletable::SoftDeletableConfig::<Self>::new(#field, #value)
                    #value_initial,
            )
            .apply(metadata);
        }
    }
}
