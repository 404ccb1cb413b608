//! Parsing utilities for entity attributes
//!
//! This module handles the parsing of `#[entity]` and `#[soft_deletable]`
//! attributes and validation of the field names they reference.

use proc_macro2::Span;
use syn::{Attribute, Data, DeriveInput, Error, Expr, Fields, Ident, LitStr, Result};

/// Validate an entity or field name and return syn::Error for better proc macro error handling
pub fn validate_identifier_syn(kind: &str, name: &str, span: Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid {} name '{}': {}", kind, name, e)))
}

fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;

    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    Ok(())
}

/// `UserProfile` -> `user_profile`
pub fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, c) in ident.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug)]
pub struct EntityInfo {
    pub name: String,
    pub primary_key: String,
}

pub struct SoftDeletableInfo {
    pub field: String,
    pub value: Expr,
    pub value_initial: Option<Expr>,
}

/// Names of the named fields of a struct
pub fn struct_field_names(input: &DeriveInput) -> Result<Vec<Ident>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields
                .named
                .iter()
                .filter_map(|f| f.ident.clone())
                .collect()),
            _ => Err(Error::new_spanned(
                &input.ident,
                "Entity can only be derived for structs with named fields",
            )),
        },
        _ => Err(Error::new_spanned(
            &input.ident,
            "Entity can only be derived for structs",
        )),
    }
}

fn ensure_field_exists(fields: &[Ident], name: &str, lit: &LitStr, role: &str) -> Result<()> {
    if fields.iter().any(|f| f == name) {
        Ok(())
    } else {
        Err(Error::new(
            lit.span(),
            format!("{} field '{}' does not exist on this struct", role, name),
        ))
    }
}

/// Parse `#[entity(name = "...", primary_key = "...")]`; both keys are optional
pub fn parse_entity_attributes(input: &DeriveInput, fields: &[Ident]) -> Result<EntityInfo> {
    let mut name = None;
    let mut primary_key = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("entity")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                validate_identifier_syn("entity", &lit.value(), lit.span())?;
                name = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("primary_key") {
                let lit: LitStr = meta.value()?.parse()?;
                ensure_field_exists(fields, &lit.value(), &lit, "primary key")?;
                primary_key = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute, expected `name` or `primary_key`"))
            }
        })?;
    }

    let primary_key = match primary_key {
        Some(pk) => pk,
        None if fields.iter().any(|f| f == "id") => "id".to_string(),
        None => {
            return Err(Error::new_spanned(
                &input.ident,
                "no `id` field found: add #[entity(primary_key = \"field\")] to your struct",
            ))
        }
    };

    Ok(EntityInfo {
        name: name.unwrap_or_else(|| to_snake_case(&input.ident.to_string())),
        primary_key,
    })
}

/// Parse `#[soft_deletable(field = "...", value = "path", value_initial = "expr")]`
pub fn parse_soft_deletable_attribute(
    attrs: &[Attribute],
    fields: &[Ident],
) -> Result<Option<SoftDeletableInfo>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("soft_deletable")) else {
        return Ok(None);
    };

    let mut field = None;
    let mut value = None;
    let mut value_initial = None;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("field") {
            let lit: LitStr = meta.value()?.parse()?;
            ensure_field_exists(fields, &lit.value(), &lit, "soft delete")?;
            field = Some(lit.value());
            Ok(())
        } else if meta.path.is_ident("value") {
            let lit: LitStr = meta.value()?.parse()?;
            value = Some(lit.parse::<Expr>()?);
            Ok(())
        } else if meta.path.is_ident("value_initial") {
            let lit: LitStr = meta.value()?.parse()?;
            value_initial = Some(lit.parse::<Expr>()?);
            Ok(())
        } else {
            Err(meta.error(
                "unsupported soft_deletable attribute, expected `field`, `value` or `value_initial`",
            ))
        }
    })?;

    let field = field.ok_or_else(|| {
        Error::new_spanned(attr, "soft_deletable requires `field = \"...\"`")
    })?;
    let value = value.ok_or_else(|| {
        Error::new_spanned(attr, "soft_deletable requires `value = \"path::to::fn\"`")
    })?;

    Ok(Some(SoftDeletableInfo {
        field,
        value,
        value_initial,
    }))
}
