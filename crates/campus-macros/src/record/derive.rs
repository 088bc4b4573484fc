//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates the `Record` and `RecordSchema` impls plus one field name
//! constant per queryable field.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::parse_field_attrs;

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut schema_fields: Vec<TokenStream> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        // Fields without a declared type are not queryable.
        let Some(kind) = attrs.kind else {
            continue;
        };

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if seen.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate record field name '{}'", query_name),
            ));
        }
        seen.push(query_name.clone());

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        field_constants.push(quote! {
            /// Field name constant for building queries.
            pub const #const_name: &'static str = #query_name;
        });

        field_matches.push(quote! {
            #query_name => ::campus_query::AsValue::as_value(&self.#field_name),
        });

        let variant = format_ident!("{}", kind.variant());
        schema_fields.push(quote! {
            .field(#query_name, ::campus_query::FieldType::#variant)
        });
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::campus_query::Record for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::campus_query::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::campus_query::Value::None,
                }
            }
        }

        impl #impl_generics ::campus_query::RecordSchema for #struct_name #ty_generics #where_clause {
            fn schema() -> ::campus_query::Schema {
                ::campus_query::Schema::new()
                    #(#schema_fields)*
            }
        }
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == ' ' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("amount"), "AMOUNT");
        assert_eq!(to_screaming_snake_case("due_date"), "DUE_DATE");
        assert_eq!(to_screaming_snake_case("dueDate"), "DUE_DATE");
        assert_eq!(to_screaming_snake_case("head-of-dept"), "HEAD_OF_DEPT");
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = syn::parse_str("struct Pair(u32, u32);").unwrap();
        let err = record_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = syn::parse_str("enum Status { Paid, Pending }").unwrap();
        assert!(record_derive_impl(input).is_err());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let input: DeriveInput = syn::parse_str(
            r#"struct Course {
                #[field(Text)]
                title: String,
                #[field(Text, rename = "title")]
                name: String,
            }"#,
        )
        .unwrap();
        let err = record_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("duplicate record field name"));
    }

    #[test]
    fn test_generates_schema_and_accessor() {
        let input: DeriveInput = syn::parse_str(
            r#"struct Course {
                #[field(Text)]
                title: String,
                #[field(Number)]
                credits: u8,
                notes: String,
            }"#,
        )
        .unwrap();
        let tokens = record_derive_impl(input).unwrap().to_string();
        assert!(tokens.contains("pub const TITLE"));
        assert!(tokens.contains("pub const CREDITS"));
        assert!(!tokens.contains("NOTES"));
        assert!(tokens.contains("RecordSchema"));
    }
}
