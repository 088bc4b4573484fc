//! Parsing of `#[field(...)]` attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, Meta, Result, Token,
};

/// Declared type of a record field, mirroring `campus_query::FieldType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Enum,
    Number,
    Timestamp,
}

impl FieldKind {
    fn parse(name: &str, span: Span) -> Result<Self> {
        match name {
            "Text" | "text" | "String" | "string" => Ok(FieldKind::Text),
            "Enum" | "enum" | "enumeration" => Ok(FieldKind::Enum),
            "Number" | "number" => Ok(FieldKind::Number),
            "Timestamp" | "timestamp" | "Date" | "date" => Ok(FieldKind::Timestamp),
            other => Err(Error::new(
                span,
                format!(
                    "unknown field type: '{}'. Expected one of: Text, Enum, Number, Timestamp",
                    other
                ),
            )),
        }
    }

    pub fn from_ident(ident: &Ident) -> Result<Self> {
        FieldKind::parse(&ident.to_string(), ident.span())
    }

    /// Path of the matching `FieldType` variant.
    pub fn variant(self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::Enum => "Enum",
            FieldKind::Number => "Number",
            FieldKind::Timestamp => "Timestamp",
        }
    }
}

/// Contents of one `#[field(...)]` attribute.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    pub kind: Option<FieldKind>,
    pub skip: bool,
    /// Query name when it differs from the Rust field name.
    pub rename: Option<String>,
}

fn string_lit<'a>(expr: &'a Expr, what: &str) -> Result<&'a syn::LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", what),
        )),
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                // field(Text), field(Number), field(skip)
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(FieldKind::from_ident(ident)?);
                    } else {
                        return Err(Error::new(
                            p.span(),
                            "expected field type: Text, Enum, Number, Timestamp, or skip",
                        ));
                    }
                }

                // rename = "name", ty = "enum"
                Meta::NameValue(nv) => {
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(string_lit(&nv.value, "rename")?.value());
                    } else if nv.path.is_ident("ty") {
                        let s = string_lit(&nv.value, "ty")?;
                        attr.kind = Some(FieldKind::parse(&s.value(), s.span())?);
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown field attribute. Expected: Text, Enum, Number, Timestamp, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        if attr.skip && attr.kind.is_some() {
            return Err(Error::new(
                input.span(),
                "a skipped field cannot also declare a type",
            ));
        }

        Ok(attr)
    }
}

/// Reads the `#[field(...)]` attribute of a struct field, if any.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut found: Option<FieldAttr> = None;
    for attr in attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        if found.is_some() {
            return Err(Error::new(attr.span(), "duplicate #[field] attribute"));
        }
        found = Some(attr.parse_args::<FieldAttr>()?);
    }
    Ok(found.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_field(tokens: &str) -> Result<FieldAttr> {
        syn::parse_str::<FieldAttr>(tokens)
    }

    #[test]
    fn test_field_text() {
        let attr = parse_field("Text").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Text));
        assert!(!attr.skip);
    }

    #[test]
    fn test_field_string_alias() {
        let attr = parse_field("String").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Text));
    }

    #[test]
    fn test_field_number() {
        let attr = parse_field("Number").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Number));
    }

    #[test]
    fn test_field_timestamp() {
        let attr = parse_field("Timestamp").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Timestamp));
        let attr = parse_field("date").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Timestamp));
    }

    #[test]
    fn test_field_enum() {
        let attr = parse_field("Enum").unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Enum));
        // lowercase `enum` is a keyword, so it goes through ty
        let attr = parse_field(r#"ty = "enum""#).unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Enum));
    }

    #[test]
    fn test_field_skip() {
        let attr = parse_field("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.kind, None);
    }

    #[test]
    fn test_field_rename() {
        let attr = parse_field(r#"Text, rename = "name""#).unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Text));
        assert_eq!(attr.rename, Some("name".to_string()));
    }

    #[test]
    fn test_field_invalid_type() {
        let err = parse_field("Bool").unwrap_err();
        assert!(err.to_string().contains("unknown field type"));
    }

    #[test]
    fn test_field_rename_not_string() {
        let err = parse_field("Text, rename = 5").unwrap_err();
        assert!(err.to_string().contains("rename must be a string literal"));
    }

    #[test]
    fn test_field_skip_with_type() {
        assert!(parse_field("skip, Number").is_err());
    }
}
