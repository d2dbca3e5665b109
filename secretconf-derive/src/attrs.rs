//! Attribute parsing for `#[env(...)]` annotations.
//!
//! This module extracts and validates configuration attributes from struct fields
//! during macro expansion.

use syn::spanned::Spanned;
use syn::{Attribute, Field, Lit};

/// Parsed `#[env(...)]` attributes from a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Custom environment variable name override.
    ///
    /// If `None`, the field name is converted to UPPER_SNAKE_CASE.
    pub name: Option<String>,

    /// Literal used when the variable is unset.
    ///
    /// String, integer and boolean literals are accepted and stored as text;
    /// the decoder converts it like any other value.
    pub default: Option<String>,

    /// Fail when the variable is unset.
    pub required: bool,

    /// Enable `{VAR}_FILE` pattern for reading secrets from mounted files.
    pub from_file: bool,

    /// The field is itself an `EnvConfig` struct.
    pub nested: bool,

    /// Key prefix for a nested struct.
    pub prefix: Option<String>,

    /// Leave the field at its `Default` value.
    pub skip: bool,
}

fn lit_to_string(lit: &Lit) -> syn::Result<String> {
    match lit {
        Lit::Str(s) => Ok(s.value()),
        Lit::Int(i) => Ok(i.base10_digits().to_string()),
        Lit::Bool(b) => Ok(b.value.to_string()),
        other => Err(syn::Error::new(
            other.span(),
            "expected a string, integer or boolean literal",
        )),
    }
}

fn lit_str(lit: &Lit) -> syn::Result<String> {
    match lit {
        Lit::Str(s) => Ok(s.value()),
        other => Err(syn::Error::new(other.span(), "expected a string literal")),
    }
}

impl FieldAttrs {
    /// Extract and parse `#[env(...)]` attributes from a struct field.
    ///
    /// Attributes other than `env` are left for other macros.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // name = "..."
                if meta.path.is_ident("name") {
                    let lit: Lit = meta.value()?.parse()?;
                    attrs.name = Some(lit_str(&lit)?);
                    return Ok(());
                }

                // default = "literal"
                if meta.path.is_ident("default") {
                    let lit: Lit = meta.value()?.parse()?;
                    attrs.default = Some(lit_to_string(&lit)?);
                    return Ok(());
                }

                if meta.path.is_ident("required") {
                    attrs.required = true;
                    return Ok(());
                }

                if meta.path.is_ident("from_file") {
                    attrs.from_file = true;
                    return Ok(());
                }

                if meta.path.is_ident("nested") {
                    attrs.nested = true;
                    return Ok(());
                }

                // prefix = "..." (nested fields only)
                if meta.path.is_ident("prefix") {
                    let lit: Lit = meta.value()?.parse()?;
                    attrs.prefix = Some(lit_str(&lit)?);
                    return Ok(());
                }

                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    return Ok(());
                }

                Err(meta.error("unsupported env attribute"))
            })?;
        }

        Ok(attrs)
    }

    /// Reject attribute combinations that cannot mean anything sensible.
    pub fn check(&self, field: &Field, is_option: bool) -> syn::Result<()> {
        let fail = |message: &str| Err(syn::Error::new(field.span(), message));

        if self.skip {
            let others = self.name.is_some()
                || self.default.is_some()
                || self.required
                || self.from_file
                || self.nested
                || self.prefix.is_some();
            if others {
                return fail("`skip` cannot be combined with other env attributes");
            }
            return Ok(());
        }

        if self.nested {
            if self.name.is_some() || self.default.is_some() || self.required || self.from_file {
                return fail(
                    "`nested` fields only accept `prefix`; put field attributes on the nested struct",
                );
            }
            return Ok(());
        }

        if self.prefix.is_some() {
            return fail("`prefix` is only valid on `nested` fields");
        }

        if self.required && self.default.is_some() {
            return fail("`required` and `default` cannot be combined: a defaulted field is never missing");
        }

        if is_option && self.default.is_some() {
            return fail(
                "Option<T> fields cannot have default attribute (they default to None automatically)",
            );
        }

        if is_option && self.required {
            return fail("Option<T> fields cannot be required; use T instead");
        }

        Ok(())
    }
}

/// Struct-level `#[env(prefix = "...")]`.
pub fn struct_prefix(attrs: &[Attribute]) -> syn::Result<String> {
    let mut prefix = String::new();

    for attr in attrs {
        if !attr.path().is_ident("env") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("prefix") {
                let lit: Lit = meta.value()?.parse()?;
                prefix = lit_str(&lit)?;
                return Ok(());
            }

            Err(meta.error("unsupported struct-level env attribute"))
        })?;
    }

    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(field: Field) -> FieldAttrs {
        FieldAttrs::from_field(&field).unwrap()
    }

    #[test]
    fn test_parse_name_attribute() {
        let attrs = parse(parse_quote! {
            #[env(name = "CUSTOM_NAME")]
            pub field_name: String
        });
        assert_eq!(attrs.name, Some("CUSTOM_NAME".to_string()));
    }

    #[test]
    fn test_parse_default_string() {
        let attrs = parse(parse_quote! {
            #[env(default = "24h")]
            pub field_name: TimeDelta
        });
        assert_eq!(attrs.default.as_deref(), Some("24h"));
    }

    #[test]
    fn test_parse_default_number_and_bool() {
        let attrs = parse(parse_quote! {
            #[env(default = 8080)]
            pub port: u16
        });
        assert_eq!(attrs.default.as_deref(), Some("8080"));

        let attrs = parse(parse_quote! {
            #[env(default = false)]
            pub dev_mode: bool
        });
        assert_eq!(attrs.default.as_deref(), Some("false"));
    }

    #[test]
    fn test_parse_flags() {
        let attrs = parse(parse_quote! {
            #[env(name = "CSRF_AUTH_KEY", required, from_file)]
            pub csrf_auth_key: String
        });
        assert_eq!(attrs.name.as_deref(), Some("CSRF_AUTH_KEY"));
        assert!(attrs.required);
        assert!(attrs.from_file);
        assert!(!attrs.nested);
    }

    #[test]
    fn test_parse_nested_with_prefix() {
        let attrs = parse(parse_quote! {
            #[env(nested, prefix = "DB_")]
            pub database: DatabaseConfig
        });
        assert!(attrs.nested);
        assert_eq!(attrs.prefix.as_deref(), Some("DB_"));
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let attrs = parse(parse_quote! {
            #[doc = "documented"]
            #[serde(rename = "x")]
            pub field_name: String
        });
        assert!(attrs.name.is_none());
        assert!(!attrs.required);
    }

    #[test]
    fn test_unknown_attribute_is_error() {
        let field: Field = parse_quote! {
            #[env(deserializer = "serde_json::from_str")]
            pub tags: Vec<String>
        };
        let err = FieldAttrs::from_field(&field).unwrap_err();
        assert!(err.to_string().contains("unsupported env attribute"));
    }

    #[test]
    fn test_required_with_default_is_rejected() {
        let field: Field = parse_quote! {
            #[env(required, default = "x")]
            pub key: String
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        let err = attrs.check(&field, false).unwrap_err();
        assert!(err.to_string().contains("cannot be combined"));
    }

    #[test]
    fn test_option_with_default_is_rejected() {
        let field: Field = parse_quote! {
            #[env(default = "fallback")]
            pub optional_field: Option<String>
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.check(&field, true).is_err());
    }

    #[test]
    fn test_prefix_requires_nested() {
        let field: Field = parse_quote! {
            #[env(prefix = "DB_")]
            pub host: String
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.check(&field, false).is_err());
    }

    #[test]
    fn test_struct_prefix() {
        let input: syn::DeriveInput = parse_quote! {
            #[env(prefix = "APP_")]
            struct Config { port: u16 }
        };
        assert_eq!(struct_prefix(&input.attrs).unwrap(), "APP_");
    }
}
