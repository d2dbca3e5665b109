//! Derive macro implementation for secretconf

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

mod attrs;

use attrs::{struct_prefix, FieldAttrs};

/// Check whether a type is `Option<T>`
fn is_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident == "Option")
            .unwrap_or(false)
    } else {
        false
    }
}

/// `EnvConfig` derive macro
///
/// Implements `secretconf::EnvConfig`, generating the struct's field table.
/// The struct must also implement `Default`.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[env(prefix = "PREFIX_")]`: Add prefix to all env var names
///
/// **Field-level**:
/// - `#[env(name = "CUSTOM_NAME")]`: Custom environment variable name
/// - `#[env(default = "literal")]`: Value used when the env var is not set
/// - `#[env(required)]`: Fail when the env var is not set
/// - `#[env(from_file)]`: Support `{VAR}_FILE` pattern
/// - `#[env(nested)]`, `#[env(nested, prefix = "P_")]`: Decode a nested `EnvConfig` struct
/// - `#[env(skip)]`: Keep the field's `Default` value
///
/// # Example
///
/// See the `secretconf` crate documentation for usage examples.
#[proc_macro_derive(EnvConfig, attributes(env))]
pub fn derive_env_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let prefix = struct_prefix(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvConfig only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvConfig only supports structs",
            ));
        }
    };

    let mut rows = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for field in fields {
        let row = FieldAttrs::from_field(field).and_then(|attrs| {
            attrs.check(field, is_option(&field.ty))?;
            Ok(field_row(field, &attrs, &prefix))
        });
        match row {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => {}
            Err(e) => match &mut errors {
                Some(existing) => existing.combine(e),
                None => errors = Some(e),
            },
        }
    }

    if let Some(errors) = errors {
        return Err(errors);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::secretconf::EnvConfig for #struct_name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::secretconf::Field<Self>> {
                ::std::vec![
                    #(#rows),*
                ]
            }
        }
    })
}

/// Generate the table row for one field, or `None` for skipped fields.
fn field_row(field: &syn::Field, attrs: &FieldAttrs, prefix: &str) -> Option<TokenStream2> {
    if attrs.skip {
        return None;
    }

    // Named fields always have an ident.
    let field_name = field.ident.as_ref()?;
    let field_type = &field.ty;
    let path = field_name.to_string().trim_start_matches("r#").to_string();

    if attrs.nested {
        let nested_prefix = attrs.prefix.clone().unwrap_or_default();
        return Some(quote! {
            ::secretconf::Field::<Self>::nested(
                #path,
                #nested_prefix,
                |__cfg: &mut Self, __decoder| __decoder.decode(&mut __cfg.#field_name),
            )
        });
    }

    // Determine environment variable name
    let base_name = attrs.name.clone().unwrap_or_else(|| path.to_uppercase());
    let env_var_name = format!("{}{}", prefix, base_name);

    let mut spec = quote! {
        ::secretconf::FieldSpec::new(
            #env_var_name,
            #path,
            <#field_type as ::secretconf::EnvValue>::KIND,
        )
    };
    if attrs.required {
        spec = quote! { #spec.required() };
    }
    if let Some(default) = &attrs.default {
        spec = quote! { #spec.default_value(#default) };
    }
    if attrs.from_file {
        spec = quote! { #spec.from_file() };
    }

    Some(quote! {
        ::secretconf::Field::<Self>::scalar(
            #spec,
            |__cfg: &mut Self, __value| {
                __cfg.#field_name = <#field_type as ::secretconf::EnvValue>::from_scalar(__value)?;
                ::std::result::Result::Ok(())
            },
        )
    })
}
