use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, GenericParam, LitStr, Visibility, parse_macro_input, parse_quote};

/// Derive macro building the field-descriptor table of a struct.
///
/// Generates `bq_mapper::Record` and `bq_mapper::ToValue` impls. Every
/// declared field gets a descriptor, in declaration order; private fields
/// are marked non-exported and their values are not read.
///
/// Tags are raw strings keyed by tag key, parsed at build time:
///
/// ```ignore
/// #[derive(Record)]
/// pub struct Visit {
///     #[tag(bigquery = "username")]
///     pub name: String,
///
///     #[tag(bigquery = "created_at,nullable", json = "created")]
///     pub created: chrono::DateTime<chrono::Utc>,
///
///     #[tag(bigquery = ",squash")]
///     pub meta: Meta,
///
///     cache_key: String,
/// }
/// ```
///
/// Exported field types must implement `ToValue`.
#[proc_macro_derive(Record, attributes(tag))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(mut input: DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record only supports structs",
            ))
        }
    };

    let mut field_tokens = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "expected named field")
        })?;
        let field_name_str = field_name.unraw().to_string();

        // Parse #[tag(key = "...")] attributes.
        let mut tags: Vec<(String, String)> = Vec::new();
        for attr in &field.attrs {
            if !attr.path().is_ident("tag") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let key = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("expected a tag key, e.g. `bigquery = \"...\"`"))?
                    .unraw()
                    .to_string();
                if tags.iter().any(|(k, _)| *k == key) {
                    return Err(meta.error(format!("duplicate tag key '{key}'")));
                }
                let value: LitStr = meta.value()?.parse()?;
                tags.push((key, value.value()));
                Ok(())
            })?;
        }

        let exported = !matches!(field.vis, Visibility::Inherited);
        let keys = tags.iter().map(|(k, _)| k);
        let values = tags.iter().map(|(_, v)| v);
        let value = if exported {
            quote! { bq_mapper::value::ToValue::to_value(&self.#field_name) }
        } else {
            quote! { bq_mapper::value::Value::Null }
        };
        let token = quote! {
            bq_mapper::value::StructField {
                descriptor: bq_mapper::value::FieldDescriptor {
                    ident: #field_name_str,
                    tags: &[#((#keys, #values)),*],
                    exported: #exported,
                },
                value: #value,
            }
        };
        field_tokens.push(token);
    }

    // Generic type parameters must be convertible themselves.
    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(bq_mapper::value::ToValue));
        }
    }
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics bq_mapper::value::Record for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #name_str
            }

            fn fields(&self) -> ::std::vec::Vec<bq_mapper::value::StructField> {
                ::std::vec![
                    #(#field_tokens),*
                ]
            }
        }

        impl #impl_generics bq_mapper::value::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> bq_mapper::value::Value {
                bq_mapper::value::Value::Struct(bq_mapper::value::Record::to_struct(self))
            }
        }
    };

    Ok(TokenStream::from(expanded))
}
