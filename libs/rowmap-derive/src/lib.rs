use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, LitStr, Path};

/// Derive macro for row-mappable entities.
///
/// Implements `rowmap::Entity` by registering every named field, in
/// declaration order, with the descriptor builder. Field `i` maps to cell `i`
/// of a row.
///
/// Field attributes (`#[row(...)]`):
///
/// - `read_only` — left out of encoded rows unless encoding is forced.
/// - `decode_with = "path::to::fn"` — `fn(&CellValue) -> Result<T, CellError>`.
/// - `decode_expr = "|cell| ..."` — closure with the same signature.
/// - `encode_with = "path::to::fn"` — `fn(&T) -> CellValue`.
/// - `encode_expr = "|value| ..."` — closure with the same signature.
/// - `rename = "name"` — name used in diagnostics.
/// - `skip` — not mapped at all; keeps its `Default` value on `decode_new`.
///
/// At most one of `decode_with`/`decode_expr`, and one of
/// `encode_with`/`encode_expr`, per field.
///
/// # Example
///
/// ```ignore
/// #[derive(Entity, Default)]
/// pub struct Player {
///     #[row(read_only)]
///     pub id: i64,
///     pub name: String,
///     #[row(decode_with = "parse_tags", encode_with = "join_tags")]
///     pub tags: Vec<String>,
///     pub score: Option<f64>,
/// }
/// ```
///
/// Built-in field types: `i32`, `i64`, `f64`, `String`, `bool`,
/// `DateTime<FixedOffset>`, and `Option` of any of these, however they are
/// spelled (aliases included). The choice is made by the type checker through
/// `rowmap::dispatch`. Other types are accepted, but fail with
/// `UnsupportedType` at runtime in any direction that has no override.
#[proc_macro_derive(Entity, attributes(row))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[derive(Default)]
struct RowAttrs {
    read_only: bool,
    skip: bool,
    rename: Option<String>,
    decode_with: Option<Path>,
    decode_expr: Option<Expr>,
    encode_with: Option<Path>,
    encode_expr: Option<Expr>,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Entity only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Entity only supports structs",
            ))
        }
    };

    let mut field_tokens = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "expected named field")
        })?;
        let field_ty = &field.ty;
        let attrs = parse_row_attrs(field)?;

        if attrs.skip {
            continue;
        }

        let label = attrs
            .rename
            .clone()
            .unwrap_or_else(|| field_name.to_string());

        let mut chain = vec![quote! {
            (&rowmap::dispatch::Select::<Self, #field_ty>::new()).build_field(
                #label,
                |__e: &Self| &__e.#field_name,
                |__e: &mut Self| &mut __e.#field_name,
            )
        }];
        if attrs.read_only {
            chain.push(quote! { .read_only() });
        }
        if let Some(path) = &attrs.decode_with {
            chain.push(quote! { .decode_with(#path) });
        }
        if let Some(expr) = &attrs.decode_expr {
            chain.push(quote! { .decode_expr(#expr) });
        }
        if let Some(path) = &attrs.encode_with {
            chain.push(quote! { .encode_with(#path) });
        }
        if let Some(expr) = &attrs.encode_expr {
            chain.push(quote! { .encode_expr(#expr) });
        }

        field_tokens.push(quote! { .field(#(#chain)*) });
    }

    let expanded = quote! {
        impl #impl_generics rowmap::mapping::Entity for #name #ty_generics #where_clause {
            fn describe() -> ::core::result::Result<
                rowmap::mapping::EntityDescriptor<Self>,
                rowmap::error::MapError,
            > {
                #[allow(unused_imports)]
                use rowmap::dispatch::{ViaBuiltin as _, ViaCustom as _};

                rowmap::mapping::EntityDescriptor::<Self>::builder(#name_str)
                    #(#field_tokens)*
                    .build()
            }
        }
    };

    Ok(expanded)
}

/// Parse `#[row(...)]` on one field, rejecting conflicting roles.
fn parse_row_attrs(field: &syn::Field) -> Result<RowAttrs, syn::Error> {
    let mut attrs = RowAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("row") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("read_only") {
                attrs.read_only = true;
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.rename = Some(value.value());
            } else if meta.path.is_ident("decode_with") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.decode_with = Some(value.parse()?);
            } else if meta.path.is_ident("decode_expr") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.decode_expr = Some(value.parse()?);
            } else if meta.path.is_ident("encode_with") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.encode_with = Some(value.parse()?);
            } else if meta.path.is_ident("encode_expr") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.encode_expr = Some(value.parse()?);
            } else {
                return Err(meta.error(
                    "unknown row attribute (expected read_only, skip, rename, \
                     decode_with, decode_expr, encode_with, encode_expr)",
                ));
            }
            Ok(())
        })?;
    }

    if attrs.decode_with.is_some() && attrs.decode_expr.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "decode_with and decode_expr are mutually exclusive",
        ));
    }
    if attrs.encode_with.is_some() && attrs.encode_expr.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "encode_with and encode_expr are mutually exclusive",
        ));
    }
    let has_mapping_attr = attrs.read_only
        || attrs.rename.is_some()
        || attrs.decode_with.is_some()
        || attrs.decode_expr.is_some()
        || attrs.encode_with.is_some()
        || attrs.encode_expr.is_some();
    if attrs.skip && has_mapping_attr {
        return Err(syn::Error::new_spanned(
            field,
            "skip cannot be combined with other row attributes",
        ));
    }

    Ok(attrs)
}
