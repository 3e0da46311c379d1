//! Provides derive macros for `blocks::Schema`.
use quote::quote;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Expr, ExprLit, Fields, FieldsNamed, GenericArgument,
    Lit, LitStr, Meta, PathArguments, Type,
};

/// Serde naming attributes found on a field or container.
#[derive(Debug, Default)]
struct SerdeDetails {
    rename: Option<String>,
    rename_all: Option<String>,
    default: bool,
}

fn get_serde_details(attrs: &[Attribute]) -> syn::Result<SerdeDetails> {
    let mut details = SerdeDetails::default();
    for att in attrs.iter() {
        if !att.path().is_ident("serde") {
            continue;
        }
        att.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                details.rename = Some(value.value());
            } else if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                details.rename_all = Some(value.value());
            } else if meta.path.is_ident("default") {
                details.default = true;
                if meta.input.peek(syn::Token![=]) {
                    let _: Expr = meta.value()?.parse()?;
                }
            } else if meta.input.peek(syn::Token![=]) {
                // Everything else serde understands is irrelevant to the schema.
                let _: Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let _content;
                syn::parenthesized!(_content in meta.input);
            }
            Ok(())
        })?;
    }
    Ok(details)
}

fn get_description(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|att| att.path().is_ident("doc"))
        .filter_map(|att| match &att.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_owned()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn apply_rename_all(rule: &str, field: &str) -> syn::Result<String> {
    let words = field.split('_').filter(|w| !w.is_empty());
    let capitalize = |w: &str| {
        let mut chars = w.chars();
        match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        }
    };
    match rule {
        "PascalCase" => Ok(words.map(capitalize).collect()),
        "camelCase" => Ok(words
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_owned() } else { capitalize(w) })
            .collect()),
        "snake_case" => Ok(field.to_owned()),
        other => Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            format!(
                "unsupported rename_all rule {other:?} - must be one of \
                 'PascalCase', 'camelCase' or 'snake_case'"
            ),
        )),
    }
}

/// Strips one layer of `Option<T>`, returning `T` if there was one.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

fn get_kind(ty: &Type) -> proc_macro2::TokenStream {
    let ident = match ty {
        Type::Reference(r) => return get_kind(&r.elem),
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        Type::Array(_) | Type::Slice(_) => return quote! { blocks::FieldKind::Array },
        _ => None,
    };
    match ident.as_deref() {
        Some("String" | "str" | "char") => quote! { blocks::FieldKind::String },
        Some("bool") => quote! { blocks::FieldKind::Boolean },
        Some(
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" | "f32" | "f64",
        ) => quote! { blocks::FieldKind::Number },
        Some("Vec" | "VecDeque" | "HashSet" | "BTreeSet") => quote! { blocks::FieldKind::Array },
        _ => quote! { blocks::FieldKind::Object },
    }
}

fn get_field_specs(input: &DeriveInput) -> syn::Result<Vec<proc_macro2::TokenStream>> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(FieldsNamed { named, .. }),
            ..
        }) => named,
        Data::Struct(DataStruct {
            fields: Fields::Unit,
            ..
        }) => return Ok(vec![]),
        _ => {
            return Err(syn::Error::new(
                name.span(),
                "deriving Schema only supports structs with named fields".to_string(),
            ));
        }
    };
    let container = get_serde_details(&input.attrs)?;

    let mut specs = vec![];
    for field in fields.iter() {
        // UNWRAP: safe because we only support structs with named fields
        let ident = field.ident.clone().unwrap();
        let serde = get_serde_details(&field.attrs)?;
        let field_name = ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        let wire_name = match (serde.rename, container.rename_all.as_deref()) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => apply_rename_all(rule, field_name)
                .map_err(|e| syn::Error::new(ident.span(), e.to_string()))?,
            (None, None) => field_name.to_owned(),
        };
        let (ty, required) = match option_inner(&field.ty) {
            Some(inner) => (inner, false),
            None => (&field.ty, !serde.default),
        };
        let kind = get_kind(ty);
        let description = get_description(&field.attrs);
        specs.push(quote! {
            blocks::FieldSpec {
                name: #wire_name,
                kind: #kind,
                required: #required,
                description: #description,
            }
        });
    }
    Ok(specs)
}

#[proc_macro_derive(Schema)]
pub fn derive_schema(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = syn::parse_macro_input!(input);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let specs = match get_field_specs(&input) {
        Ok(specs) => specs,
        Err(e) => return e.into_compile_error().into(),
    };

    let output = quote! {
        impl #impl_generics blocks::Schema for #name #ty_generics #where_clause {
            fn fields() -> Vec<blocks::FieldSpec> {
                vec![
                    #(#specs),*
                ]
            }
        }
    };
    output.into()
}
