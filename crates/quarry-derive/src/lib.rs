//! Derive macros for mapping structs onto SQLite tables.
//!
//! This crate provides the `#[derive(Mapped)]` macro, which generates typed
//! field handles and the table declaration for a struct.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type, parse_macro_input};

/// Derives field handles and a table declaration for a struct.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
/// - `#[table(without_rowid)]` - Declares a `WITHOUT ROWID` table
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(primary_key)]` - Marks the column as PRIMARY KEY
/// - `#[column(autoincrement)]` - Marks the column as AUTOINCREMENT
/// - `#[column(unique)]` - Marks the column as UNIQUE
/// - `#[column(default = 0)]` - Sets a literal default value
/// - `#[column(collate = "nocase")]` - Sets the column collation
///   (`binary`, `nocase`, `rtrim`, or a custom name)
///
/// Nullability follows the field type: only `Option<T>` fields are nullable.
///
/// # Generated Items
///
/// For a struct `User` with a field `id: i64`, this macro generates:
///
/// - `User::id() -> Field<User, i64>` - A typed handle for each field
/// - `User::table() -> Table<User>` - The table declaration, ready for
///   `Schema::builder().table(..)`
#[proc_macro_derive(Mapped, attributes(table, column))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_mapped_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_mapped_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Mapped derive does not support generic structs",
        ));
    }
    let table_attrs = parse_table_attrs(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Mapped derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Mapped derive only supports structs",
            ));
        }
    };

    let mut column_infos: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        if field_name == "table" {
            return Err(syn::Error::new_spanned(
                &field_name,
                "a field named `table` would shadow the generated `table()`",
            ));
        }
        let column_attrs = parse_column_attrs(&field.attrs)?;
        column_infos.push(ColumnInfo {
            column_name: column_attrs
                .name
                .clone()
                .unwrap_or_else(|| field_name.to_string()),
            field_name,
            field_type: field.ty.clone(),
            attrs: column_attrs,
        });
    }

    let field_handles: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let method_name = &info.field_name;
            let field_type = &info.field_type;
            let member = info.field_name.to_string();
            quote! {
                /// Typed handle for this field's column.
                #[must_use]
                pub fn #method_name() -> ::quarry_core::schema::Field<Self, #field_type> {
                    fn get(obj: &#struct_name) -> &#field_type {
                        &obj.#method_name
                    }
                    fn get_mut(obj: &mut #struct_name) -> &mut #field_type {
                        &mut obj.#method_name
                    }
                    ::quarry_core::schema::Field::member(#member, get, get_mut)
                }
            }
        })
        .collect();

    let columns: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let column_name = &info.column_name;
            let method_name = &info.field_name;
            let constraints = column_constraints(&info.attrs);
            quote! {
                ::quarry_core::schema::make_column(
                    #column_name,
                    Self::#method_name(),
                    [#(#constraints),*],
                )
            }
        })
        .collect();

    let table_name = &table_attrs.name;
    let without_rowid = table_attrs
        .without_rowid
        .then(|| quote! { .without_rowid() });

    let expanded = quote! {
        impl #struct_name {
            #(#field_handles)*

            /// Table declaration for this struct.
            #[must_use]
            pub fn table() -> ::quarry_core::schema::Table<Self> {
                ::quarry_core::schema::make_table(#table_name, vec![#(#columns),*])
                    #without_rowid
            }
        }
    };

    Ok(expanded)
}

fn column_constraints(attrs: &ColumnAttrs) -> Vec<TokenStream2> {
    let mut constraints = Vec::new();
    if attrs.primary_key {
        constraints.push(quote! { ::quarry_core::schema::primary_key() });
    }
    if attrs.autoincrement {
        constraints.push(quote! { ::quarry_core::schema::autoincrement() });
    }
    if attrs.unique {
        constraints.push(quote! { ::quarry_core::schema::unique() });
    }
    if let Some(default) = &attrs.default {
        constraints.push(quote! { ::quarry_core::schema::default_value(#default) });
    }
    if let Some(collate) = &attrs.collate {
        let collation = match collate.to_ascii_lowercase().as_str() {
            "binary" => quote! { ::quarry_core::ast::Collation::Binary },
            "nocase" => quote! { ::quarry_core::ast::Collation::NoCase },
            "rtrim" => quote! { ::quarry_core::ast::Collation::RTrim },
            _ => quote! { ::quarry_core::ast::Collation::Custom(::std::string::String::from(#collate)) },
        };
        constraints.push(quote! { ::quarry_core::schema::collate(#collation) });
    }
    constraints
}

struct ColumnInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    attrs: ColumnAttrs,
}

struct TableAttrs {
    name: String,
    without_rowid: bool,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    autoincrement: bool,
    unique: bool,
    default: Option<Lit>,
    collate: Option<String>,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn parse_table_attrs(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<TableAttrs> {
    let mut result = TableAttrs {
        name: to_snake_case(&struct_name.to_string()),
        without_rowid: false,
    };
    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    result.name = string_value(&meta)?;
                } else if meta.path.is_ident("without_rowid") {
                    result.without_rowid = true;
                } else {
                    return Err(meta.error("unknown table attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("autoincrement") {
                    result.autoincrement = true;
                } else if meta.path.is_ident("unique") {
                    result.unique = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?);
                } else if meta.path.is_ident("collate") {
                    result.collate = Some(string_value(&meta)?);
                } else if meta.path.is_ident("default") {
                    let value: Expr = meta.value()?.parse()?;
                    match value {
                        Expr::Lit(lit) => result.default = Some(lit.lit),
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "default must be a literal",
                            ));
                        }
                    }
                } else {
                    return Err(meta.error("unknown column attribute"));
                }
                Ok(())
            })?;
        }
    }

    if result.autoincrement && !result.primary_key {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "autoincrement requires primary_key on the same column",
        ));
    }

    Ok(result)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
