extern crate proc_macro;
mod entity;
mod field_parser;
mod macro_utils;
mod named_enum;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use syn::{parse_macro_input, DeriveInput};

/// Derives `supercol::Entity` for a struct with named fields.
///
/// Struct attribute: `#[entity(column_family = "...", keyspace = "...", secondary_column_family = "...", consistency = "one")]`.
/// Field markers: `#[key]`, `#[super_column]`, `#[column_name]`, `#[value]`, `#[transient]`, and
/// `#[column(name = "...", read_only, write_only)]`. Unmarked fields are plain columns.
#[proc_macro_derive(Entity, attributes(entity, key, super_column, column_name, value, transient, column))]
#[proc_macro_error]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let struct_ident = &ast.ident;
    let attrs = match field_parser::parse_entity_attrs(&ast) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };
    let fields = match field_parser::get_field_defs(&ast) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };
    let stream = entity::new(struct_ident, &attrs, &fields);
    macro_utils::submit_struct_to_stream(stream, "entity", struct_ident, "_derive.rs")
}

/// Derives `supercol::NamedEnum` for an enum of unit variants and registers it with every codec registry.
/// A variant is stored as its identifier unless renamed with `#[variant(name = "...")]`.
#[proc_macro_derive(NamedEnum, attributes(variant))]
#[proc_macro_error]
pub fn derive_named_enum(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let enum_ident = &ast.ident;
    let stream = match field_parser::get_variant_defs(&ast) {
        Ok(variants) => named_enum::new(enum_ident, &variants),
        Err(e) => e.to_compile_error(),
    };
    macro_utils::submit_struct_to_stream(stream, "named_enum", enum_ident, "_derive.rs")
}
