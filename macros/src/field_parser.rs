use proc_macro2::Ident;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::{DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Key,
    SuperColumn,
    ColumnName,
    Value,
    Column,
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

#[derive(Clone)]
pub struct FieldDef {
    pub name: Ident,
    pub column: String,
    pub tpe: Type,
    pub optional: bool,
    pub role: FieldRole,
    pub access: Access,
}

impl FieldDef {
    /// Declared value type, i.e. `T` for an `Option<T>` field.
    pub fn value_type(&self) -> Type {
        if self.optional {
            option_inner(&self.tpe).cloned().unwrap_or_else(|| self.tpe.clone())
        } else {
            self.tpe.clone()
        }
    }
}

#[derive(Default)]
pub struct EntityAttrs {
    pub keyspace: Option<String>,
    pub column_family: Option<String>,
    pub secondary_column_family: Option<String>,
    pub consistency: Option<Ident>,
}

pub fn option_inner(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner);
                    }
                }
            }
        }
    }
    None
}

fn consistency_variant(lit: &LitStr) -> Result<Ident, syn::Error> {
    let variant = match lit.value().to_lowercase().as_str() {
        "zero" => "Zero",
        "one" => "One",
        "quorum" => "Quorum",
        "dc_quorum" => "DcQuorum",
        "dc_quorum_sync" => "DcQuorumSync",
        "all" => "All",
        "any" => "Any",
        other => {
            return Err(syn::Error::new(
                lit.span(),
                format!("Unknown consistency `{}`, expected one of zero, one, quorum, dc_quorum, dc_quorum_sync, all, any", other),
            ))
        }
    };
    Ok(Ident::new(variant, lit.span()))
}

pub fn parse_entity_attrs(ast: &DeriveInput) -> Result<EntityAttrs, syn::Error> {
    let mut attrs = EntityAttrs::default();
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("entity")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("keyspace") {
                attrs.keyspace = Some(nested.value()?.parse::<LitStr>()?.value());
            } else if nested.path.is_ident("column_family") {
                attrs.column_family = Some(nested.value()?.parse::<LitStr>()?.value());
            } else if nested.path.is_ident("secondary_column_family") {
                attrs.secondary_column_family = Some(nested.value()?.parse::<LitStr>()?.value());
            } else if nested.path.is_ident("consistency") {
                attrs.consistency = Some(consistency_variant(&nested.value()?.parse::<LitStr>()?)?);
            } else {
                return Err(nested.error("Expected keyspace, column_family, secondary_column_family or consistency"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

fn parse_entity_field(field: &syn::Field) -> Result<FieldDef, syn::Error> {
    let name = field.ident.clone().ok_or_else(|| syn::Error::new(field.span(), "Unnamed fields not supported"))?;
    let mut role: Option<FieldRole> = None;
    let mut column = name.unraw().to_string();
    let mut access = Access::ReadWrite;

    for attr in &field.attrs {
        let marker = if attr.path().is_ident("key") {
            Some(FieldRole::Key)
        } else if attr.path().is_ident("super_column") {
            Some(FieldRole::SuperColumn)
        } else if attr.path().is_ident("column_name") {
            Some(FieldRole::ColumnName)
        } else if attr.path().is_ident("value") {
            Some(FieldRole::Value)
        } else if attr.path().is_ident("transient") {
            Some(FieldRole::Transient)
        } else if attr.path().is_ident("column") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("name") {
                    column = nested.value()?.parse::<LitStr>()?.value();
                } else if nested.path.is_ident("read_only") {
                    access = Access::ReadOnly;
                } else if nested.path.is_ident("write_only") {
                    access = Access::WriteOnly;
                } else {
                    return Err(nested.error("Expected name = \"...\", read_only or write_only"));
                }
                Ok(())
            })?;
            None
        } else {
            None
        };
        if let Some(marker) = marker {
            if role.is_some() {
                return Err(syn::Error::new(attr.span(), "Field may carry only one of #[key] / #[super_column] / #[column_name] / #[value] / #[transient]"));
            }
            role = Some(marker);
        }
    }

    if column.is_empty() {
        return Err(syn::Error::new(field.span(), "Column name must not be empty"));
    }

    Ok(FieldDef {
        name,
        column,
        tpe: field.ty.clone(),
        optional: option_inner(&field.ty).is_some(),
        role: role.unwrap_or(FieldRole::Column),
        access,
    })
}

pub fn get_named_fields(ast: &DeriveInput) -> Result<Punctuated<syn::Field, Comma>, syn::Error> {
    match &ast.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Ok(named.named.clone()),
            _ => Err(syn::Error::new(ast.span(), "`#[derive(Entity)]` only supports structs with named fields.")),
        },
        _ => Err(syn::Error::new(ast.span(), "`#[derive(Entity)]` only supports structs.")),
    }
}

/// Parses every field; how many keys or super columns there are is checked when the schema is described.
pub fn get_field_defs(ast: &DeriveInput) -> Result<Vec<FieldDef>, syn::Error> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new(ast.generics.span(), "`#[derive(Entity)]` does not support generic structs."));
    }
    get_named_fields(ast)?.iter().map(parse_entity_field).collect()
}

pub struct VariantDef {
    pub ident: Ident,
    pub name: String,
}

pub fn get_variant_defs(ast: &DeriveInput) -> Result<Vec<VariantDef>, syn::Error> {
    let data = match &ast.data {
        syn::Data::Enum(data) => data,
        _ => return Err(syn::Error::new(ast.span(), "`#[derive(NamedEnum)]` only supports enums.")),
    };
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new(ast.generics.span(), "`#[derive(NamedEnum)]` does not support generic enums."));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new(ast.span(), "`#[derive(NamedEnum)]` needs at least one variant."));
    }
    let mut variants: Vec<VariantDef> = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(variant.span(), "`#[derive(NamedEnum)]` only supports unit variants."));
        }
        let mut name = variant.ident.unraw().to_string();
        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("variant")) {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("name") {
                    name = nested.value()?.parse::<LitStr>()?.value();
                    Ok(())
                } else {
                    Err(nested.error("Expected name = \"...\""))
                }
            })?;
        }
        if variants.iter().any(|v| v.name == name) {
            return Err(syn::Error::new(variant.span(), format!("Duplicate variant name `{}`", name)));
        }
        variants.push(VariantDef { ident: variant.ident.clone(), name });
    }
    Ok(variants)
}
