use crate::field_parser::{Access, EntityAttrs, FieldDef, FieldRole};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::ext::IdentExt;

fn role_tokens(role: FieldRole) -> TokenStream {
    match role {
        FieldRole::Key => quote! { ::supercol::Role::Key },
        FieldRole::SuperColumn => quote! { ::supercol::Role::SuperColumn },
        FieldRole::ColumnName => quote! { ::supercol::Role::ColumnName },
        FieldRole::Value => quote! { ::supercol::Role::Value },
        FieldRole::Column => quote! { ::supercol::Role::Column },
        FieldRole::Transient => quote! { ::supercol::Role::Transient },
    }
}

fn meta_tokens(attrs: &EntityAttrs) -> TokenStream {
    let column_family = attrs.column_family.clone().unwrap_or_default();
    let mut meta = quote! { ::supercol::BeanMeta::new(#column_family) };
    if let Some(keyspace) = &attrs.keyspace {
        meta = quote! { #meta.with_keyspace(#keyspace) };
    }
    if let Some(secondary) = &attrs.secondary_column_family {
        meta = quote! { #meta.with_secondary_column_family(#secondary) };
    }
    if let Some(variant) = &attrs.consistency {
        meta = quote! { #meta.with_consistency(::supercol::ConsistencyLevel::#variant) };
    }
    meta
}

/// Accessor functions plus the descriptor expression for one field.
fn property_tokens(struct_ident: &Ident, field: &FieldDef) -> (TokenStream, TokenStream) {
    let field_name = &field.name;
    let column = &field.column;
    let value_type = field.value_type();
    let role = role_tokens(field.role);
    let getter_ident = format_ident!("__get_{}", field_name.unraw());
    let setter_ident = format_ident!("__set_{}", field_name.unraw());

    if field.role == FieldRole::Transient {
        return (quote! {}, quote! { ::supercol::Property::<#struct_ident>::new::<#value_type>(#column, #role, None, None) });
    }

    let read = if field.optional {
        quote! { bean.#field_name.as_ref().map(|v| v as &dyn ::supercol::Any) }
    } else {
        quote! { Some(&bean.#field_name as &dyn ::supercol::Any) }
    };
    let write = if field.optional {
        quote! { bean.#field_name = ::supercol::downcast::<#value_type>(value, #column)?; }
    } else {
        quote! {
            if let Some(v) = ::supercol::downcast::<#value_type>(value, #column)? {
                bean.#field_name = v;
            }
        }
    };
    let accessors = quote! {
        fn #getter_ident(bean: &#struct_ident) -> Option<&dyn ::supercol::Any> {
            #read
        }
        fn #setter_ident(bean: &mut #struct_ident, value: Option<Box<dyn ::supercol::Any>>) -> Result<(), ::supercol::AppError> {
            #write
            Ok(())
        }
    };
    let getter = match field.access {
        Access::ReadWrite | Access::ReadOnly => quote! { Some(#getter_ident as ::supercol::Getter<#struct_ident>) },
        Access::WriteOnly => quote! { None },
    };
    let setter = match field.access {
        Access::ReadWrite | Access::WriteOnly => quote! { Some(#setter_ident as ::supercol::Setter<#struct_ident>) },
        Access::ReadOnly => quote! { None },
    };
    (accessors, quote! { ::supercol::Property::<#struct_ident>::new::<#value_type>(#column, #role, #getter, #setter) })
}

pub fn new(struct_ident: &Ident, attrs: &EntityAttrs, fields: &[FieldDef]) -> TokenStream {
    let meta = meta_tokens(attrs);
    let (accessors, properties): (Vec<TokenStream>, Vec<TokenStream>) =
        fields.iter().map(|field| property_tokens(struct_ident, field)).unzip();

    quote! {
        impl ::supercol::Entity for #struct_ident {
            fn meta() -> ::supercol::BeanMeta {
                #meta
            }

            #[allow(non_snake_case, unused_variables, dead_code)]
            fn properties() -> Vec<::supercol::Property<Self>> {
                #(#accessors)*
                vec![#(#properties),*]
            }
        }
    }
}
