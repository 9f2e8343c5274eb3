use crate::field_parser::VariantDef;
use proc_macro2::{Ident, TokenStream};
use quote::quote;

pub fn new(enum_ident: &Ident, variants: &[VariantDef]) -> TokenStream {
    let idents: Vec<&Ident> = variants.iter().map(|v| &v.ident).collect();
    let names: Vec<&String> = variants.iter().map(|v| &v.name).collect();

    quote! {
        impl ::supercol::NamedEnum for #enum_ident {
            fn name(&self) -> &'static str {
                match self {
                    #(#enum_ident::#idents => #names,)*
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    #(#names => Some(#enum_ident::#idents),)*
                    _ => None,
                }
            }
        }

        ::supercol::inventory::submit! {
            ::supercol::EnumInfo::of::<#enum_ident>()
        }
    }
}
