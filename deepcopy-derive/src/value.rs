use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::parse_field_attrs;

/// A declared field: its reported name, how to reach it, and whether the copy
/// may touch it.
struct FieldInfo {
    name: String,
    member: syn::Member,
    skip: bool,
}

fn collect_fields(fields: &syn::Fields) -> syn::Result<Vec<FieldInfo>> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| -> syn::Result<FieldInfo> {
            let attrs = parse_field_attrs(&f.attrs)?;
            let (name, member) = match &f.ident {
                Some(ident) => (ident.to_string(), syn::Member::Named(ident.clone())),
                None => (i.to_string(), syn::Member::Unnamed(syn::Index::from(i))),
            };
            Ok(FieldInfo {
                name,
                member,
                skip: attrs.skip,
            })
        })
        .collect()
}

pub(crate) fn generate_struct_value(
    krate: &syn::Path,
    data: &syn::DataStruct,
) -> syn::Result<TokenStream> {
    let fields = collect_fields(&data.fields)?;
    let len = fields.len();

    let names = fields.iter().enumerate().map(|(i, f)| {
        let name = &f.name;
        quote! { #i => ::std::option::Option::Some(#name), }
    });

    let readable: Vec<_> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.skip)
        .collect();

    let reads = readable.iter().map(|(i, f)| {
        let member = &f.member;
        quote! {
            #i => ::std::option::Option::Some(&self.#member as &dyn #krate::Reflect),
        }
    });

    let writes = readable.iter().map(|(i, f)| {
        let member = &f.member;
        quote! {
            #i => ::std::option::Option::Some(&mut self.#member as &mut dyn #krate::Reflect),
        }
    });

    Ok(quote! {
        fn field_len(&self) -> usize {
            #len
        }

        fn field_name(&self, index: usize) -> ::std::option::Option<&'static str> {
            match index {
                #(#names)*
                _ => ::std::option::Option::None,
            }
        }

        fn field(&self, index: usize) -> ::std::option::Option<&dyn #krate::Reflect> {
            match index {
                #(#reads)*
                _ => ::std::option::Option::None,
            }
        }

        fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn #krate::Reflect> {
            match index {
                #(#writes)*
                _ => ::std::option::Option::None,
            }
        }
    })
}

/// Pattern matching `variant` regardless of its fields.
fn variant_wildcard(variant: &syn::Variant) -> TokenStream {
    let ident = &variant.ident;
    match &variant.fields {
        syn::Fields::Named(_) => quote! { Self::#ident { .. } },
        syn::Fields::Unnamed(_) => quote! { Self::#ident(..) },
        syn::Fields::Unit => quote! { Self::#ident },
    }
}

/// Pattern binding only field `index` of `variant` to `binding`.
fn variant_binding(
    variant: &syn::Variant,
    field: &FieldInfo,
    index: usize,
    binding: &syn::Ident,
) -> TokenStream {
    let ident = &variant.ident;
    match &field.member {
        syn::Member::Named(name) => quote! { Self::#ident { #name: #binding, .. } },
        syn::Member::Unnamed(_) => {
            let slots = (0..variant.fields.len()).map(|i| {
                if i == index {
                    quote! { #binding }
                } else {
                    quote! { _ }
                }
            });
            quote! { Self::#ident(#(#slots),*) }
        }
    }
}

/// Expression building the zero value of `variant`.
fn variant_zero(variant: &syn::Variant) -> TokenStream {
    let ident = &variant.ident;
    let zero = quote! { ::std::default::Default::default() };
    match &variant.fields {
        syn::Fields::Named(fields) => {
            let inits = fields.named.iter().map(|f| {
                let name = &f.ident;
                quote! { #name: #zero }
            });
            quote! { Self::#ident { #(#inits),* } }
        }
        syn::Fields::Unnamed(fields) => {
            let inits = fields.unnamed.iter().map(|_| zero.clone());
            quote! { Self::#ident(#(#inits),*) }
        }
        syn::Fields::Unit => quote! { Self::#ident },
    }
}

pub(crate) fn generate_enum_value(
    krate: &syn::Path,
    data: &syn::DataEnum,
) -> syn::Result<TokenStream> {
    let variants: Vec<_> = data
        .variants
        .iter()
        .map(|v| -> syn::Result<_> { Ok((v, collect_fields(&v.fields)?)) })
        .collect::<syn::Result<_>>()?;

    let mut index_arms = Vec::new();
    let mut name_arms = Vec::new();
    let mut set_arms = Vec::new();
    let mut len_arms = Vec::new();
    let mut field_name_arms = Vec::new();
    let mut read_arms = Vec::new();
    let mut write_arms = Vec::new();

    for (position, (variant, fields)) in variants.iter().enumerate() {
        let wildcard = variant_wildcard(variant);
        let variant_name = variant.ident.to_string();
        let len = fields.len();
        let zero = variant_zero(variant);

        index_arms.push(quote! { #wildcard => #position, });
        name_arms.push(quote! { #wildcard => #variant_name, });
        len_arms.push(quote! { #wildcard => #len, });
        set_arms.push(quote! {
            #position => {
                *self = #zero;
                true
            }
        });

        let names = fields.iter().enumerate().map(|(i, f)| {
            let name = &f.name;
            quote! { #i => ::std::option::Option::Some(#name), }
        });
        field_name_arms.push(quote! {
            #wildcard => match index {
                #(#names)*
                _ => ::std::option::Option::None,
            },
        });

        for (i, field) in fields.iter().enumerate().filter(|(_, f)| !f.skip) {
            let binding = format_ident!("field_{}", i);
            let pattern = variant_binding(variant, field, i, &binding);
            read_arms.push(quote! {
                (#pattern, #i) => ::std::option::Option::Some(#binding as &dyn #krate::Reflect),
            });
            write_arms.push(quote! {
                (#pattern, #i) => ::std::option::Option::Some(#binding as &mut dyn #krate::Reflect),
            });
        }
    }

    Ok(quote! {
        fn variant_index(&self) -> usize {
            match self {
                #(#index_arms)*
            }
        }

        fn variant_name(&self) -> &'static str {
            match self {
                #(#name_arms)*
            }
        }

        fn set_variant(&mut self, index: usize) -> bool {
            match index {
                #(#set_arms)*
                _ => false,
            }
        }

        fn field_len(&self) -> usize {
            match self {
                #(#len_arms)*
            }
        }

        fn field_name(&self, index: usize) -> ::std::option::Option<&'static str> {
            match self {
                #(#field_name_arms)*
            }
        }

        fn field(&self, index: usize) -> ::std::option::Option<&dyn #krate::Reflect> {
            match (self, index) {
                #(#read_arms)*
                _ => ::std::option::Option::None,
            }
        }

        fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn #krate::Reflect> {
            match (self, index) {
                #(#write_arms)*
                _ => ::std::option::Option::None,
            }
        }
    })
}
