use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

mod value;

/// Attribute macro that derives all traits a copyable type needs.
///
/// This is syntax sugar that expands to:
/// ```ignore
/// #[derive(Debug, Clone, Default, Reflect)]
/// ```
///
/// Enums still need a `#[default]` variant.
///
/// # Example
///
/// ```ignore
/// use deepcopy_core::{reflected, Ptr};
///
/// #[reflected]
/// struct Node {
///     value: i32,
///     next: Ptr<Node>,
/// }
/// ```
#[proc_macro_attribute]
pub fn reflected(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(attr, "#[reflected] takes no arguments")
            .to_compile_error()
            .into();
    }
    let input = parse_macro_input!(item as DeriveInput);

    let output = quote! {
        #[derive(
            ::std::fmt::Debug,
            ::std::clone::Clone,
            ::std::default::Default,
            ::deepcopy_core::Reflect
        )]
        #input
    };

    output.into()
}

/// Derive macro for the Reflect trait.
///
/// Structs get a `StructValue` view and enums an `EnumValue` view, so the copy
/// walks their fields. The type must also implement `Clone` and `Default`.
///
/// # Example
///
/// ```ignore
/// use deepcopy_core::Reflect;
///
/// #[derive(Debug, Clone, Default, Reflect)]
/// struct Settings {
///     name: String,
///     #[reflect(skip)]
///     scratch: Vec<u8>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[reflect(skip)]` on a field - Never read or written by the copy; the
///   destination keeps its own value
/// - `#[reflect(as_is)]` on the type - Copied by a single `clone()`, fields are
///   not walked
/// - `#[reflect(crate = "path")]` on the type - Path to `deepcopy_core` when it
///   is re-exported under another name
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_reflect_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_reflect_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = parse_container_attrs(&input.attrs)?;
    let krate = &attrs.krate;
    let name = &input.ident;
    let generics = &input.generics;

    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Reflect cannot be derived for types with lifetime parameters",
        ));
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Build where clause with Reflect bounds for type parameters
    let where_clause = build_where_clause(krate, generics, where_clause);

    let (kind, view_impl) = if attrs.as_is {
        (quote! { Primitive }, quote! {})
    } else {
        match &input.data {
            syn::Data::Struct(data) => (
                quote! { Struct(self) },
                value::generate_struct_value(krate, data)?,
            ),
            syn::Data::Enum(data) => {
                if data.variants.is_empty() {
                    return Err(syn::Error::new_spanned(
                        input,
                        "Reflect cannot be derived for enums without variants",
                    ));
                }
                (
                    quote! { Enum(self) },
                    value::generate_enum_value(krate, data)?,
                )
            }
            syn::Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Reflect cannot be derived for unions",
                ));
            }
        }
    };

    let view_impl = if attrs.as_is {
        quote! {}
    } else {
        let trait_name = match &input.data {
            syn::Data::Enum(_) => quote! { EnumValue },
            _ => quote! { StructValue },
        };
        quote! {
            impl #impl_generics #krate::#trait_name for #name #ty_generics #where_clause {
                #view_impl
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #krate::Reflect for #name #ty_generics #where_clause {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn reflect_ref(&self) -> #krate::ReflectRef<'_> {
                #krate::ReflectRef::#kind
            }

            fn reflect_mut(&mut self) -> #krate::ReflectMut<'_> {
                #krate::ReflectMut::#kind
            }

            fn clone_value(&self) -> ::std::boxed::Box<dyn #krate::Reflect> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn new_zeroed(&self) -> ::std::boxed::Box<dyn #krate::Reflect> {
                ::std::boxed::Box::new(<Self as ::std::default::Default>::default())
            }

            fn assign(
                &mut self,
                source: &dyn #krate::Reflect,
            ) -> ::std::result::Result<(), #krate::CopyError> {
                #krate::assign_cloned(self, source)
            }
        }

        #view_impl
    })
}

fn build_where_clause(
    krate: &syn::Path,
    generics: &syn::Generics,
    existing: Option<&syn::WhereClause>,
) -> proc_macro2::TokenStream {
    let type_params: Vec<_> = generics.type_params().map(|p| &p.ident).collect();

    let reflect_bounds = type_params.iter().map(|p| {
        quote! {
            #p: #krate::Reflect + ::std::clone::Clone + ::std::default::Default
        }
    });

    let existing_predicates = existing
        .map(|w| {
            // Re-emitted one by one: the user's clause may already end in a comma.
            let predicates = w.predicates.iter();
            quote! { #(#predicates,)* }
        })
        .unwrap_or_default();

    quote! {
        where
            Self: ::std::clone::Clone + ::std::default::Default,
            #existing_predicates
            #(#reflect_bounds),*
    }
}

pub(crate) struct ContainerAttrs {
    pub as_is: bool,
    pub krate: syn::Path,
}

fn parse_container_attrs(attrs: &[syn::Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs {
        as_is: false,
        krate: syn::parse_quote! { ::deepcopy_core },
    };

    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("as_is") {
                result.as_is = true;
                Ok(())
            } else if meta.path.is_ident("crate") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.krate = value.parse()?;
                Ok(())
            } else {
                Err(meta.error("expected `as_is` or `crate = \"...\"`"))
            }
        })?;
    }

    Ok(result)
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub skip: bool,
}

pub(crate) fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }

    Ok(result)
}
