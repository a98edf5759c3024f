//! `#[derive(Reflect)]`
//!
//! For a struct with named fields this generates a static `TypeDescriptor`
//! (type name plus one entry per field, in declaration order) and
//! implementations of `Reflect`, `Reconstruct` and `Field`. For a fieldless
//! enum it generates a static `EnumDescriptor` and implementations of
//! `Enumeration` and `Field`.
//!
//! Element names default to the UpperCamelCase form of the field name
//! (`user_name` becomes `UserName`); the type name is the struct's own
//! identifier. Both can be overridden:
//!
//! ```ignore
//! #[derive(Reflect)]
//! #[reflect(rename = "AppUser")]
//! struct User {
//!     #[reflect(rename = "Login")]
//!     user_name: String,
//! }
//! ```

use heck::ToUpperCamelCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DataEnum, DeriveInput, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic types",
        ));
    }

    let type_name = rename_of(&input.attrs)?.unwrap_or_else(|| input.ident.unraw().to_string());

    match &input.data {
        Data::Struct(data) => expand_struct(input, &type_name, &data.fields),
        Data::Enum(data) => expand_enum(input, &type_name, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Reflect cannot be derived for unions",
        )),
    }
}

/// Reads `#[reflect(rename = "...")]`.
fn rename_of(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rename = None;
    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported reflect attribute, expected `rename`"))
            }
        })?;
    }
    Ok(rename)
}

fn expand_struct(input: &DeriveInput, type_name: &str, fields: &Fields) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    let mut descriptors = Vec::new();
    let mut values = Vec::new();
    let mut inits = Vec::new();

    match fields {
        Fields::Named(named) => {
            for (index, field) in named.named.iter().enumerate() {
                let field_ident = field.ident.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(field, "Reflect requires named fields")
                })?;
                let ty = &field.ty;
                let element = rename_of(&field.attrs)?
                    .unwrap_or_else(|| field_ident.unraw().to_string().to_upper_camel_case());

                descriptors.push(quote! {
                    ::xmlops_support::FieldDescriptor {
                        name: #element,
                        kind: <#ty as ::xmlops_support::Field>::kind,
                    }
                });
                values.push(quote! {
                    ::xmlops_support::Field::to_field_value(&self.#field_ident)
                        .map_err(|err| err.within(#type_name, #element))?
                });
                inits.push(quote! {
                    #field_ident: ::xmlops_support::member_from_json(object, descriptor, #index)?
                });
            }
        }
        Fields::Unit => {}
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "Reflect requires a struct with named fields",
            ));
        }
    }

    let construct = match fields {
        Fields::Unit => quote! { Self },
        _ => quote! { Self { #(#inits),* } },
    };

    Ok(quote! {
        impl ::xmlops_support::Reflect for #ident {
            fn type_descriptor(&self) -> &'static ::xmlops_support::TypeDescriptor {
                <Self as ::xmlops_support::Reconstruct>::descriptor()
            }

            fn field_values(
                &self,
            ) -> ::std::result::Result<
                ::std::vec::Vec<::xmlops_support::FieldValue<'_>>,
                ::xmlops_support::ReflectError,
            > {
                ::std::result::Result::Ok(::std::vec![#(#values),*])
            }
        }

        impl ::xmlops_support::Reconstruct for #ident {
            fn descriptor() -> &'static ::xmlops_support::TypeDescriptor {
                static DESCRIPTOR: ::xmlops_support::TypeDescriptor =
                    ::xmlops_support::TypeDescriptor {
                        name: #type_name,
                        id: ::std::any::TypeId::of::<#ident>,
                        fields: &[#(#descriptors),*],
                    };
                &DESCRIPTOR
            }

            #[allow(unused_variables)]
            fn from_json(
                value: &::xmlops_support::JsonValue,
            ) -> ::std::result::Result<Self, ::xmlops_support::ReflectError> {
                let descriptor = <Self as ::xmlops_support::Reconstruct>::descriptor();
                let object = ::xmlops_support::expect_object(value, descriptor)?;
                ::std::result::Result::Ok(#construct)
            }
        }

        impl ::xmlops_support::Field for #ident {
            fn kind() -> ::xmlops_support::FieldKind {
                ::xmlops_support::FieldKind::Composite(
                    <Self as ::xmlops_support::Reconstruct>::descriptor,
                )
            }

            fn to_field_value(
                &self,
            ) -> ::std::result::Result<
                ::xmlops_support::FieldValue<'_>,
                ::xmlops_support::ReflectError,
            > {
                ::std::result::Result::Ok(::xmlops_support::FieldValue::Composite(self))
            }

            fn from_json_value(
                value: &::xmlops_support::JsonValue,
            ) -> ::std::result::Result<Self, ::xmlops_support::ReflectError> {
                <Self as ::xmlops_support::Reconstruct>::from_json(value)
            }
        }
    })
}

fn expand_enum(input: &DeriveInput, type_name: &str, data: &DataEnum) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            ident,
            "Reflect cannot be derived for an enum without variants",
        ));
    }

    let mut members = Vec::new();
    let mut to_arms = Vec::new();
    let mut from_arms = Vec::new();

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Reflect can only be derived for enums whose variants have no fields",
            ));
        }
        let variant_ident = &variant.ident;
        let name = rename_of(&variant.attrs)?.unwrap_or_else(|| variant_ident.unraw().to_string());

        members.push(quote! {
            ::xmlops_support::EnumMember {
                name: #name,
                value: #ident::#variant_ident as i64,
            }
        });
        to_arms.push(quote! { Self::#variant_ident => #name });
        from_arms.push(quote! { #name => ::std::result::Result::Ok(Self::#variant_ident) });
    }

    Ok(quote! {
        impl ::xmlops_support::Enumeration for #ident {
            fn descriptor() -> &'static ::xmlops_support::EnumDescriptor {
                static DESCRIPTOR: ::xmlops_support::EnumDescriptor =
                    ::xmlops_support::EnumDescriptor {
                        name: #type_name,
                        id: ::std::any::TypeId::of::<#ident>,
                        members: &[#(#members),*],
                    };
                &DESCRIPTOR
            }
        }

        impl ::xmlops_support::Field for #ident {
            fn kind() -> ::xmlops_support::FieldKind {
                ::xmlops_support::FieldKind::Enum(
                    <Self as ::xmlops_support::Enumeration>::descriptor,
                )
            }

            fn to_field_value(
                &self,
            ) -> ::std::result::Result<
                ::xmlops_support::FieldValue<'_>,
                ::xmlops_support::ReflectError,
            > {
                ::std::result::Result::Ok(::xmlops_support::FieldValue::Enum(match self {
                    #(#to_arms),*
                }))
            }

            fn from_json_value(
                value: &::xmlops_support::JsonValue,
            ) -> ::std::result::Result<Self, ::xmlops_support::ReflectError> {
                let descriptor = <Self as ::xmlops_support::Enumeration>::descriptor();
                let member = ::xmlops_support::enum_member_from_json(descriptor, value)?;
                match member.name {
                    #(#from_arms,)*
                    other => ::std::result::Result::Err(
                        ::xmlops_support::ReflectError::InvalidEnumValue {
                            enum_name: descriptor.name,
                            text: ::std::string::ToString::to_string(other),
                        },
                    ),
                }
            }
        }
    })
}
