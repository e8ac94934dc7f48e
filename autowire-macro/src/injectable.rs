use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Data, DeriveInput, Expr, Field, Fields, GenericArgument, LitStr,
    PathArguments, Type,
};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = generate_injectable_impl(&input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

/// How a field is supplied at construction time
enum FieldKind<'a> {
    /// `Arc<T>`
    Dependency(&'a Type),
    /// `Arc<dyn Trait>`
    TraitDependency(&'a Type),
    /// `Lazy<T>`
    Lazy(&'a Type),
    /// Anything else
    Value,
}

#[derive(Default)]
struct InjectAttrs {
    key: Option<LitStr>,
    default: Option<Expr>,
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };

    let constructor = match &data.fields {
        Fields::Unit => quote! {
            .construct(|_| ::autowire::Result::Ok(Self))
        },
        Fields::Named(fields) if fields.named.is_empty() => quote! {
            .construct(|_| ::autowire::Result::Ok(Self {}))
        },
        Fields::Named(fields) => {
            let mut params = Vec::new();
            let mut initializers = Vec::new();
            for field in &fields.named {
                let (param, initializer) = field_injection(field)?;
                params.extend(param);
                initializers.push(initializer);
            }
            quote! {
                #(.param(#params))*
                .construct(|args: &::autowire::Arguments| {
                    ::autowire::Result::Ok(Self {
                        #(#initializers),*
                    })
                })
            }
        }
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] only supports structs with named fields",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::autowire::Injectable for #struct_name #ty_generics #where_clause {
            fn descriptor() -> ::autowire::TypeDescriptor {
                ::autowire::TypeDescriptor::of::<Self>()
                    #constructor
            }
        }
    })
}

/// Returns the parameter registration (if the field is one) and the field
/// initializer used inside the constructor closure.
fn field_injection(field: &Field) -> syn::Result<(Option<TokenStream2>, TokenStream2)> {
    let field_name = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let name = field_name.unraw().to_string();
    let attrs = parse_inject_attrs(field)?;
    let field_type = &field.ty;

    match classify(field_type) {
        FieldKind::Lazy(inner) => {
            if let Some(default) = &attrs.default {
                return Err(syn::Error::new_spanned(
                    default,
                    "`Lazy` fields are resolved on access and cannot take a default",
                ));
            }
            let handle = match &attrs.key {
                Some(key) => quote!(::autowire::Lazy::<#inner>::named(args.container(), #key)),
                None => quote!(::autowire::Lazy::<#inner>::new(args.container())),
            };
            Ok((None, quote!(#field_name: #handle)))
        }
        FieldKind::Dependency(inner) => {
            let param = dependency_param(&name, &attrs, inner);
            let param = match &attrs.default {
                Some(default) => quote! {
                    #param.or_default(::std::convert::Into::<#inner>::into(#default))
                },
                None => param,
            };
            Ok((Some(param), quote!(#field_name: args.get::<#inner>(#name)?)))
        }
        FieldKind::TraitDependency(inner) => {
            let param = dependency_param(&name, &attrs, inner);
            let param = match &attrs.default {
                Some(default) => quote! {
                    #param.or_default({
                        let value: ::std::sync::Arc<#inner> = #default;
                        value
                    })
                },
                None => param,
            };
            Ok((Some(param), quote!(#field_name: args.get_trait::<#inner>(#name)?)))
        }
        FieldKind::Value => {
            let param = match &attrs.key {
                Some(key) => quote!(::autowire::Parameter::dependency_on(#name, #key)),
                None => quote!(::autowire::Parameter::value(#name)),
            };
            let param = match &attrs.default {
                Some(default) => quote! {
                    #param.or_default(::std::convert::Into::<#field_type>::into(#default))
                },
                None => param,
            };
            Ok((Some(param), quote!(#field_name: args.value::<#field_type>(#name)?)))
        }
    }
}

fn dependency_param(name: &str, attrs: &InjectAttrs, inner: &Type) -> TokenStream2 {
    match &attrs.key {
        Some(key) => quote!(::autowire::Parameter::dependency_on(#name, #key)),
        None => quote!(::autowire::Parameter::dependency::<#inner>(#name)),
    }
}

fn parse_inject_attrs(field: &Field) -> syn::Result<InjectAttrs> {
    let mut attrs = InjectAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                attrs.key = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("default") {
                attrs.default = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported inject attribute, expected `key` or `default`"))
            }
        })?;
    }
    Ok(attrs)
}

fn classify(ty: &Type) -> FieldKind<'_> {
    if let Some(inner) = wrapped_type(ty, "Arc") {
        return match inner {
            Type::TraitObject(_) => FieldKind::TraitDependency(inner),
            _ => FieldKind::Dependency(inner),
        };
    }
    if let Some(inner) = wrapped_type(ty, "Lazy") {
        return FieldKind::Lazy(inner);
    }
    FieldKind::Value
}

/// Extract `T` from `Wrapper<T>`, matching on the last path segment
fn wrapped_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
