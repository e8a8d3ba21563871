//! Plannable derive macro implementation.

use super::{has_skip_attr, type_attrs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, ext::IdentExt, parse_macro_input, parse_quote};

/// Derive the `Plannable` trait for a struct, or for any type marked
/// `#[fixbuf(marshal)]`.
pub fn derive_plannable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if let Some(param) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            param,
            "Plannable types must be 'static; lifetime parameters are not supported",
        ));
    }

    let attrs = type_attrs(&input.attrs)?;
    let mut generics = input.generics.clone();

    let body = if attrs.marshal {
        if !generics.params.is_empty() {
            let (_, ty_generics, _) = input.generics.split_for_impl();
            generics
                .make_where_clause()
                .predicates
                .push(parse_quote!(#name #ty_generics: fixbuf::Marshal));
        }
        quote! {
            fn build_plan(_builder: &mut fixbuf::PlanBuilder<'_>) -> fixbuf::Result<fixbuf::PlanNode> {
                Ok(fixbuf::PlanNode::custom::<Self>())
            }
        }
    } else {
        let field_plans = match &input.data {
            Data::Struct(data) => generate_struct(&data.fields)?,
            Data::Enum(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "enums have no fixed layout; implement `fixbuf::Marshal` and add #[fixbuf(marshal)]",
                ));
            }
            Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Plannable derive is not supported for unions.",
                ));
            }
        };
        let params: Vec<_> = generics.type_params().map(|p| p.ident.clone()).collect();
        for param in params {
            generics
                .make_where_clause()
                .predicates
                .push(parse_quote!(#param: fixbuf::Plannable));
        }
        quote! {
            fn build_plan(builder: &mut fixbuf::PlanBuilder<'_>) -> fixbuf::Result<fixbuf::PlanNode> {
                #[allow(unused_imports)]
                use fixbuf::__detect::{ViaFields as _, ViaMarshal as _};
                // A Marshal impl owns the layout, attribute or not.
                if let Some(node) = (&&fixbuf::__detect::Detect::<Self>::new()).custom_plan() {
                    return Ok(node);
                }
                #[allow(unused_mut)]
                let mut fields = builder.composite::<Self>();
                #field_plans
                Ok(fields.finish())
            }
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics fixbuf::Plannable for #name #ty_generics #where_clause {
            #body
        }
    })
}

fn generate_struct(fields: &Fields) -> syn::Result<TokenStream2> {
    let mut field_plans = Vec::new();
    match fields {
        Fields::Named(named) => {
            for f in &named.named {
                if has_skip_attr(f)? {
                    continue;
                }
                let ty = &f.ty;
                let member = &f.ident;
                let label = member
                    .as_ref()
                    .map_or_else(String::new, |id| id.unraw().to_string());
                field_plans.push(quote! {
                    fields.field::<#ty>(#label, |v| &v.#member, |v| &mut v.#member)?;
                });
            }
        }
        Fields::Unnamed(unnamed) => {
            for (i, f) in unnamed.unnamed.iter().enumerate() {
                if has_skip_attr(f)? {
                    continue;
                }
                let ty = &f.ty;
                let index = syn::Index::from(i);
                let label = i.to_string();
                field_plans.push(quote! {
                    fields.field::<#ty>(#label, |v| &v.#index, |v| &mut v.#index)?;
                });
            }
        }
        Fields::Unit => {}
    }
    Ok(quote! { #(#field_plans)* })
}
