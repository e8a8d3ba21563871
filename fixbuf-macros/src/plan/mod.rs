//! Derive support for layout plans.

mod plannable;

pub use plannable::derive_plannable;

/// Type-level `#[fixbuf(...)]` options.
#[derive(Default)]
pub struct TypeAttrs {
    /// Plan the type as one custom leaf through its `Marshal` impl.
    pub marshal: bool,
}

/// Parse `#[fixbuf(marshal)]` from the type's attributes.
pub fn type_attrs(attrs: &[syn::Attribute]) -> syn::Result<TypeAttrs> {
    let mut parsed = TypeAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("fixbuf") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("marshal") {
                parsed.marshal = true;
                Ok(())
            } else {
                Err(meta.error("unknown fixbuf type attribute, expected `marshal`"))
            }
        })?;
    }
    Ok(parsed)
}

/// Check if a field has `#[fixbuf(skip)]`.
pub fn has_skip_attr(field: &syn::Field) -> syn::Result<bool> {
    let mut found = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("fixbuf") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                found = true;
                Ok(())
            } else {
                Err(meta.error("unknown fixbuf field attribute, expected `skip`"))
            }
        })?;
    }
    Ok(found)
}
