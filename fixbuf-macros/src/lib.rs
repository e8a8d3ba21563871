//! Derive macro for fixbuf.

use proc_macro::TokenStream;
mod plan;

/// Derive `Plannable`.
///
/// Structs get a composite plan over their fields in declaration order,
/// unless they implement `Marshal`, in which case they plan as a single
/// custom leaf. `#[fixbuf(skip)]` leaves a field off the wire.
/// `#[fixbuf(marshal)]` on the type asks for the custom leaf up front, so
/// the fields are never looked at; enums and records with unplannable
/// fields need it.
#[proc_macro_derive(Plannable, attributes(fixbuf))]
pub fn derive_plannable(input: TokenStream) -> TokenStream {
    plan::derive_plannable(input)
}
