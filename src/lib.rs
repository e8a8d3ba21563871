//! Flat, fixed-layout binary encoding for fixed-size Rust types.
//!
//! Values are written as the depth-first concatenation of their leaves in
//! field-declaration order: no magic bytes, no length prefixes, no padding.
//! Each type's layout is derived once into a [`PlanNode`] and cached by the
//! [`Encoding`] that first needed it.
//!
//! # Structural encoding
//!
//! ```
//! use fixbuf::{ByteOrder, Encoding, Plannable};
//!
//! #[derive(Plannable, Debug, Default, PartialEq)]
//! struct Header {
//!     kind: u8,
//!     length: u16,
//!     tag: [u8; 2],
//! }
//!
//! let encoding = Encoding::from(ByteOrder::BigEndian);
//! let header = Header { kind: 7, length: 0x0102, tag: *b"ok" };
//!
//! let mut wire = Vec::new();
//! let written = encoding.write(&mut wire, &[&header]).unwrap();
//! assert_eq!(written, 5);
//! assert_eq!(wire, [7, 0x01, 0x02, b'o', b'k']);
//!
//! let mut decoded = Header::default();
//! encoding.read(&mut wire.as_slice(), &mut [&mut decoded]).unwrap();
//! assert_eq!(decoded, header);
//! ```
//!
//! # Custom marshalling
//!
//! Types that own their byte layout implement [`Marshal`] and opt out of
//! field traversal with `#[fixbuf(marshal)]`:
//!
//! ```
//! use std::io::{self, Read, Write};
//! use fixbuf::{Encoding, Marshal, Plannable};
//!
//! #[derive(Plannable, Default)]
//! #[fixbuf(marshal)]
//! struct Version(u8, u8);
//!
//! impl Marshal for Version {
//!     const WIDTH: Option<usize> = Some(1);
//!
//!     fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize> {
//!         sink.write_all(&[self.0 << 4 | self.1 & 0x0f])?;
//!         Ok(1)
//!     }
//!
//!     fn unmarshal_from(&mut self, source: &mut dyn Read) -> io::Result<usize> {
//!         let mut byte = [0u8; 1];
//!         source.read_exact(&mut byte)?;
//!         self.0 = byte[0] >> 4;
//!         self.1 = byte[0] & 0x0f;
//!         Ok(1)
//!     }
//! }
//!
//! let encoding = Encoding::default();
//! assert_eq!(encoding.encode_to_vec(&[&Version(1, 2)]).unwrap(), [0x12]);
//! ```

#![warn(missing_docs)]

mod counter;
mod encoding;
mod error;
mod marshal;
pub mod plan;
mod primitive;

#[cfg(test)]
mod tests;

pub use encoding::{Encoding, Options, Value};
pub use error::{Error, Incomplete, ParseByteOrderError, Result};
pub use marshal::{CustomLeaf, Marshal};
#[doc(hidden)]
pub use marshal::detect as __detect;
pub use plan::{Composite, Field, PlanBuilder, PlanNode, Plannable, PrimitiveLeaf};
pub use primitive::{ByteOrder, Primitive};

#[cfg(feature = "derive")]
pub use fixbuf_macros::Plannable;
