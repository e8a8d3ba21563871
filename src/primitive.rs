//! Fixed-width primitive codec.

use core::{fmt, str::FromStr};

use crate::ParseByteOrderError;

/// Byte order applied to structurally encoded multi-byte primitives.
///
/// Single-byte leaves are unaffected, as are custom leaves, which choose
/// their own layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ByteOrder {
    /// Most-significant byte first.
    #[default]
    BigEndian,
    /// Least-significant byte first.
    LittleEndian,
}

impl ByteOrder {
    /// Byte order of the target architecture.
    pub const fn native() -> Self {
        #[cfg(target_endian = "big")]
        let order = Self::BigEndian;

        #[cfg(target_endian = "little")]
        let order = Self::LittleEndian;

        order
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::BigEndian => f.write_str("big-endian"),
            ByteOrder::LittleEndian => f.write_str("little-endian"),
        }
    }
}

impl FromStr for ByteOrder {
    type Err = ParseByteOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "big" | "be" | "big-endian" | "big_endian" | "network" => Ok(ByteOrder::BigEndian),
            "little" | "le" | "little-endian" | "little_endian" => Ok(ByteOrder::LittleEndian),
            _ => Err(ParseByteOrderError::new(s)),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width value the codec converts directly to bytes.
///
/// Implemented for the integer types with a platform-independent width,
/// `f32`, `f64`, `bool`, and fixed-size arrays of any of these. The set is
/// closed; types with their own layout implement [`Marshal`](crate::Marshal).
pub trait Primitive: sealed::Sealed + Copy + Send + Sync + 'static {
    /// Encoded size in bytes.
    const WIDTH: usize;

    /// Write `self` into the first [`WIDTH`](Self::WIDTH) bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `WIDTH`.
    fn encode(self, order: ByteOrder, out: &mut [u8]);

    /// Read a value from the first [`WIDTH`](Self::WIDTH) bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `WIDTH`.
    fn decode(order: ByteOrder, bytes: &[u8]) -> Self;
}

macro_rules! impl_primitive_for_int {
    ($($ty:ty),+) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Primitive for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn encode(self, order: ByteOrder, out: &mut [u8]) {
                    let bytes = match order {
                        ByteOrder::BigEndian => self.to_be_bytes(),
                        ByteOrder::LittleEndian => self.to_le_bytes(),
                    };
                    out[..Self::WIDTH].copy_from_slice(&bytes);
                }

                #[inline]
                fn decode(order: ByteOrder, bytes: &[u8]) -> Self {
                    // The slice is exactly WIDTH bytes, so try_into() cannot fail.
                    let Ok(raw) = bytes[..Self::WIDTH].try_into() else {
                        unreachable!()
                    };
                    match order {
                        ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                        ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                    }
                }
            }
        )+
    };
}

impl_primitive_for_int!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128);

// Floats travel as their IEEE-754 bit pattern, so NaN payloads survive.
macro_rules! impl_primitive_for_float {
    ($($ty:ty => $bits:ty),+) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Primitive for $ty {
                const WIDTH: usize = <$bits as Primitive>::WIDTH;

                #[inline]
                fn encode(self, order: ByteOrder, out: &mut [u8]) {
                    self.to_bits().encode(order, out);
                }

                #[inline]
                fn decode(order: ByteOrder, bytes: &[u8]) -> Self {
                    <$ty>::from_bits(<$bits>::decode(order, bytes))
                }
            }
        )+
    };
}

impl_primitive_for_float!(f32 => u32, f64 => u64);

impl sealed::Sealed for bool {}

impl Primitive for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn encode(self, _order: ByteOrder, out: &mut [u8]) {
        out[0] = self as u8;
    }

    /// Any non-zero byte reads as `true`.
    #[inline]
    fn decode(_order: ByteOrder, bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl<T: Primitive, const N: usize> sealed::Sealed for [T; N] {}

impl<T: Primitive, const N: usize> Primitive for [T; N] {
    const WIDTH: usize = T::WIDTH * N;

    fn encode(self, order: ByteOrder, out: &mut [u8]) {
        if T::WIDTH == 0 {
            return;
        }
        for (item, chunk) in self.iter().zip(out[..Self::WIDTH].chunks_exact_mut(T::WIDTH)) {
            item.encode(order, chunk);
        }
    }

    fn decode(order: ByteOrder, bytes: &[u8]) -> Self {
        core::array::from_fn(|i| T::decode(order, &bytes[i * T::WIDTH..(i + 1) * T::WIDTH]))
    }
}
