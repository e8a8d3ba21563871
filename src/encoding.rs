//! Write/read entry points.

use core::any::{Any, TypeId};
use std::{
    fmt,
    io::{self, Read, Write},
    sync::Arc,
};

use log::trace;

use crate::{
    ByteOrder, Incomplete, Result,
    counter::Counter,
    error::Error,
    plan::{PlanCache, PlanNode, Plannable, build_root},
};

/// Encoding configuration.
///
/// The byte order is the only option; it applies to every structurally
/// encoded multi-byte primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Options {
    /// Byte order for multi-byte primitives. Big-endian by default.
    pub byte_order: ByteOrder,
}

impl Options {
    /// Default options: big-endian.
    pub const fn new() -> Self {
        Self {
            byte_order: ByteOrder::BigEndian,
        }
    }

    /// Set the byte order.
    #[must_use]
    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }
}

mod sealed {
    pub trait Sealed {}

    impl<T: super::Plannable> Sealed for T {}
}

/// Anything [`Encoding::write`] and [`Encoding::read`] accept.
///
/// Implemented for every [`Plannable`] type, so `&value` coerces to
/// `&dyn Value` and `&mut value` to `&mut dyn Value`.
pub trait Value: sealed::Sealed {
    #[doc(hidden)]
    fn plan_in(&self, encoding: &Encoding) -> Result<Arc<PlanNode>>;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Plannable> Value for T {
    #[inline]
    fn plan_in(&self, encoding: &Encoding) -> Result<Arc<PlanNode>> {
        encoding.plan_of::<T>()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A configured codec and its plan cache.
///
/// Share one `Encoding` (by reference or in an `Arc`) across threads: plans
/// are built once per type and read lock-free afterwards. Each stream must
/// be driven by one call at a time, which `&mut` on the stream enforces.
pub struct Encoding {
    options: Options,
    plans: PlanCache,
}

impl Encoding {
    /// Create an encoding with an empty plan cache.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            plans: PlanCache::new(),
        }
    }

    /// The configuration this encoding was built with.
    #[inline]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Configured byte order.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.options.byte_order
    }

    /// The plan for `T`, built on first use.
    pub fn plan_of<T: Plannable>(&self) -> Result<Arc<PlanNode>> {
        self.plans.get_or_build(TypeId::of::<T>(), build_root::<T>)
    }

    /// Encoded width of `T`, when every leaf declares one.
    pub fn width_of<T: Plannable>(&self) -> Result<Option<usize>> {
        Ok(self.plan_of::<T>()?.width())
    }

    /// Number of plans cached so far, sub-plans included.
    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    /// Encode `values` into `sink`, in order, returning the bytes written.
    ///
    /// Every value's plan is resolved before the first byte is written, so a
    /// type without a fixed layout leaves the sink untouched. Each value is
    /// staged whole and then handed to the sink; on failure the sink keeps
    /// whatever it already accepted, and [`Incomplete::bytes`] says how much
    /// that was.
    ///
    /// Nothing is retried, with one exception: a sink write failing with
    /// [`io::ErrorKind::Interrupted`] is reissued, as `Write::write_all`
    /// does. Any other sink error ends the call.
    pub fn write<W>(&self, sink: &mut W, values: &[&dyn Value]) -> Result<usize, Incomplete>
    where
        W: Write + ?Sized,
    {
        let plans = self.resolve(values.iter().map(|value| (**value).plan_in(self)))?;
        trace!("write: {} values", values.len());

        let order = self.options.byte_order;
        let mut staged = Vec::new();
        let mut total = 0usize;
        for (value, plan) in values.iter().zip(&plans) {
            staged.clear();
            plan.encode((**value).as_any(), order, &mut staged)
                .map_err(|error| Incomplete::new(total, error))?;
            emit(sink, &staged, &mut total).map_err(|error| Incomplete::new(total, error))?;
        }

        trace!("write: {total} bytes");
        Ok(total)
    }

    /// Decode into `dests`, in order, returning the bytes read.
    ///
    /// Each destination is overwritten in place. On failure, destinations
    /// (and fields) decoded before the failing step keep their new values,
    /// and [`Incomplete::bytes`] reports how much of `source` was consumed.
    pub fn read<R>(&self, source: &mut R, dests: &mut [&mut dyn Value]) -> Result<usize, Incomplete>
    where
        R: Read + ?Sized,
    {
        let plans = self.resolve(dests.iter().map(|dest| (**dest).plan_in(self)))?;
        trace!("read: {} values", dests.len());

        let order = self.options.byte_order;
        let mut source = Counter::new(source);
        let mut scratch = Vec::new();
        for (dest, plan) in dests.iter_mut().zip(&plans) {
            plan.decode((**dest).as_any_mut(), order, &mut source, &mut scratch)
                .map_err(|error| Incomplete::new(source.count(), error))?;
        }

        trace!("read: {} bytes", source.count());
        Ok(source.count())
    }

    /// Encode `values` into a fresh buffer.
    pub fn encode_to_vec(&self, values: &[&dyn Value]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf, values)?;
        Ok(buf)
    }

    /// Decode `dests` from the front of `bytes`, returning the bytes consumed.
    ///
    /// Trailing bytes are left alone.
    pub fn decode_from_slice(&self, mut bytes: &[u8], dests: &mut [&mut dyn Value]) -> Result<usize> {
        Ok(self.read(&mut bytes, dests)?)
    }

    fn resolve(
        &self,
        plans: impl Iterator<Item = Result<Arc<PlanNode>>>,
    ) -> Result<Vec<Arc<PlanNode>>, Incomplete> {
        plans
            .collect::<Result<Vec<_>>>()
            .map_err(|error| Incomplete::new(0, error))
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl From<Options> for Encoding {
    fn from(options: Options) -> Self {
        Self::new(options)
    }
}

impl From<ByteOrder> for Encoding {
    fn from(byte_order: ByteOrder) -> Self {
        Self::new(Options::new().with_byte_order(byte_order))
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoding")
            .field("options", &self.options)
            .field("cached_plans", &self.cached_plans())
            .finish()
    }
}

/// Push `bytes` into `sink`, counting what it accepts.
fn emit<W: Write + ?Sized>(sink: &mut W, mut bytes: &[u8], total: &mut usize) -> Result<()> {
    while !bytes.is_empty() {
        match sink.write(bytes) {
            Ok(0) => {
                return Err(Error::Io {
                    source: io::ErrorKind::WriteZero.into(),
                });
            }
            Ok(n) => {
                *total += n;
                bytes = &bytes[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => return Err(Error::Io { source }),
        }
    }
    Ok(())
}
