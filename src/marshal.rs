//! Custom marshalling capability and its leaf dispatch.

use core::any::{Any, type_name};
use std::io::{self, Read, Write};

use log::warn;
use snafu::{OptionExt, ResultExt};

use crate::{
    Result,
    counter::Counter,
    error::{MarshalSnafu, PlanMismatchSnafu, UnmarshalSnafu},
};

/// A type that owns its byte layout.
///
/// Types implementing `Marshal` are encoded as a single custom leaf when
/// planned by `#[derive(Plannable)]` (with or without `#[fixbuf(marshal)]`)
/// or with [`PlanNode::custom`](crate::PlanNode::custom) by hand: no field
/// traversal happens and the configured
/// [`ByteOrder`](crate::ByteOrder) does not apply. A leaf may mix orders
/// within itself.
///
/// Both operations report how many bytes they moved, and that count is
/// taken as the leaf's width. On top of that, the count is checked: it must
/// match what actually crossed the stream, and [`WIDTH`](Self::WIDTH) when
/// it is declared. A mismatch fails the call with
/// [`Error::Marshal`](crate::Error::Marshal) or
/// [`Error::Unmarshal`](crate::Error::Unmarshal) instead of being trusted.
///
/// `unmarshal_from` receives the caller's destination. Decoding into a copy
/// of `self` and dropping it leaves the destination untouched, and the round
/// trip silently breaks.
pub trait Marshal: Any {
    /// Bytes every call moves, when fixed and known up front.
    const WIDTH: Option<usize> = None;

    /// Write `self` to `sink`, returning the bytes written.
    fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize>;

    /// Overwrite `self` from `source`, returning the bytes read.
    fn unmarshal_from(&mut self, source: &mut dyn Read) -> io::Result<usize>;
}

type MarshalFn = fn(&dyn Any, &mut dyn Write) -> Result<usize>;
type UnmarshalFn = fn(&mut dyn Any, &mut dyn Read) -> Result<usize>;

/// Plan leaf that hands a value to its [`Marshal`] impl.
///
/// The dispatch target is resolved once, when the plan is built.
pub struct CustomLeaf {
    type_name: &'static str,
    width: Option<usize>,
    marshal: MarshalFn,
    unmarshal: UnmarshalFn,
}

impl CustomLeaf {
    /// Leaf for `T`.
    pub fn of<T: Marshal>() -> Self {
        Self {
            type_name: type_name::<T>(),
            width: T::WIDTH,
            marshal: marshal_leaf::<T>,
            unmarshal: unmarshal_leaf::<T>,
        }
    }

    /// Name of the marshalled type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declared width, if any.
    #[inline]
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    #[inline]
    pub(crate) fn marshal(&self, value: &dyn Any, sink: &mut dyn Write) -> Result<usize> {
        (self.marshal)(value, sink)
    }

    #[inline]
    pub(crate) fn unmarshal(&self, dest: &mut dyn Any, source: &mut dyn Read) -> Result<usize> {
        (self.unmarshal)(dest, source)
    }
}

impl core::fmt::Debug for CustomLeaf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomLeaf")
            .field("type_name", &self.type_name)
            .field("width", &self.width)
            .finish()
    }
}

fn marshal_leaf<T: Marshal>(value: &dyn Any, sink: &mut dyn Write) -> Result<usize> {
    let type_name = type_name::<T>();
    let value = value
        .downcast_ref::<T>()
        .context(PlanMismatchSnafu { type_name })?;

    let mut counted = Counter::new(sink);
    let reported = value
        .marshal_to(&mut counted)
        .context(MarshalSnafu { type_name })?;
    check_count(type_name, reported, counted.count(), T::WIDTH)
        .context(MarshalSnafu { type_name })?;
    Ok(reported)
}

fn unmarshal_leaf<T: Marshal>(dest: &mut dyn Any, source: &mut dyn Read) -> Result<usize> {
    let type_name = type_name::<T>();
    let dest = dest
        .downcast_mut::<T>()
        .context(PlanMismatchSnafu { type_name })?;

    let mut counted = Counter::new(source);
    let reported = dest
        .unmarshal_from(&mut counted)
        .context(UnmarshalSnafu { type_name })?;
    check_count(type_name, reported, counted.count(), T::WIDTH)
        .context(UnmarshalSnafu { type_name })?;
    Ok(reported)
}

/// The reported count is the leaf's width, so it must agree with the
/// stream and with any declared width.
fn check_count(
    type_name: &'static str,
    reported: usize,
    moved: usize,
    declared: Option<usize>,
) -> io::Result<()> {
    if reported != moved {
        warn!("custom leaf `{type_name}` reported {reported} bytes but moved {moved}");
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("reported {reported} bytes but moved {moved}"),
        ));
    }
    match declared {
        Some(width) if width != reported => {
            warn!("custom leaf `{type_name}` declares {width} bytes but moved {reported}");
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("declares {width} bytes but moved {reported}"),
            ))
        }
        _ => Ok(()),
    }
}

/// Derive support: picks the custom leaf for types that implement
/// [`Marshal`], even without `#[fixbuf(marshal)]`.
///
/// `(&&Detect::<T>::new()).custom_plan()` resolves to `ViaMarshal` when
/// `T: Marshal` and falls back to `ViaFields` otherwise.
#[doc(hidden)]
#[allow(missing_docs)]
pub mod detect {
    use core::marker::PhantomData;

    use super::Marshal;
    use crate::PlanNode;

    pub struct Detect<T>(PhantomData<fn() -> T>);

    impl<T> Detect<T> {
        #[inline]
        pub const fn new() -> Self {
            Detect(PhantomData)
        }
    }

    impl<T> Default for Detect<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    pub trait ViaMarshal {
        fn custom_plan(&self) -> Option<PlanNode>;
    }

    impl<T: Marshal> ViaMarshal for &Detect<T> {
        #[inline]
        fn custom_plan(&self) -> Option<PlanNode> {
            Some(PlanNode::custom::<T>())
        }
    }

    pub trait ViaFields {
        fn custom_plan(&self) -> Option<PlanNode>;
    }

    impl<T> ViaFields for Detect<T> {
        #[inline]
        fn custom_plan(&self) -> Option<PlanNode> {
            None
        }
    }
}
