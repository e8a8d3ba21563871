//! Layout plans.
//!
//! A [`PlanNode`] describes how one type's bytes are laid out: a primitive
//! leaf, a custom leaf, or a composite of per-field sub-plans in declaration
//! order. Plans are built once per type by [`Plannable::build_plan`] and
//! shared from the owning [`Encoding`](crate::Encoding)'s cache afterwards.

mod builder;
mod cache;
mod impls;

use core::any::{Any, type_name};
use std::{io::Read, sync::Arc};

use snafu::{OptionExt, ResultExt};

use crate::{
    ByteOrder, Primitive, Result,
    error::{IoSnafu, PlanMismatchSnafu},
    marshal::{CustomLeaf, Marshal},
};

pub use builder::{CompositeBuilder, PlanBuilder};
pub(crate) use builder::Access;
pub(crate) use cache::{PlanCache, build_root};

/// A type whose byte layout can be planned.
///
/// Usually derived with `#[derive(Plannable)]`. A hand-written impl builds
/// the same thing:
///
/// ```
/// use fixbuf::{PlanBuilder, PlanNode, Plannable, Result};
///
/// struct Sample {
///     channel: u8,
///     level: i16,
/// }
///
/// impl Plannable for Sample {
///     fn build_plan(builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
///         let mut fields = builder.composite::<Self>();
///         fields.field::<u8>("channel", |v| &v.channel, |v| &mut v.channel)?;
///         fields.field::<i16>("level", |v| &v.level, |v| &mut v.level)?;
///         Ok(fields.finish())
///     }
/// }
/// ```
pub trait Plannable: Any {
    /// Describe this type's layout.
    ///
    /// Fails with [`Error::UnsupportedType`](crate::Error::UnsupportedType)
    /// when the type, or any field, has no fixed width.
    fn build_plan(builder: &mut PlanBuilder<'_>) -> Result<PlanNode>;
}

/// One node of a layout plan.
#[derive(Debug)]
pub enum PlanNode {
    /// Fixed-width value encoded in the configured byte order.
    Primitive(PrimitiveLeaf),
    /// Value that owns its encoding through [`Marshal`].
    Custom(CustomLeaf),
    /// Record whose fields are encoded one after another.
    Composite(Composite),
}

impl PlanNode {
    /// Primitive leaf for `T`.
    pub fn primitive<T: Primitive>() -> Self {
        PlanNode::Primitive(PrimitiveLeaf::of::<T>())
    }

    /// Custom leaf for `T`.
    pub fn custom<T: Marshal>() -> Self {
        PlanNode::Custom(CustomLeaf::of::<T>())
    }

    /// Composite with no fields; encodes to zero bytes.
    pub fn empty<T: Any>() -> Self {
        PlanNode::Composite(Composite {
            type_name: type_name::<T>(),
            fields: Vec::new(),
        })
    }

    /// Name of the planned type.
    pub fn type_name(&self) -> &'static str {
        match self {
            PlanNode::Primitive(leaf) => leaf.type_name,
            PlanNode::Custom(leaf) => leaf.type_name(),
            PlanNode::Composite(composite) => composite.type_name,
        }
    }

    /// Encoded size, when every leaf declares one.
    ///
    /// Custom leaves without a declared [`Marshal::WIDTH`] make this `None`.
    pub fn width(&self) -> Option<usize> {
        match self {
            PlanNode::Primitive(leaf) => Some(leaf.width),
            PlanNode::Custom(leaf) => leaf.width(),
            PlanNode::Composite(composite) => composite
                .fields
                .iter()
                .try_fold(0usize, |total, field| Some(total + field.plan.width()?)),
        }
    }

    /// Number of leaves reached by a depth-first walk.
    pub fn leaf_count(&self) -> usize {
        match self {
            PlanNode::Primitive(_) | PlanNode::Custom(_) => 1,
            PlanNode::Composite(composite) => composite
                .fields
                .iter()
                .map(|field| field.plan.leaf_count())
                .sum(),
        }
    }

    /// Append the encoding of `value` to `out`.
    pub(crate) fn encode(&self, value: &dyn Any, order: ByteOrder, out: &mut Vec<u8>) -> Result<()> {
        match self {
            PlanNode::Primitive(leaf) => {
                let start = out.len();
                out.resize(start + leaf.width, 0);
                (leaf.encode)(value, order, &mut out[start..])
            }
            PlanNode::Custom(leaf) => {
                leaf.marshal(value, out)?;
                Ok(())
            }
            PlanNode::Composite(composite) => {
                for field in &composite.fields {
                    let child = field.access.get(value).context(PlanMismatchSnafu {
                        type_name: composite.type_name,
                    })?;
                    field.plan.encode(child, order, out)?;
                }
                Ok(())
            }
        }
    }

    /// Decode from `source` into `dest` in place.
    ///
    /// `scratch` is reused across primitive leaves. Fields decoded before a
    /// failure stay decoded.
    pub(crate) fn decode(
        &self,
        dest: &mut dyn Any,
        order: ByteOrder,
        source: &mut dyn Read,
        scratch: &mut Vec<u8>,
    ) -> Result<()> {
        match self {
            PlanNode::Primitive(leaf) => {
                scratch.resize(leaf.width, 0);
                source.read_exact(&mut scratch[..]).context(IoSnafu)?;
                (leaf.decode)(dest, order, &scratch[..])
            }
            PlanNode::Custom(leaf) => {
                leaf.unmarshal(dest, source)?;
                Ok(())
            }
            PlanNode::Composite(composite) => {
                for field in &composite.fields {
                    let child = field
                        .access
                        .get_mut(&mut *dest)
                        .context(PlanMismatchSnafu {
                            type_name: composite.type_name,
                        })?;
                    field.plan.decode(child, order, source, scratch)?;
                }
                Ok(())
            }
        }
    }
}

type EncodeFn = fn(&dyn Any, ByteOrder, &mut [u8]) -> Result<()>;
type DecodeFn = fn(&mut dyn Any, ByteOrder, &[u8]) -> Result<()>;

/// Plan leaf for a [`Primitive`] value.
pub struct PrimitiveLeaf {
    type_name: &'static str,
    width: usize,
    encode: EncodeFn,
    decode: DecodeFn,
}

impl PrimitiveLeaf {
    /// Leaf for `T`.
    pub fn of<T: Primitive>() -> Self {
        Self {
            type_name: type_name::<T>(),
            width: T::WIDTH,
            encode: encode_primitive::<T>,
            decode: decode_primitive::<T>,
        }
    }

    /// Name of the primitive type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Encoded size in bytes.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl core::fmt::Debug for PrimitiveLeaf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrimitiveLeaf")
            .field("type_name", &self.type_name)
            .field("width", &self.width)
            .finish()
    }
}

fn encode_primitive<T: Primitive>(value: &dyn Any, order: ByteOrder, out: &mut [u8]) -> Result<()> {
    let value = value.downcast_ref::<T>().context(PlanMismatchSnafu {
        type_name: type_name::<T>(),
    })?;
    T::encode(*value, order, out);
    Ok(())
}

fn decode_primitive<T: Primitive>(dest: &mut dyn Any, order: ByteOrder, bytes: &[u8]) -> Result<()> {
    let dest = dest.downcast_mut::<T>().context(PlanMismatchSnafu {
        type_name: type_name::<T>(),
    })?;
    *dest = T::decode(order, bytes);
    Ok(())
}

/// Plan for a record: one sub-plan per stored field, in declaration order.
#[derive(Debug)]
pub struct Composite {
    type_name: &'static str,
    fields: Vec<Field>,
}

impl Composite {
    /// Name of the record type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Stored fields, in wire order.
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// One stored field of a [`Composite`].
pub struct Field {
    name: &'static str,
    plan: Arc<PlanNode>,
    access: Box<dyn Access>,
}

impl Field {
    /// Field name; tuple fields use their index.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field type's plan, shared with every other use of that type.
    #[inline]
    pub fn plan(&self) -> &Arc<PlanNode> {
        &self.plan
    }
}

impl core::fmt::Debug for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("plan", &self.plan)
            .finish()
    }
}
