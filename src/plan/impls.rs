//! `Plannable` for std types.

use core::{any::type_name, marker::PhantomData};
use std::{rc::Rc, sync::Arc};

use super::{PlanBuilder, PlanNode, Plannable};
use crate::{Primitive, Result, error::UnsupportedTypeSnafu};

macro_rules! impl_plannable_for_primitive {
    ($($ty:ty),+) => {
        $(
            impl Plannable for $ty {
                #[inline]
                fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
                    Ok(PlanNode::primitive::<Self>())
                }
            }
        )+
    };
}

impl_plannable_for_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, f32, f64, bool);

impl<T: Primitive, const N: usize> Plannable for [T; N] {
    #[inline]
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::primitive::<Self>())
    }
}

// Types that hold no data encode to nothing.

impl Plannable for () {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::empty::<Self>())
    }
}

impl<T: ?Sized + 'static> Plannable for PhantomData<T> {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::empty::<Self>())
    }
}

// Types with no fixed-width layout. They are plannable only so that a record
// containing one fails at plan-build time with a useful message.

fn unsupported<T: ?Sized>(reason: &'static str) -> Result<PlanNode> {
    UnsupportedTypeSnafu {
        type_name: type_name::<T>(),
        reason,
    }
    .fail()
}

macro_rules! impl_plannable_unsupported {
    ($($ty:ty => $reason:literal),+ $(,)?) => {
        $(
            impl Plannable for $ty {
                fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
                    unsupported::<Self>($reason)
                }
            }
        )+
    };
}

impl_plannable_unsupported!(
    usize => "width depends on the target platform; use u32 or u64",
    isize => "width depends on the target platform; use i32 or i64",
    char => "no fixed-width encoding is defined; use u32",
    String => "variable-length strings have no fixed width",
);

impl<T: 'static> Plannable for Vec<T> {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        unsupported::<Self>("unbounded sequences have no fixed width")
    }
}

impl<T: 'static> Plannable for Option<T> {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        unsupported::<Self>("optional values have no fixed layout")
    }
}

impl<T: ?Sized + 'static> Plannable for Box<T> {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        unsupported::<Self>("pointer fields need a Marshal impl")
    }
}

impl<T: ?Sized + 'static> Plannable for Rc<T> {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        unsupported::<Self>("pointer fields need a Marshal impl")
    }
}

impl<T: ?Sized + 'static> Plannable for Arc<T> {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        unsupported::<Self>("pointer fields need a Marshal impl")
    }
}

impl<T: ?Sized + 'static> Plannable for &'static T {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        unsupported::<Self>("reference fields need a Marshal impl")
    }
}
