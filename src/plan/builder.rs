//! Recursive plan construction.

use core::{
    any::{Any, TypeId, type_name},
    marker::PhantomData,
};
use std::sync::Arc;

use hashbrown::HashMap;

use super::{Composite, Field, PlanNode, Plannable};
use crate::{Result, error::UnsupportedTypeSnafu};

/// Builds plans for a type and, recursively, for its field types.
///
/// Sub-plans already published in the cache are reused; sub-plans built
/// during this pass are collected and published together once the root
/// plan is complete, so no caller ever sees a partial plan.
pub struct PlanBuilder<'a> {
    published: &'a HashMap<TypeId, Arc<PlanNode>>,
    built: HashMap<TypeId, Arc<PlanNode>>,
    in_progress: Vec<TypeId>,
}

impl<'a> PlanBuilder<'a> {
    pub(crate) fn new(published: &'a HashMap<TypeId, Arc<PlanNode>>) -> Self {
        Self {
            published,
            built: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Plan for `T`, shared with every other field of the same type.
    pub fn plan_for<T: Plannable>(&mut self) -> Result<Arc<PlanNode>> {
        let id = TypeId::of::<T>();
        if let Some(plan) = self.published.get(&id).or_else(|| self.built.get(&id)) {
            return Ok(Arc::clone(plan));
        }
        if self.in_progress.contains(&id) {
            return UnsupportedTypeSnafu {
                type_name: type_name::<T>(),
                reason: "type contains itself",
            }
            .fail();
        }

        self.in_progress.push(id);
        let node = T::build_plan(self);
        self.in_progress.pop();

        let plan = Arc::new(node?);
        self.built.insert(id, Arc::clone(&plan));
        Ok(plan)
    }

    /// Start the composite plan for record type `S`.
    pub fn composite<S: Any>(&mut self) -> CompositeBuilder<'_, 'a, S> {
        CompositeBuilder {
            builder: self,
            fields: Vec::new(),
            _record: PhantomData,
        }
    }

    pub(crate) fn into_built(self) -> HashMap<TypeId, Arc<PlanNode>> {
        self.built
    }
}

/// Collects the fields of one record, in declaration order.
pub struct CompositeBuilder<'b, 'a, S> {
    builder: &'b mut PlanBuilder<'a>,
    fields: Vec<Field>,
    _record: PhantomData<fn() -> S>,
}

impl<S: Any> CompositeBuilder<'_, '_, S> {
    /// Append a stored field of type `F`.
    ///
    /// `get` and `get_mut` project the record onto the field; `get_mut` is
    /// what decoding writes through, so it must return the field itself.
    pub fn field<F: Plannable>(
        &mut self,
        name: &'static str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Result<()> {
        let plan = self.builder.plan_for::<F>()?;
        self.fields.push(Field {
            name,
            plan,
            access: Box::new(Projection { get, get_mut }),
        });
        Ok(())
    }

    /// Finish the record's plan.
    pub fn finish(self) -> PlanNode {
        PlanNode::Composite(Composite {
            type_name: type_name::<S>(),
            fields: self.fields,
        })
    }
}

/// Type-erased projection from a record onto one of its fields.
pub(crate) trait Access: Send + Sync {
    fn get<'v>(&self, record: &'v dyn Any) -> Option<&'v dyn Any>;
    fn get_mut<'v>(&self, record: &'v mut dyn Any) -> Option<&'v mut dyn Any>;
}

struct Projection<S, F> {
    get: fn(&S) -> &F,
    get_mut: fn(&mut S) -> &mut F,
}

impl<S: Any, F: Any> Access for Projection<S, F> {
    #[inline]
    fn get<'v>(&self, record: &'v dyn Any) -> Option<&'v dyn Any> {
        let record = record.downcast_ref::<S>()?;
        Some((self.get)(record) as &dyn Any)
    }

    #[inline]
    fn get_mut<'v>(&self, record: &'v mut dyn Any) -> Option<&'v mut dyn Any> {
        let record = record.downcast_mut::<S>()?;
        Some((self.get_mut)(record) as &mut dyn Any)
    }
}
