//! Per-encoding plan table.

use core::any::TypeId;
use std::sync::Arc;

use arc_swap::ArcSwap;
use hashbrown::HashMap;
use log::debug;
use parking_lot::Mutex;

use super::{PlanBuilder, PlanNode};
use crate::Result;

type PlanTable = HashMap<TypeId, Arc<PlanNode>>;

/// Builds a root plan through a [`PlanBuilder`].
pub(crate) type BuildFn = fn(&mut PlanBuilder<'_>) -> Result<Arc<PlanNode>>;

/// Type-keyed plan table.
///
/// Lookups are a lock-free atomic load. A miss takes `build_lock`, builds
/// the missing plans against a snapshot of the table, and publishes a new
/// table containing them; the lock is never taken once a type is cached.
pub(crate) struct PlanCache {
    plans: ArcSwap<PlanTable>,
    build_lock: Mutex<()>,
}

impl PlanCache {
    pub(crate) fn new() -> Self {
        Self {
            plans: ArcSwap::from_pointee(HashMap::new()),
            build_lock: Mutex::new(()),
        }
    }

    /// Cached plan for `key`, building it with `build` on first use.
    pub(crate) fn get_or_build(&self, key: TypeId, build: BuildFn) -> Result<Arc<PlanNode>> {
        if let Some(plan) = self.plans.load().get(&key) {
            return Ok(Arc::clone(plan));
        }
        self.build(key, build)
    }

    #[cold]
    fn build(&self, key: TypeId, build: BuildFn) -> Result<Arc<PlanNode>> {
        let _guard = self.build_lock.lock();

        // Another caller may have published it while we waited.
        let published = self.plans.load_full();
        if let Some(plan) = published.get(&key) {
            return Ok(Arc::clone(plan));
        }

        let mut builder = PlanBuilder::new(&published);
        let plan = build(&mut builder)?;
        let fresh = builder.into_built();

        let mut next = PlanTable::clone(&published);
        for (id, node) in fresh {
            debug!(
                "built plan for `{}`: {} leaves, width {:?}",
                node.type_name(),
                node.leaf_count(),
                node.width()
            );
            next.insert(id, node);
        }
        self.plans.store(Arc::new(next));
        Ok(plan)
    }

    /// Number of cached plans, including sub-plans.
    pub(crate) fn len(&self) -> usize {
        self.plans.load().len()
    }
}

/// Root entry point handed to [`PlanCache::get_or_build`].
pub(crate) fn build_root<T: super::Plannable>(builder: &mut PlanBuilder<'_>) -> Result<Arc<PlanNode>> {
    builder.plan_for::<T>()
}
