//! Per-unit-of-work hook pipeline.
//!
//! A [`Pipeline`] collects inline closures registered through builder calls,
//! runs the before side immediately, and turns the after side into a
//! [`ProcessorQueue`] that is drained once the statement has completed.

use crate::error::{DbError, DbResult};
use crate::models::Row;
use crate::processors::hooks::{Capability, HookResult, Hooks, SessionContext, invoke};
use crate::processors::queue::{Closure, ProcessorQueue};
use std::sync::Arc;
use tracing::debug;

pub struct Pipeline<B> {
    before_closures: Vec<Closure<B>>,
    after_closures: Vec<Closure<B>>,
    queue: ProcessorQueue<B>,
}

impl<B> Default for Pipeline<B> {
    fn default() -> Self {
        Self {
            before_closures: Vec::new(),
            after_closures: Vec::new(),
            queue: ProcessorQueue::default(),
        }
    }
}

impl<B> std::fmt::Debug for Pipeline<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("before_closures", &self.before_closures.len())
            .field("after_closures", &self.after_closures.len())
            .field("queued", &self.queue.entries().len())
            .finish()
    }
}

impl<B: Hooks> Pipeline<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure to run on each record before the next write.
    pub fn before<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut B) -> HookResult + Send + Sync + 'static,
    {
        self.before_closures.push(Arc::new(f));
        self
    }

    /// Register a closure to run on each affected record after the next operation.
    pub fn after<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut B) -> HookResult + Send + Sync + 'static,
    {
        self.after_closures.push(Arc::new(f));
        self
    }

    pub fn pending_before(&self) -> usize {
        self.before_closures.len()
    }

    pub fn pending_after(&self) -> usize {
        self.after_closures.len()
    }

    pub fn queue(&self) -> &ProcessorQueue<B> {
        &self.queue
    }

    /// Run before closures, then the operation's declared before hook, on
    /// every record.
    ///
    /// The registered before closures are consumed whether or not a record
    /// fails, so each fires at most once.
    pub fn execute_before(&mut self, records: &mut [B], session: &SessionContext) -> DbResult<()> {
        let closures = std::mem::take(&mut self.before_closures);
        let hook = session.operation.before_hook().filter(|cap| B::has(*cap));

        for record in records.iter_mut() {
            for (position, closure) in closures.iter().enumerate() {
                closure(record).map_err(|e| {
                    DbError::hook(format!("before closure #{}", position + 1), e.message())
                })?;
            }
            if let Some(capability) = hook {
                invoke(capability, record, session)
                    .map_err(|e| DbError::hook(capability.name(), e.message()))?;
            }
        }
        Ok(())
    }

    /// Queue after closures and declared after hooks for `count` records.
    ///
    /// Per record: every after closure in registration order, then each hook
    /// the operation defines that the record type declares. The registered
    /// after closures are consumed.
    pub fn build_after(&mut self, count: usize, session: &SessionContext) {
        let closures = std::mem::take(&mut self.after_closures);
        let hooks: Vec<Capability> = session
            .operation
            .after_hooks()
            .iter()
            .copied()
            .filter(|cap| B::has(*cap))
            .collect();

        for target in 0..count {
            for (position, closure) in closures.iter().enumerate() {
                self.queue.push_closure(target, position, Arc::clone(closure));
            }
            for capability in &hooks {
                self.queue.push_hook(target, *capability);
            }
        }
        debug!(
            pool = %session.pool,
            operation = ?session.operation,
            records = count,
            queued = self.queue.len(),
            "Built after queue"
        );
    }

    /// Drain the queue built by [`build_after`](Self::build_after).
    pub fn drain(&mut self, records: &mut [B], session: &SessionContext) -> DbResult<()> {
        self.queue.drain(records, session)
    }

    /// Drop pending after closures and anything already queued.
    pub fn discard(&mut self) {
        self.after_closures.clear();
        self.queue.clear();
    }
}

/// Assign one scanned row to `record`, running `BeforeSet` on every cell
/// before `assign` and `AfterSet` on every cell after it.
pub fn materialize<B, F>(record: &mut B, mut row: Row, assign: F) -> DbResult<()>
where
    B: Hooks,
    F: FnOnce(&mut B, &Row) -> DbResult<()>,
{
    if B::has(Capability::BeforeSet) {
        for (field, cell) in row.iter_mut() {
            record
                .before_set(field, cell)
                .map_err(|e| DbError::hook(Capability::BeforeSet.name(), e.message()))?;
        }
    }

    assign(record, &row)?;

    if B::has(Capability::AfterSet) {
        for (field, cell) in row.iter_mut() {
            record
                .after_set(field, cell)
                .map_err(|e| DbError::hook(Capability::AfterSet.name(), e.message()))?;
        }
    }
    Ok(())
}
