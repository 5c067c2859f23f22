//! Deferred after-operation actions.
//!
//! Entries own everything they need: an inline closure (shared, since the
//! same closure is queued once per affected record) or a capability tag, plus
//! the index of the record they apply to. Records are only borrowed while
//! the queue drains.

use crate::error::{DbError, DbResult};
use crate::processors::hooks::{Capability, HookResult, Hooks, SessionContext, invoke};
use std::sync::Arc;
use tracing::debug;

/// Inline side effect over an affected record.
pub type Closure<B> = Arc<dyn Fn(&mut B) -> HookResult + Send + Sync>;

/// What a queued entry runs.
pub enum DeferredAction<B> {
    /// Inline closure, tagged with its registration position.
    Closure { position: usize, closure: Closure<B> },
    /// A hook the record type declares.
    Hook(Capability),
}

impl<B> DeferredAction<B> {
    /// Name used when reporting a failure.
    pub fn label(&self) -> String {
        match self {
            Self::Closure { position, .. } => format!("after closure #{}", position + 1),
            Self::Hook(capability) => capability.name().to_string(),
        }
    }
}

impl<B> std::fmt::Debug for DeferredAction<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// One queued action bound to the record at `target`.
#[derive(Debug)]
pub struct Deferred<B> {
    pub target: usize,
    pub action: DeferredAction<B>,
}

/// Ordered queue of deferred actions for one unit of work.
#[derive(Debug)]
pub struct ProcessorQueue<B> {
    entries: Vec<Deferred<B>>,
}

impl<B> Default for ProcessorQueue<B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<B> ProcessorQueue<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued actions in execution order.
    pub fn entries(&self) -> &[Deferred<B>] {
        &self.entries
    }

    pub fn push_closure(&mut self, target: usize, position: usize, closure: Closure<B>) {
        self.entries.push(Deferred {
            target,
            action: DeferredAction::Closure { position, closure },
        });
    }

    pub fn push_hook(&mut self, target: usize, capability: Capability) {
        self.entries.push(Deferred {
            target,
            action: DeferredAction::Hook(capability),
        });
    }

    /// Drop every queued entry without running it.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<B: Hooks> ProcessorQueue<B> {
    /// Run every queued action in FIFO order, then leave the queue empty.
    ///
    /// Stops at the first failing action and returns it as [`DbError::Hook`];
    /// later actions do not run. The queue is emptied before anything runs,
    /// so a failed drain leaves nothing behind.
    pub fn drain(&mut self, records: &mut [B], session: &SessionContext) -> DbResult<()> {
        let entries = std::mem::take(&mut self.entries);
        if entries.is_empty() {
            return Ok(());
        }
        debug!(
            pool = %session.pool,
            operation = ?session.operation,
            count = entries.len(),
            "Draining processor queue"
        );

        let supplied = records.len();
        for Deferred { target, action } in entries {
            let record = records.get_mut(target).ok_or_else(|| {
                DbError::internal(format!(
                    "Queued {} targets record {} but only {} records were supplied",
                    action.label(),
                    target,
                    supplied
                ))
            })?;

            let result = match &action {
                DeferredAction::Closure { closure, .. } => closure(record),
                DeferredAction::Hook(capability) => invoke(*capability, record, session),
            };
            result.map_err(|e| DbError::hook(action.label(), e.message()))?;
        }
        Ok(())
    }
}
