//! Lifecycle hooks and the deferred processor pipeline.
//!
//! - [`hooks`]: the closed set of hook capabilities a record type declares
//! - [`queue`]: the FIFO queue of deferred after-actions, drained once
//! - [`pipeline`]: per-operation closure registration and queue building

pub mod hooks;
pub mod pipeline;
pub mod queue;

pub use hooks::{Capability, HookError, HookResult, Hooks, Operation, SessionContext};
pub use pipeline::{Pipeline, materialize};
pub use queue::{Closure, Deferred, DeferredAction, ProcessorQueue};
