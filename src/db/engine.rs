//! Data engine capability consumed by the registry.
//!
//! The registry never talks to a driver directly. It asks a [`DataEngine`] to
//! build a handle from resolved [`ConnectSettings`] and then only probes and
//! closes that handle. [`SqlxEngine`](super::pool::SqlxEngine) is the
//! production implementation.

use crate::error::DbResult;
use crate::models::ConnectSettings;
use async_trait::async_trait;

/// Builds live handles for pool descriptors.
#[async_trait]
pub trait DataEngine: Send + Sync + 'static {
    type Handle: EngineHandle;

    /// Establish a handle, applying naming strategy, lifetime, idle/open
    /// limits and verbosity from `settings`.
    async fn connect(&self, settings: &ConnectSettings) -> DbResult<Self::Handle>;
}

/// An open, usable connection pool.
///
/// Clones share the same underlying pool.
#[async_trait]
pub trait EngineHandle: Clone + Send + Sync + 'static {
    /// Lightweight round-trip confirming the handle is still usable.
    async fn ping(&self) -> DbResult<()>;

    /// Tear down the underlying pool.
    async fn close(&self) -> DbResult<()>;
}
