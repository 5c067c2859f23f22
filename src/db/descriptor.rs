//! Pool descriptor lifecycle.
//!
//! A descriptor owns one registration (name, DSN, tunables) and at most one
//! live handle. It can be connected any number of times; each connect
//! supersedes the previous handle without closing it.

use crate::config::PoolDefaults;
use crate::db::engine::{DataEngine, EngineHandle};
use crate::error::{DbError, DbResult};
use crate::models::{DescriptorConfig, PoolSummary};
use tracing::{debug, info};

#[derive(Debug)]
pub struct PoolDescriptor<H> {
    config: DescriptorConfig,
    handle: Option<H>,
}

impl<H: EngineHandle> PoolDescriptor<H> {
    /// Create an unconnected descriptor.
    pub fn new(config: DescriptorConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &DescriptorConfig {
        &self.config
    }

    /// The live handle, if connected and not closed.
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Build a fresh handle from the stored configuration.
    ///
    /// Any failure is reported as [`DbError::Connection`]. On failure the
    /// previous handle, if any, is left in place.
    pub async fn connect<E>(&mut self, engine: &E, defaults: &PoolDefaults) -> DbResult<H>
    where
        E: DataEngine<Handle = H>,
    {
        let settings = self.config.resolve(defaults);
        debug!(
            pool = %settings.name,
            dsn = %settings.masked_dsn(),
            naming = %settings.naming_strategy,
            max_open = settings.max_open_conns,
            max_idle = settings.max_idle_conns,
            lifetime_secs = settings.conn_max_lifetime.as_secs(),
            "Connecting pool"
        );

        let handle = engine
            .connect(&settings)
            .await
            .map_err(DbError::into_connection)?;
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    /// Liveness probe. A descriptor without a handle fails the probe.
    pub async fn probe(&self) -> DbResult<()> {
        match &self.handle {
            Some(handle) => handle.ping().await,
            None => Err(DbError::connection(
                format!("Pool '{}' is not connected", self.config.name),
                "Reconnect the pool",
            )),
        }
    }

    /// Tear down the handle. Closing an unconnected descriptor is a no-op.
    ///
    /// The handle is dropped only when the engine reports a clean close.
    pub async fn close(&mut self) -> DbResult<()> {
        let Some(handle) = &self.handle else {
            return Ok(());
        };
        handle.close().await.map_err(|e| match e {
            err @ DbError::Close { .. } => err,
            other => DbError::close(&self.config.name, other.to_string()),
        })?;
        self.handle = None;
        info!(pool = %self.config.name, "Pool closed");
        Ok(())
    }

    /// Secret-free description of this descriptor.
    pub fn summary(&self) -> PoolSummary {
        PoolSummary {
            name: self.config.name.clone(),
            masked_dsn: self.config.masked_dsn(),
            prefix: self.config.options.prefix.clone(),
            naming_strategy: self.config.options.naming_strategy,
            debug: self.config.options.debug,
            connected: self.is_connected(),
        }
    }
}
