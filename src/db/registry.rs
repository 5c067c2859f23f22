//! Named pool registry.
//!
//! Maps pool names to [`PoolDescriptor`]s behind a single exclusive lock.
//!
//! # Concurrency
//!
//! Register (insert), lookup (probe and possible reconnect) and close are each
//! atomic with respect to the lock. The lock is held across the liveness
//! probe and any reconnect I/O in [`Registry::using`], so lookups for
//! different names are serialized too. Connecting during [`Registry::register`]
//! happens before the lock is taken; only the map update is locked.

use crate::config::PoolDefaults;
use crate::db::descriptor::PoolDescriptor;
use crate::db::engine::DataEngine;
use crate::db::pool::SqlxEngine;
use crate::error::{DbError, DbResult};
use crate::models::{DescriptorConfig, PoolSummary, RegisterOptions};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Pool name used when none is given.
pub const DEFAULT_POOL: &str = "default";

/// Close directive selecting every registered pool.
pub const ALL_POOLS: &str = "__all__";

type PoolMap<H> = HashMap<String, PoolDescriptor<H>>;

/// Registry of named database pools.
///
/// Clones share the same map.
pub struct Registry<E: DataEngine = SqlxEngine> {
    engine: Arc<E>,
    defaults: PoolDefaults,
    pools: Arc<Mutex<PoolMap<E::Handle>>>,
}

impl<E: DataEngine> Clone for Registry<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            defaults: self.defaults,
            pools: Arc::clone(&self.pools),
        }
    }
}

impl<E: DataEngine> std::fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Registry<SqlxEngine> {
    /// Registry backed by sqlx with the built-in pool defaults.
    pub fn sqlx() -> Self {
        Self::new(SqlxEngine)
    }
}

impl Default for Registry<SqlxEngine> {
    fn default() -> Self {
        Self::sqlx()
    }
}

impl<E: DataEngine> Registry<E> {
    /// Create an empty registry using the built-in pool defaults.
    pub fn new(engine: E) -> Self {
        Self::with_defaults(engine, PoolDefaults::default())
    }

    /// Create an empty registry with custom process-wide defaults.
    pub fn with_defaults(engine: E, defaults: PoolDefaults) -> Self {
        Self {
            engine: Arc::new(engine),
            defaults,
            pools: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn defaults(&self) -> &PoolDefaults {
        &self.defaults
    }

    /// Connect a pool and store it under `name`.
    ///
    /// An existing pool with the same name is replaced. The replaced handle is
    /// not closed.
    pub async fn register(
        &self,
        name: impl Into<String>,
        dsn: impl Into<String>,
        options: RegisterOptions,
    ) -> DbResult<()> {
        self.register_config(DescriptorConfig::new(name, dsn, options))
            .await
    }

    /// Connect a pool from a prepared configuration and store it.
    pub async fn register_config(&self, config: DescriptorConfig) -> DbResult<()> {
        if config.name.is_empty() {
            return Err(DbError::invalid_input("Pool name cannot be empty"));
        }

        info!(
            pool = %config.name,
            dsn = %config.masked_dsn(),
            "Registering pool"
        );

        let mut descriptor = PoolDescriptor::new(config);
        descriptor.connect(self.engine.as_ref(), &self.defaults).await?;

        let name = descriptor.name().to_string();
        let mut pools = self.pools.lock().await;
        if pools.insert(name.clone(), descriptor).is_some() {
            info!(pool = %name, "Replaced existing pool registration");
        }
        Ok(())
    }

    /// Resolve a pool name (default `"default"`) to a live handle.
    ///
    /// The stored handle is probed first. If the probe fails the descriptor
    /// is reconnected once from its stored configuration.
    pub async fn using(&self, name: Option<&str>) -> DbResult<E::Handle> {
        let name = name.unwrap_or(DEFAULT_POOL);
        let mut pools = self.pools.lock().await;
        let descriptor = pools
            .get_mut(name)
            .ok_or_else(|| DbError::not_registered(name))?;

        match descriptor.probe().await {
            Ok(()) => {
                debug!(pool = %name, "Pool is alive");
                descriptor
                    .handle()
                    .cloned()
                    .ok_or_else(|| DbError::internal(format!("Pool '{name}' lost its handle")))
            }
            Err(e) => {
                warn!(pool = %name, error = %e, "Liveness probe failed, reconnecting");
                let handle = descriptor.connect(self.engine.as_ref(), &self.defaults).await?;
                info!(pool = %name, "Pool reconnected");
                Ok(handle)
            }
        }
    }

    /// Close pools by name.
    ///
    /// - no names: closes `"default"`
    /// - `["__all__"]`: closes every registered pool
    /// - otherwise: closes each listed pool that exists; unknown names are skipped
    ///
    /// Stops at the first failure and returns it; pools after it stay open.
    /// Closed pools remain registered and are reconnected by the next
    /// [`using`](Self::using).
    pub async fn close(&self, names: &[&str]) -> DbResult<()> {
        let mut pools = self.pools.lock().await;

        let targets: Vec<String> = match names {
            [] => vec![DEFAULT_POOL.to_string()],
            [ALL_POOLS] => {
                let mut all: Vec<String> = pools.keys().cloned().collect();
                all.sort();
                all
            }
            _ => names.iter().map(|n| n.to_string()).collect(),
        };

        for name in &targets {
            match pools.get_mut(name) {
                Some(descriptor) => descriptor.close().await?,
                None => debug!(pool = %name, "Skipping close of unregistered pool"),
            }
        }
        Ok(())
    }

    /// Names of all registered pools, sorted.
    pub async fn names(&self) -> Vec<String> {
        let pools = self.pools.lock().await;
        let mut names: Vec<String> = pools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a pool is registered under `name`.
    pub async fn contains(&self, name: &str) -> bool {
        self.pools.lock().await.contains_key(name)
    }

    /// Get the number of registered pools.
    pub async fn len(&self) -> usize {
        self.pools.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Describe a registered pool without exposing credentials.
    pub async fn describe(&self, name: &str) -> DbResult<PoolSummary> {
        let pools = self.pools.lock().await;
        pools
            .get(name)
            .map(PoolDescriptor::summary)
            .ok_or_else(|| DbError::not_registered(name))
    }
}
