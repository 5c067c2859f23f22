//! Named database pool registry with lifecycle hook processing.
//!
//! Applications register any number of pools (MySQL, PostgreSQL, SQLite)
//! under string names, look them up with a liveness probe and lazy
//! reconnect, and run record-level before/after hooks around loads and
//! writes through a [`Session`](db::Session).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod orm;
pub mod processors;

pub use config::{Config, PoolDefaults};
pub use db::{ALL_POOLS, DEFAULT_POOL, Registry, Session, SqlxEngine, SqlxHandle};
pub use error::{DbError, DbResult};
pub use models::{NamingStrategy, RegisterOptions};
