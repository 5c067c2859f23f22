//! Data models shared by the registry, sessions and configuration.

pub mod connection;
pub mod query;

pub use connection::{
    ConnectSettings, DatabaseType, DescriptorConfig, NamingStrategy, PoolSummary,
    RegisterOptions, Verbosity,
};
pub use query::{Cell, QueryParam, Row};
