//! Database layer.
//!
//! - Engine capability traits and the sqlx-backed engine
//! - Pool descriptors and the named pool registry
//! - Sessions running raw SQL through the processor pipeline
//! - Row decoding and parameter binding per database

pub mod descriptor;
pub mod engine;
#[macro_use]
pub mod macros;
pub mod params;
pub mod pool;
pub mod registry;
pub mod session;
pub mod types;

pub use descriptor::PoolDescriptor;
pub use engine::{DataEngine, EngineHandle};
pub use pool::{DbPool, SqlxEngine, SqlxHandle};
pub use registry::{ALL_POOLS, DEFAULT_POOL, Registry};
pub use session::Session;
