//! Model convenience layer over a fluent query builder.
//!
//! The builder itself ([`QueryBuilder`]) belongs to whatever data-access
//! engine the application plugs in. [`Model`] wraps one and adds remembered
//! ordering plus page arithmetic ([`Page`]).

pub mod builder;
pub mod model;
pub mod pagination;

pub use builder::QueryBuilder;
pub use model::Model;
pub use pagination::Page;
