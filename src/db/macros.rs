//! Database dispatch macros for reducing code duplication.
//!
//! The macros expand at compile time into plain `match` statements over
//! [`DbPool`](crate::db::pool::DbPool) variants.

/// Macro for generating database dispatch match arms.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(pool, {
///     MySql(p) => p.close().await,
///     Postgres(p) => p.close().await,
///     SQLite(p) => p.close().await,
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($pool:expr, { $($variant:ident($p:ident) => $body:expr),+ $(,)? }) => {
        match $pool {
            $(
                $crate::db::pool::DbPool::$variant($p) => $body,
            )+
        }
    };
}

pub use impl_db_dispatch;
