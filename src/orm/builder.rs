//! Query builder interface consumed by [`Model`](crate::orm::Model).

use crate::error::DbResult;
use crate::models::QueryParam;
use async_trait::async_trait;

/// Fluent, session-scoped query builder.
///
/// Builder methods accumulate state on the session; terminal methods run
/// against it. Implementations decide whether terminal calls reset the
/// accumulated conditions.
#[async_trait]
pub trait QueryBuilder: Send {
    /// Record type loaded and persisted through this builder.
    type Record: Send + Sync;

    fn table(&mut self, name: &str);

    fn where_clause(&mut self, query: &str, args: Vec<QueryParam>);

    fn and(&mut self, query: &str, args: Vec<QueryParam>);

    fn or(&mut self, query: &str, args: Vec<QueryParam>);

    /// Replace the generated statement with raw SQL.
    fn sql(&mut self, query: &str, args: Vec<QueryParam>);

    fn cols(&mut self, columns: &[&str]);

    fn all_cols(&mut self);

    fn asc(&mut self, columns: &[&str]);

    fn desc(&mut self, columns: &[&str]);

    fn order_by(&mut self, order: &str);

    /// The ordering clause accumulated so far, empty if none.
    fn current_order_by(&self) -> String;

    fn group_by(&mut self, keys: &str);

    fn distinct(&mut self, columns: &[&str]);

    fn having(&mut self, conditions: &str);

    fn in_values(&mut self, column: &str, args: Vec<QueryParam>);

    fn not_in(&mut self, column: &str, args: Vec<QueryParam>);

    fn limit(&mut self, limit: u64, start: u64);

    /// Filter by primary key.
    fn id(&mut self, id: QueryParam);

    /// Last statement run and its arguments.
    fn last_sql(&self) -> (String, Vec<QueryParam>);

    async fn count(&mut self) -> DbResult<u64>;

    async fn exist(&mut self) -> DbResult<bool>;

    async fn get(&mut self) -> DbResult<Option<Self::Record>>;

    async fn find(&mut self) -> DbResult<Vec<Self::Record>>;

    async fn find_and_count(&mut self) -> DbResult<(Vec<Self::Record>, u64)>;

    async fn insert(&mut self, record: &Self::Record) -> DbResult<u64>;

    async fn update(&mut self, record: &Self::Record) -> DbResult<u64>;

    async fn delete(&mut self, record: &Self::Record) -> DbResult<u64>;
}
