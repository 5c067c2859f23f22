//! Model base with remembered ordering and pagination.

use crate::error::DbResult;
use crate::models::QueryParam;
use crate::orm::builder::QueryBuilder;
use crate::orm::pagination::Page;
use tracing::debug;

/// Wraps a query builder for one table.
///
/// Ordering set through [`asc`](Self::asc), [`desc`](Self::desc) or
/// [`order_by`](Self::order_by) is remembered and re-applied right before the
/// next read (`find_one`, `find_all`, `find_and_count`, `paginate`). Each of
/// those calls forgets it afterwards, even on failure.
#[derive(Debug)]
pub struct Model<Q> {
    query: Q,
    order_by: Option<String>,
}

impl<Q: QueryBuilder> Model<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            order_by: None,
        }
    }

    /// Bind the builder to `table` and wrap it.
    pub fn for_table(mut query: Q, table: &str) -> Self {
        query.table(table);
        Self::new(query)
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Q {
        &mut self.query
    }

    pub fn into_inner(self) -> Q {
        self.query
    }

    /// Ordering that the next read will apply, if any.
    pub fn remembered_order(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn where_clause(&mut self, query: &str, args: Vec<QueryParam>) -> &mut Self {
        self.query.where_clause(query, args);
        self
    }

    pub fn and(&mut self, query: &str, args: Vec<QueryParam>) -> &mut Self {
        self.query.and(query, args);
        self
    }

    pub fn or(&mut self, query: &str, args: Vec<QueryParam>) -> &mut Self {
        self.query.or(query, args);
        self
    }

    pub fn sql(&mut self, query: &str, args: Vec<QueryParam>) -> &mut Self {
        self.query.sql(query, args);
        self
    }

    pub fn cols(&mut self, columns: &[&str]) -> &mut Self {
        self.query.cols(columns);
        self
    }

    pub fn all_cols(&mut self) -> &mut Self {
        self.query.all_cols();
        self
    }

    pub fn asc(&mut self, columns: &[&str]) -> &mut Self {
        self.query.asc(columns);
        self.remember_order();
        self
    }

    pub fn desc(&mut self, columns: &[&str]) -> &mut Self {
        self.query.desc(columns);
        self.remember_order();
        self
    }

    pub fn order_by(&mut self, order: &str) -> &mut Self {
        self.query.order_by(order);
        self.remember_order();
        self
    }

    pub fn group_by(&mut self, keys: &str) -> &mut Self {
        self.query.group_by(keys);
        self
    }

    pub fn distinct(&mut self, columns: &[&str]) -> &mut Self {
        self.query.distinct(columns);
        self
    }

    pub fn having(&mut self, conditions: &str) -> &mut Self {
        self.query.having(conditions);
        self
    }

    pub fn in_values(&mut self, column: &str, args: Vec<QueryParam>) -> &mut Self {
        self.query.in_values(column, args);
        self
    }

    pub fn not_in(&mut self, column: &str, args: Vec<QueryParam>) -> &mut Self {
        self.query.not_in(column, args);
        self
    }

    pub fn limit(&mut self, limit: u64, start: u64) -> &mut Self {
        self.query.limit(limit, start);
        self
    }

    pub fn filter_id(&mut self, id: impl Into<QueryParam>) -> &mut Self {
        self.query.id(id.into());
        self
    }

    pub fn last_sql(&self) -> (String, Vec<QueryParam>) {
        self.query.last_sql()
    }

    pub async fn count(&mut self) -> DbResult<u64> {
        self.query.count().await
    }

    pub async fn exist(&mut self) -> DbResult<bool> {
        self.query.exist().await
    }

    pub async fn save(&mut self, record: &Q::Record) -> DbResult<u64> {
        self.query.insert(record).await
    }

    pub async fn update(&mut self, record: &Q::Record) -> DbResult<u64> {
        self.query.update(record).await
    }

    pub async fn delete(&mut self, record: &Q::Record) -> DbResult<u64> {
        self.query.delete(record).await
    }

    pub async fn find_one(&mut self) -> DbResult<Option<Q::Record>> {
        self.apply_order();
        self.query.get().await
    }

    pub async fn find_all(&mut self) -> DbResult<Vec<Q::Record>> {
        self.apply_order();
        self.query.find().await
    }

    pub async fn find_and_count(&mut self) -> DbResult<(Vec<Q::Record>, u64)> {
        self.apply_order();
        self.query.find_and_count().await
    }

    /// Count matching rows, then load one page of them.
    ///
    /// With no matching rows the page is all zeros and no row query runs.
    pub async fn paginate(
        &mut self,
        page: i64,
        page_size: i64,
    ) -> DbResult<(Page, Vec<Q::Record>)> {
        let order = self.order_by.take();
        let total = self.query.count().await?;
        let page = Page::compute(page, page_size, total);
        if page.is_empty() {
            return Ok((page, Vec::new()));
        }

        debug!(
            page = page.current_page,
            page_size = page.page_size,
            total_records = page.total_records,
            total_pages = page.total_pages,
            "Loading page"
        );
        self.query.limit(page.limit(), page.offset());
        if let Some(order) = order {
            self.query.order_by(&order);
        }
        let records = self.query.find().await?;
        Ok((page, records))
    }

    fn remember_order(&mut self) {
        let order = self.query.current_order_by();
        self.order_by = (!order.is_empty()).then_some(order);
    }

    fn apply_order(&mut self) {
        if let Some(order) = self.order_by.take() {
            self.query.order_by(&order);
        }
    }
}
