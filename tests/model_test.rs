//! Model base behavior against a recording query builder.
//!
//! Tests verify that:
//! - Remembered ordering is applied before a read and forgotten afterwards
//! - Pagination clamps its inputs and skips the row query for empty results

use async_trait::async_trait;
use db_registry::error::{DbError, DbResult};
use db_registry::models::QueryParam;
use db_registry::orm::{Model, Page, QueryBuilder};

#[derive(Debug, Clone, PartialEq)]
struct Post {
    id: i64,
}

/// Records every builder call; terminal calls return canned data.
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    order: Vec<String>,
    total: u64,
    fail_find: bool,
}

impl Recorder {
    fn with_total(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }
}

#[async_trait]
impl QueryBuilder for Recorder {
    type Record = Post;

    fn table(&mut self, name: &str) {
        self.calls.push(format!("table {name}"));
    }

    fn where_clause(&mut self, query: &str, args: Vec<QueryParam>) {
        self.calls.push(format!("where {query} ({})", args.len()));
    }

    fn and(&mut self, query: &str, _args: Vec<QueryParam>) {
        self.calls.push(format!("and {query}"));
    }

    fn or(&mut self, query: &str, _args: Vec<QueryParam>) {
        self.calls.push(format!("or {query}"));
    }

    fn sql(&mut self, query: &str, _args: Vec<QueryParam>) {
        self.calls.push(format!("sql {query}"));
    }

    fn cols(&mut self, columns: &[&str]) {
        self.calls.push(format!("cols {}", columns.join(",")));
    }

    fn all_cols(&mut self) {
        self.calls.push("all_cols".to_string());
    }

    fn asc(&mut self, columns: &[&str]) {
        self.order
            .extend(columns.iter().map(|c| format!("{c} ASC")));
    }

    fn desc(&mut self, columns: &[&str]) {
        self.order
            .extend(columns.iter().map(|c| format!("{c} DESC")));
    }

    fn order_by(&mut self, order: &str) {
        self.calls.push(format!("order_by {order}"));
        self.order = vec![order.to_string()];
    }

    fn current_order_by(&self) -> String {
        self.order.join(", ")
    }

    fn group_by(&mut self, keys: &str) {
        self.calls.push(format!("group_by {keys}"));
    }

    fn distinct(&mut self, columns: &[&str]) {
        self.calls.push(format!("distinct {}", columns.join(",")));
    }

    fn having(&mut self, conditions: &str) {
        self.calls.push(format!("having {conditions}"));
    }

    fn in_values(&mut self, column: &str, args: Vec<QueryParam>) {
        self.calls.push(format!("in {column} ({})", args.len()));
    }

    fn not_in(&mut self, column: &str, args: Vec<QueryParam>) {
        self.calls.push(format!("not_in {column} ({})", args.len()));
    }

    fn limit(&mut self, limit: u64, start: u64) {
        self.calls.push(format!("limit {limit} {start}"));
    }

    fn id(&mut self, id: QueryParam) {
        self.calls.push(format!("id {}", id.type_name()));
    }

    fn last_sql(&self) -> (String, Vec<QueryParam>) {
        (self.calls.join("; "), Vec::new())
    }

    async fn count(&mut self) -> DbResult<u64> {
        self.calls.push("count".to_string());
        Ok(self.total)
    }

    async fn exist(&mut self) -> DbResult<bool> {
        self.calls.push("exist".to_string());
        Ok(self.total > 0)
    }

    async fn get(&mut self) -> DbResult<Option<Post>> {
        self.calls.push("get".to_string());
        Ok(Some(Post { id: 1 }))
    }

    async fn find(&mut self) -> DbResult<Vec<Post>> {
        self.calls.push("find".to_string());
        if self.fail_find {
            return Err(DbError::internal("find failed"));
        }
        Ok(vec![Post { id: 1 }, Post { id: 2 }])
    }

    async fn find_and_count(&mut self) -> DbResult<(Vec<Post>, u64)> {
        self.calls.push("find_and_count".to_string());
        Ok((vec![Post { id: 1 }], self.total))
    }

    async fn insert(&mut self, record: &Post) -> DbResult<u64> {
        self.calls.push(format!("insert {}", record.id));
        Ok(1)
    }

    async fn update(&mut self, record: &Post) -> DbResult<u64> {
        self.calls.push(format!("update {}", record.id));
        Ok(1)
    }

    async fn delete(&mut self, record: &Post) -> DbResult<u64> {
        self.calls.push(format!("delete {}", record.id));
        Ok(1)
    }
}

#[tokio::test]
async fn test_fluent_calls_delegate_in_order() {
    let mut model = Model::for_table(Recorder::default(), "posts");
    model
        .where_clause("status = ?", vec!["live".into()])
        .and("author_id = ?", vec![7.into()])
        .cols(&["id", "title"])
        .in_values("tag", vec!["a".into(), "b".into()])
        .filter_id(9i64);

    assert_eq!(
        model.query().calls,
        vec![
            "table posts",
            "where status = ? (1)",
            "and author_id = ?",
            "cols id,title",
            "in tag (2)",
            "id int",
        ]
    );
}

#[tokio::test]
async fn test_remembered_order_applied_then_cleared() {
    let mut model = Model::new(Recorder::default());
    model.desc(&["created_at"]).asc(&["id"]);
    assert_eq!(model.remembered_order(), Some("created_at DESC, id ASC"));

    let posts = model.find_all().await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(
        model.query().calls,
        vec!["order_by created_at DESC, id ASC", "find"]
    );
    assert_eq!(model.remembered_order(), None);

    // A second read does not re-apply the old ordering
    model.find_one().await.unwrap();
    assert_eq!(model.query().calls.last().map(String::as_str), Some("get"));
    assert_eq!(model.query().calls.len(), 3);
}

#[tokio::test]
async fn test_remembered_order_cleared_on_failure() {
    let mut recorder = Recorder::with_total(5);
    recorder.fail_find = true;
    let mut model = Model::new(recorder);
    model.order_by("id DESC");

    assert!(model.find_all().await.is_err());
    assert_eq!(model.remembered_order(), None);
}

#[tokio::test]
async fn test_paginate_empty_runs_no_row_query() {
    let mut model = Model::new(Recorder::with_total(0));
    model.order_by("id");

    let (page, posts) = model.paginate(2, 10).await.unwrap();
    assert_eq!(page, Page::default());
    assert!(posts.is_empty());
    assert_eq!(model.query().calls, vec!["order_by id", "count"]);
    assert_eq!(model.remembered_order(), None);
}

#[tokio::test]
async fn test_paginate_clamps_and_limits() {
    let mut model = Model::new(Recorder::with_total(10));
    model.desc(&["id"]);

    let (page, posts) = model.paginate(0, 3).await.unwrap();
    assert_eq!(
        page,
        Page {
            current_page: 1,
            page_size: 3,
            total_records: 10,
            total_pages: 4,
        }
    );
    assert_eq!(posts.len(), 2);
    assert_eq!(
        model.query().calls,
        vec!["count", "limit 3 0", "order_by id DESC", "find"]
    );
}

#[tokio::test]
async fn test_paginate_applies_limit_within_single_page() {
    let mut model = Model::new(Recorder::with_total(2));

    let (page, _) = model.paginate(1, 50).await.unwrap();
    assert_eq!(page.total_pages, 1);
    assert_eq!(model.query().calls, vec!["count", "limit 50 0", "find"]);
}

#[tokio::test]
async fn test_writes_and_counts_delegate() {
    let mut model = Model::new(Recorder::with_total(3));
    let post = Post { id: 4 };

    assert_eq!(model.save(&post).await.unwrap(), 1);
    assert_eq!(model.update(&post).await.unwrap(), 1);
    assert_eq!(model.delete(&post).await.unwrap(), 1);
    assert_eq!(model.count().await.unwrap(), 3);
    assert!(model.exist().await.unwrap());

    let (rows, total) = model.find_and_count().await.unwrap();
    assert_eq!((rows.len(), total), (1, 3));
    assert_eq!(
        model.query().calls,
        vec!["insert 4", "update 4", "delete 4", "count", "exist", "find_and_count"]
    );
}
