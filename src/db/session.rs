//! Unit of work over a live sqlx handle.
//!
//! A [`Session`] runs raw SQL against one pool and wraps every call in the
//! processor pipeline: before-closures and `Before*` hooks ahead of writes,
//! `BeforeSet`/`AfterSet` while rows are materialized, and the after queue
//! once the statement has completed.

use crate::db::pool::SqlxHandle;
use crate::error::{DbError, DbResult};
use crate::models::{QueryParam, Row};
use crate::processors::{HookResult, Hooks, Operation, Pipeline, SessionContext, materialize};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

#[derive(Debug)]
pub struct Session<B> {
    handle: SqlxHandle,
    pipeline: Pipeline<B>,
}

impl<B> Session<B>
where
    B: Hooks + Default + Serialize + DeserializeOwned,
{
    pub fn new(handle: SqlxHandle) -> Self {
        Self {
            handle,
            pipeline: Pipeline::default(),
        }
    }

    pub fn handle(&self) -> &SqlxHandle {
        &self.handle
    }

    /// What hooks see of this session for `operation`.
    pub fn context(&self, operation: Operation) -> SessionContext {
        SessionContext {
            pool: self.handle.name().to_string(),
            table_prefix: self.handle.prefix().to_string(),
            naming_strategy: self.handle.naming_strategy(),
            operation,
        }
    }

    /// Run `f` on the bean before the next insert, update or delete.
    pub fn before<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut B) -> HookResult + Send + Sync + 'static,
    {
        self.pipeline.before(f);
        self
    }

    /// Run `f` on every affected record after the next operation.
    pub fn after<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut B) -> HookResult + Send + Sync + 'static,
    {
        self.pipeline.after(f);
        self
    }

    /// Load every row returned by `sql` into a record.
    pub async fn find(&mut self, sql: &str, params: &[QueryParam]) -> DbResult<Vec<B>> {
        self.load(sql, params, false).await
    }

    /// Load the first row returned by `sql`, if any. Later rows are never fetched.
    pub async fn get(&mut self, sql: &str, params: &[QueryParam]) -> DbResult<Option<B>> {
        Ok(self.load(sql, params, true).await?.into_iter().next())
    }

    pub async fn insert<F>(&mut self, bean: &mut B, sql: &str, bind: F) -> DbResult<u64>
    where
        F: FnOnce(&B) -> Vec<QueryParam> + Send,
    {
        self.write(Operation::Insert, bean, sql, bind).await
    }

    pub async fn update<F>(&mut self, bean: &mut B, sql: &str, bind: F) -> DbResult<u64>
    where
        F: FnOnce(&B) -> Vec<QueryParam> + Send,
    {
        self.write(Operation::Update, bean, sql, bind).await
    }

    pub async fn delete<F>(&mut self, bean: &mut B, sql: &str, bind: F) -> DbResult<u64>
    where
        F: FnOnce(&B) -> Vec<QueryParam> + Send,
    {
        self.write(Operation::Delete, bean, sql, bind).await
    }

    async fn load(
        &mut self,
        sql: &str,
        params: &[QueryParam],
        first_only: bool,
    ) -> DbResult<Vec<B>> {
        let session = self.context(Operation::Load);
        let result = self.load_inner(sql, params, first_only, &session).await;
        if result.is_err() {
            self.pipeline.discard();
        }
        result
    }

    async fn load_inner(
        &mut self,
        sql: &str,
        params: &[QueryParam],
        first_only: bool,
        session: &SessionContext,
    ) -> DbResult<Vec<B>> {
        let rows: Vec<Row> = if first_only {
            self.handle
                .fetch_optional(sql, params)
                .await?
                .into_iter()
                .collect()
        } else {
            self.handle.fetch_rows(sql, params).await?
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = B::default();
            materialize(&mut record, row, assign_row)?;
            records.push(record);
        }

        self.pipeline.build_after(records.len(), session);
        self.pipeline.drain(&mut records, session)?;
        Ok(records)
    }

    async fn write<F>(
        &mut self,
        operation: Operation,
        bean: &mut B,
        sql: &str,
        bind: F,
    ) -> DbResult<u64>
    where
        F: FnOnce(&B) -> Vec<QueryParam> + Send,
    {
        let session = self.context(operation);
        let records = std::slice::from_mut(bean);

        if let Err(e) = self.pipeline.execute_before(records, &session) {
            self.pipeline.discard();
            return Err(e);
        }

        let params = bind(&records[0]);
        let affected = match self.handle.execute(sql, &params).await {
            Ok(affected) => affected,
            Err(e) => {
                self.pipeline.discard();
                return Err(e);
            }
        };

        self.pipeline.build_after(records.len(), &session);
        self.pipeline.drain(records, &session)?;
        Ok(affected)
    }
}

/// Overlay scanned cells onto the record's serialized fields.
///
/// Columns with no matching field are ignored by the record's deserializer
/// unless it denies unknown fields. Fields the record skips in serde are
/// reset to their defaults, so `BeforeSet` should rewrite cells rather than
/// record state.
fn assign_row<B: Serialize + DeserializeOwned>(record: &mut B, row: &Row) -> DbResult<()> {
    let JsonValue::Object(mut fields) = serde_json::to_value(&*record)? else {
        return Err(DbError::invalid_input(
            "Record type must serialize to a JSON object",
        ));
    };
    for (column, cell) in row {
        fields.insert(column.clone(), cell.clone());
    }
    *record = serde_json::from_value(JsonValue::Object(fields))?;
    Ok(())
}
