//! Dataset-to-table synchronization.
//!
//! [`TableSync`] owns an executor and drives the whole cycle: infer a
//! schema from a dataset, create or reconcile the destination table,
//! then move the rows. Every statement goes through one boundary that
//! logs it, remembers it, and retries it once after a reconnect when
//! the connection was lost.

use tracing::{debug, info, warn};

use crate::builder::{
    AlterTable, CreateIndex, CreateTable, Delete, DropIndex, HasColumns, HasFrom, HasOn, Insert,
    LeftJoin, Limit, Select, SqlValue, Update, Upsert, WhereClause, inline_params,
};
use crate::dataset::{Dataset, Frame};
use crate::describe::{describe_statement, parse_describe_rows, parse_exists, table_exists_statement};
use crate::diff::diff;
use crate::error::{Result, SyncError};
use crate::executor::{QueryExecutor, QueryOutput};
use crate::record::RowRecord;
use crate::schema::TableSchema;

/// Default number of rows per multi-row INSERT.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Synchronizes datasets into tables through a [`QueryExecutor`].
pub struct TableSync<E: QueryExecutor> {
    executor: E,
    batch_size: usize,
    last_query: Option<String>,
    last_insert_id: Option<u64>,
}

impl<E: QueryExecutor> TableSync<E> {
    /// Wraps an executor.
    pub const fn new(executor: E) -> Self {
        Self {
            executor,
            batch_size: DEFAULT_BATCH_SIZE,
            last_query: None,
            last_insert_id: None,
        }
    }

    /// Sets the maximum number of rows per INSERT. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Returns the maximum number of rows per INSERT.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns the executor mutably.
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Consumes the sync handle and returns the executor.
    #[must_use]
    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Runs raw SQL with bound values through the retrying boundary.
    pub fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryOutput> {
        debug!(sql = %sql, params = params.len(), "Executing SQL");
        self.last_query = Some(inline_params(sql, params));

        let output = match self.executor.execute(sql, params) {
            Err(SyncError::ConnectionLost(reason)) => {
                warn!(reason = %reason, "Connection lost, reconnecting and retrying once");
                self.executor.reconnect()?;
                self.executor.execute(sql, params)?
            }
            other => other?,
        };

        if output.last_insert_id.is_some() {
            self.last_insert_id = output.last_insert_id;
        }
        Ok(output)
    }

    fn statement(&mut self, built: (String, Vec<SqlValue>)) -> Result<QueryOutput> {
        let (sql, params) = built;
        self.query(&sql, &params)
    }

    // ==================== Schema ====================

    /// Returns `true` if `table` exists in the current database.
    pub fn table_exists(&mut self, table: &str) -> Result<bool> {
        let output = self.statement(table_exists_statement(table))?;
        Ok(parse_exists(&output))
    }

    /// Describes the live columns of `table`.
    ///
    /// Fails with [`SyncError::SchemaNotFound`] when the table does not
    /// exist.
    pub fn describe(&mut self, table: &str) -> Result<TableSchema> {
        let output = self.query(&describe_statement(table), &[])?;
        parse_describe_rows(&output)
    }

    /// Creates `table` from the schema inferred from `dataset`.
    ///
    /// Returns `false` without issuing DDL when the table already exists.
    pub fn create_table(
        &mut self,
        table: &str,
        dataset: &dyn Dataset,
        key_field: Option<&str>,
    ) -> Result<bool> {
        if self.table_exists(table)? {
            info!(table = %table, "Table already exists, skipping create");
            return Ok(false);
        }

        let inferred = TableSchema::infer(dataset, key_field);
        let sql = CreateTable::new(table)
            .columns(&inferred)
            .key_field(key_field)
            .build()?;

        info!(table = %table, columns = inferred.len(), "Creating table");
        self.query(&sql, &[])?;
        Ok(true)
    }

    /// Adds missing columns and retypes mismatched ones so that `table`
    /// can hold `dataset`.
    ///
    /// Returns `false` when the table already matches and no ALTER was
    /// issued.
    pub fn sync_columns(
        &mut self,
        table: &str,
        dataset: &dyn Dataset,
        key_field: Option<&str>,
    ) -> Result<bool> {
        let inferred = TableSchema::infer(dataset, key_field);
        let live = self.describe(table)?;
        let changes = diff(&inferred, &live);

        let Some(sql) = AlterTable::new(table).diff(&changes, &inferred).build()? else {
            debug!(table = %table, "Columns already aligned");
            return Ok(false);
        };

        info!(
            table = %table,
            added = changes.missing.len(),
            changed = changes.mismatched.len(),
            "Altering table"
        );
        self.query(&sql, &[])?;
        Ok(true)
    }

    /// Returns the DDL a load of `dataset` into `table` would issue,
    /// without executing it.
    pub fn plan(
        &mut self,
        table: &str,
        dataset: &dyn Dataset,
        key_field: Option<&str>,
    ) -> Result<Option<String>> {
        let inferred = TableSchema::infer(dataset, key_field);
        if !self.table_exists(table)? {
            return CreateTable::new(table)
                .columns(&inferred)
                .key_field(key_field)
                .build()
                .map(Some);
        }
        let live = self.describe(table)?;
        AlterTable::new(table)
            .diff(&diff(&inferred, &live), &inferred)
            .build()
    }

    // ==================== Loading ====================

    /// Inserts every row of `dataset` in batches, optionally reconciling
    /// the columns first. Returns the number of rows affected.
    pub fn insert_dataset(
        &mut self,
        table: &str,
        dataset: &dyn Dataset,
        sync_columns_first: bool,
    ) -> Result<u64> {
        if sync_columns_first {
            self.sync_columns(table, dataset, None)?;
        }
        let records = dataset.records();
        self.insert_batch(table, &records)
    }

    /// Creates the table when it is absent, then inserts every row.
    pub fn create_or_insert(&mut self, table: &str, dataset: &dyn Dataset) -> Result<u64> {
        self.create_table(table, dataset, None)?;
        self.insert_dataset(table, dataset, false)
    }

    /// Creates the table keyed on `key_field` when it is absent,
    /// reconciles its columns, then upserts every row on that key.
    pub fn create_or_update(
        &mut self,
        table: &str,
        dataset: &dyn Dataset,
        key_field: &str,
    ) -> Result<u64> {
        self.create_table(table, dataset, Some(key_field))?;
        self.sync_columns(table, dataset, Some(key_field))?;

        let mut affected = 0;
        for record in dataset.records() {
            affected += self.upsert(table, &record, &[key_field])?;
        }
        Ok(affected)
    }

    // ==================== Rows ====================

    /// Inserts one record.
    pub fn insert(&mut self, table: &str, record: &RowRecord) -> Result<u64> {
        let output = self.statement(Insert::new().into_table(table).row(record).build()?)?;
        Ok(output.rows_affected)
    }

    /// Inserts records with multi-row INSERTs of at most `batch_size`
    /// rows each. An empty slice issues nothing.
    pub fn insert_batch(&mut self, table: &str, records: &[RowRecord]) -> Result<u64> {
        let mut affected = 0;
        for chunk in records.chunks(self.batch_size) {
            let built = Insert::new().into_table(table).rows(chunk).build()?;
            affected += self.statement(built)?.rows_affected;
        }
        Ok(affected)
    }

    /// Updates the rows matched by `where_clause` with `record`.
    pub fn update(
        &mut self,
        table: &str,
        record: &RowRecord,
        where_clause: WhereClause,
    ) -> Result<u64> {
        let built = Update::new()
            .table(table)
            .set_record(record)
            .where_clause(where_clause)
            .build()?;
        Ok(self.statement(built)?.rows_affected)
    }

    /// Inserts `record`, updating its non-key columns when `keys` collide.
    pub fn upsert(&mut self, table: &str, record: &RowRecord, keys: &[&str]) -> Result<u64> {
        let built = Upsert::new()
            .into_table(table)
            .row(record)
            .on_duplicate_key(keys)
            .build()?;
        Ok(self.statement(built)?.rows_affected)
    }

    /// Deletes the rows matched by `where_clause`, or every row.
    pub fn delete(&mut self, table: &str, where_clause: Option<WhereClause>) -> Result<u64> {
        let mut builder = Delete::new().from(table);
        if let Some(where_clause) = where_clause {
            builder = builder.where_clause(where_clause);
        }
        Ok(self.statement(builder.build()?)?.rows_affected)
    }

    // ==================== Reads ====================

    /// Runs a SELECT and returns every row.
    pub fn fetch_all(&mut self, select: Select<HasColumns, HasFrom>) -> Result<Vec<RowRecord>> {
        Ok(self.statement(select.build()?)?.records())
    }

    /// Runs a SELECT and returns its first row. Adds `LIMIT 0, 1` when
    /// the query has no limit of its own.
    pub fn fetch_one(&mut self, select: Select<HasColumns, HasFrom>) -> Result<Option<RowRecord>> {
        let select = if select.has_limit() {
            select
        } else {
            select.limit(Limit::with_offset(0, 1))
        };
        Ok(self.fetch_all(select)?.into_iter().next())
    }

    /// Runs a SELECT and returns the result as a [`Frame`].
    pub fn fetch_frame(&mut self, select: Select<HasColumns, HasFrom>) -> Result<Frame> {
        let output = self.statement(select.build()?)?;
        Ok(Frame::from_rows(&output.columns, output.rows))
    }

    /// Runs a LEFT JOIN and returns every row.
    pub fn left_join(&mut self, join: LeftJoin<HasOn>) -> Result<Vec<RowRecord>> {
        Ok(self.statement(join.build()?)?.records())
    }

    // ==================== Indexes ====================

    /// Adds a secondary index over `fields`.
    pub fn add_index(&mut self, table: &str, name: &str, fields: &[&str]) -> Result<()> {
        let sql = CreateIndex::new(table, name).fields(fields).build()?;
        self.query(&sql, &[])?;
        Ok(())
    }

    /// Drops a secondary index.
    pub fn drop_index(&mut self, table: &str, name: &str) -> Result<()> {
        let sql = DropIndex::new(table, name).build()?;
        self.query(&sql, &[])?;
        Ok(())
    }

    // ==================== Connection ====================

    /// Id generated by the most recent INSERT that produced one.
    #[must_use]
    pub const fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id
    }

    /// The most recent statement, with its values rendered inline.
    #[must_use]
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Commits the current transaction.
    pub fn commit(&mut self) -> Result<()> {
        debug!("Committing");
        self.executor.commit()
    }

    /// Returns `true` while the connection is usable.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.executor.is_open()
    }

    /// Closes the connection.
    pub fn close(&mut self) -> Result<()> {
        self.executor.close()
    }
}
