#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use oxide_sync_core::{
    ColumnDescriptor, Frame, QueryExecutor, QueryOutput, Result, SqlValue, SyncError, TableSchema,
    ValueTypeTag,
};

/// An in-memory executor that records every statement and keeps just
/// enough of a catalog to answer existence checks and `EXPLAIN`.
///
/// `CREATE TABLE` and `ALTER TABLE` statements are applied to the
/// catalog so multi-step flows can be replayed.
#[derive(Default)]
pub struct MockExecutor {
    pub tables: HashMap<String, TableSchema>,
    pub statements: Vec<(String, Vec<SqlValue>)>,
    pub failures: VecDeque<SyncError>,
    pub select_rows: QueryOutput,
    pub next_insert_id: Option<u64>,
    pub reconnects: usize,
    pub commits: usize,
    pub closed: bool,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live table.
    pub fn with_table(mut self, name: &str, schema: TableSchema) -> Self {
        self.tables.insert(name.to_string(), schema);
        self
    }

    /// Queues an error returned by the next `execute` call.
    pub fn fail_next(mut self, error: SyncError) -> Self {
        self.failures.push_back(error);
        self
    }

    /// Rows returned for every SELECT that is not a catalog query.
    pub fn with_rows(mut self, output: QueryOutput) -> Self {
        self.select_rows = output;
        self
    }

    /// SQL texts executed so far, excluding existence checks.
    pub fn sql(&self) -> Vec<&str> {
        self.statements
            .iter()
            .map(|(sql, _)| sql.as_str())
            .filter(|sql| !sql.contains("information_schema"))
            .collect()
    }

    /// Statements starting with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<&(String, Vec<SqlValue>)> {
        self.statements
            .iter()
            .filter(|(sql, _)| sql.starts_with(prefix))
            .collect()
    }

    fn explain(&self, table: &str) -> Result<QueryOutput> {
        let schema = self
            .tables
            .get(table)
            .ok_or_else(|| SyncError::SchemaNotFound(table.to_string()))?;
        let header = ["Field", "Type", "Null", "Key", "Default", "Extra"]
            .iter()
            .map(|c| (*c).to_string())
            .collect();
        let rows = schema
            .columns
            .iter()
            .map(|c| {
                vec![
                    SqlValue::Text(c.name.clone()),
                    // The server reports types in lower case, as bytes.
                    SqlValue::Blob(c.column_type.to_ascii_lowercase().into_bytes()),
                    SqlValue::Text(if c.nullable { "YES" } else { "NO" }.to_string()),
                    SqlValue::Text(if c.primary_key { "PRI" } else { "" }.to_string()),
                    SqlValue::Null,
                    SqlValue::Text(c.extra.clone()),
                ]
            })
            .collect();
        Ok(QueryOutput::rows(header, rows))
    }

    fn apply_create(&mut self, sql: &str) {
        let Some((name, body)) = split_table(sql, "CREATE TABLE ") else {
            return;
        };
        let body = body.trim_start_matches('(').trim_end_matches(')');
        let mut schema = TableSchema::new();
        for definition in body.split(", ") {
            let mut parts = definition.split_whitespace();
            let (Some(column), Some(ty)) = (parts.next(), parts.next()) else {
                continue;
            };
            let primary = definition.contains("PRIMARY KEY");
            let nullable = !definition.contains("NOT NULL");
            schema = schema.column(
                ColumnDescriptor::live(column, ty)
                    .nullable(nullable)
                    .primary_key(primary),
            );
        }
        self.tables.insert(name, schema);
    }

    fn apply_alter(&mut self, sql: &str) {
        let Some((name, body)) = split_table(sql, "ALTER TABLE ") else {
            return;
        };
        let Some(schema) = self.tables.get_mut(&name) else {
            return;
        };
        for clause in body.split(", ") {
            let words: Vec<&str> = clause.split_whitespace().collect();
            match words.as_slice() {
                ["ADD", "COLUMN", column, ty, ..] => {
                    schema.columns.push(ColumnDescriptor::live(*column, ty));
                }
                ["CHANGE", "COLUMN", old, new, ty, ..] => {
                    if let Some(existing) = schema.columns.iter_mut().find(|c| c.name == *old) {
                        *existing = ColumnDescriptor::live(*new, ty);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Splits "`PREFIX` `name` rest" into the unquoted name and the rest.
fn split_table(sql: &str, prefix: &str) -> Option<(String, String)> {
    let rest = sql.strip_prefix(prefix)?.strip_prefix('`')?;
    let end = rest.find('`')?;
    Some((
        rest[..end].to_string(),
        rest[end + 1..].trim().to_string(),
    ))
}

impl QueryExecutor for MockExecutor {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryOutput> {
        if self.closed {
            return Err(SyncError::ConnectionLost("connection closed".into()));
        }
        self.statements.push((sql.to_string(), params.to_vec()));
        if let Some(error) = self.failures.pop_front() {
            return Err(error);
        }

        if sql.contains("information_schema.tables") {
            let exists = params
                .first()
                .and_then(SqlValue::as_text)
                .is_some_and(|t| self.tables.contains_key(t));
            return Ok(QueryOutput::rows(
                vec!["COUNT(*)".into()],
                vec![vec![SqlValue::Int(i64::from(exists))]],
            ));
        }
        if let Some(rest) = sql.strip_prefix("EXPLAIN `") {
            return self.explain(rest.trim_end_matches('`'));
        }
        if sql.starts_with("CREATE TABLE") {
            self.apply_create(sql);
            return Ok(QueryOutput::default());
        }
        if sql.starts_with("ALTER TABLE") {
            self.apply_alter(sql);
            return Ok(QueryOutput::default());
        }
        if sql.starts_with("SELECT") {
            return Ok(self.select_rows.clone());
        }
        if sql.starts_with("INSERT") {
            let groups = sql.matches("(?").count() as u64;
            let mut output = QueryOutput::affected(groups);
            output.last_insert_id = self.next_insert_id;
            return Ok(output);
        }
        Ok(QueryOutput::affected(1))
    }

    fn reconnect(&mut self) -> Result<()> {
        self.reconnects += 1;
        self.closed = false;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.closed
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// The `{Name, Age, Is_Active}` players dataset.
pub fn players() -> Frame {
    Frame::new()
        .column(
            "Name",
            ValueTypeTag::Text,
            vec![SqlValue::Text("Bob".into()), SqlValue::Text("Ann".into())],
        )
        .column(
            "Age",
            ValueTypeTag::Float64,
            vec![SqlValue::Float(25.0), SqlValue::Float(31.5)],
        )
        .column(
            "Is_Active",
            ValueTypeTag::Boolean,
            vec![SqlValue::Bool(true), SqlValue::Bool(false)],
        )
}

/// A dataset with `rows` rows of `(id, label)`.
pub fn numbered(rows: usize) -> Frame {
    let ids = (0..rows)
        .map(|i| SqlValue::Int(i64::try_from(i).unwrap_or(i64::MAX)))
        .collect();
    let labels = (0..rows).map(|i| SqlValue::Text(format!("row {i}"))).collect();
    Frame::new()
        .column("id", ValueTypeTag::Int64, ids)
        .column("label", ValueTypeTag::Text, labels)
}
