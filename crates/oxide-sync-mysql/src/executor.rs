//! Blocking [`QueryExecutor`] over a single sqlx MySQL connection.
//!
//! The connection lives on a private current-thread tokio runtime and
//! every call blocks on it, so callers never see the async driver.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use oxide_sync_core::{QueryExecutor, QueryOutput, SqlValue, SyncError};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Row, TypeInfo};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{Result, map_sqlx_error};

/// A MySQL session driven synchronously.
pub struct MySqlExecutor {
    config: ConnectionConfig,
    runtime: Runtime,
    conn: Option<MySqlConnection>,
}

impl MySqlExecutor {
    /// Opens a session described by `config`.
    pub fn connect(config: ConnectionConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut executor = Self {
            config,
            runtime,
            conn: None,
        };
        executor.open()?;
        Ok(executor)
    }

    /// Returns the configuration this session was opened with.
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn open(&mut self) -> oxide_sync_core::Result<()> {
        let options = self.config.connect_options();
        let autocommit = self.config.autocommit_statement();

        let conn = self
            .runtime
            .block_on(async {
                let mut conn = MySqlConnection::connect_with(&options).await?;
                sqlx::raw_sql(autocommit).execute(&mut conn).await?;
                Ok::<_, sqlx::Error>(conn)
            })
            .map_err(map_sqlx_error)?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            database = %self.config.database,
            "Connected to MySQL"
        );
        self.conn = Some(conn);
        Ok(())
    }

    /// Runs the `SELECT 1` liveness probe.
    fn probe(&mut self) -> bool {
        let Some(conn) = self.conn.as_mut() else {
            return false;
        };
        self.runtime
            .block_on(sqlx::raw_sql("SELECT 1").execute(conn))
            .is_ok()
    }
}

impl QueryExecutor for MySqlExecutor {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> oxide_sync_core::Result<QueryOutput> {
        if self.config.keep_alive && !self.probe() {
            warn!("Liveness probe failed, reconnecting");
            self.reconnect()?;
        }

        let returns_rows = returns_rows(sql);
        let conn = self.conn.as_mut().ok_or_else(closed)?;
        self.runtime
            .block_on(run(conn, sql, params, returns_rows))
            .map_err(map_sqlx_error)
    }

    fn reconnect(&mut self) -> oxide_sync_core::Result<()> {
        if let Some(conn) = self.conn.take() {
            // The old session is usually already dead; a failed close is expected.
            if let Err(e) = self.runtime.block_on(conn.close()) {
                debug!(error = %e, "Closing stale connection failed");
            }
        }
        self.open()
    }

    fn commit(&mut self) -> oxide_sync_core::Result<()> {
        let conn = self.conn.as_mut().ok_or_else(closed)?;
        self.runtime
            .block_on(sqlx::raw_sql("COMMIT").execute(conn))
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn close(&mut self) -> oxide_sync_core::Result<()> {
        if let Some(conn) = self.conn.take() {
            self.runtime.block_on(conn.close()).map_err(map_sqlx_error)?;
            info!("Closed MySQL connection");
        }
        Ok(())
    }
}

fn closed() -> SyncError {
    SyncError::ConnectionLost(String::from("connection is closed"))
}

/// Returns `true` for statements that produce a result set.
fn returns_rows(sql: &str) -> bool {
    let keyword = leading_keyword(sql).to_ascii_uppercase();
    matches!(
        keyword.as_str(),
        "SELECT" | "SHOW" | "EXPLAIN" | "DESCRIBE" | "DESC" | "WITH" | "VALUES" | "TABLE"
    )
}

/// The first word of `sql`, past whitespace, opening parentheses and
/// comments.
fn leading_keyword(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, after)| after);
        } else if sql.starts_with("-- ") || sql.starts_with('#') {
            sql = sql.split_once('\n').map_or("", |(_, after)| after);
        } else {
            break;
        }
    }
    let end = sql
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(sql.len());
    &sql[..end]
}

async fn run(
    conn: &mut MySqlConnection,
    sql: &str,
    params: &[SqlValue],
    returns_rows: bool,
) -> std::result::Result<QueryOutput, sqlx::Error> {
    if returns_rows {
        let rows = if params.is_empty() {
            sqlx::raw_sql(sql).fetch_all(&mut *conn).await?
        } else {
            bind_all(sqlx::query(sql), params)
                .fetch_all(&mut *conn)
                .await?
        };
        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(QueryOutput::rows(columns, rows));
    }

    let result = if params.is_empty() {
        sqlx::raw_sql(sql).execute(&mut *conn).await?
    } else {
        bind_all(sqlx::query(sql), params)
            .execute(&mut *conn)
            .await?
    };
    Ok(QueryOutput {
        rows_affected: result.rows_affected(),
        last_insert_id: Some(result.last_insert_id()).filter(|id| *id != 0),
        ..QueryOutput::default()
    })
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in params {
        query = bind_param(query, value.clone());
    }
    query
}

/// Binds a SqlValue parameter to a query.
fn bind_param(
    query: Query<'_, MySql, MySqlArguments>,
    value: SqlValue,
) -> Query<'_, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
        SqlValue::DateTime(dt) => query.bind(dt),
    }
}

fn decode_row(row: &MySqlRow) -> std::result::Result<Vec<SqlValue>, sqlx::Error> {
    row.columns()
        .iter()
        .map(|column| decode_cell(row, column.ordinal(), column.type_info().name()))
        .collect()
}

/// Decodes one cell by its declared server type.
fn decode_cell(
    row: &MySqlRow,
    index: usize,
    type_name: &str,
) -> std::result::Result<SqlValue, sqlx::Error> {
    let value = match type_name {
        "NULL" => None,
        "BOOLEAN" => row.try_get::<Option<bool>, _>(index)?.map(SqlValue::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<Option<i64>, _>(index)?.map(SqlValue::Int)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<Option<u64>, _>(index)?.map(|n| {
            i64::try_from(n).map_or_else(|_| SqlValue::Text(n.to_string()), SqlValue::Int)
        }),
        "YEAR" => row
            .try_get_unchecked::<Option<u16>, _>(index)?
            .map(|y| SqlValue::Int(i64::from(y))),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)?
            .map(|f| SqlValue::Float(f64::from(f))),
        "DOUBLE" => row.try_get::<Option<f64>, _>(index)?.map(SqlValue::Float),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(SqlValue::DateTime),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|d| SqlValue::DateTime(d.and_time(NaiveTime::MIN))),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)?
            .map(|t| SqlValue::Text(t.to_string())),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .map(SqlValue::Blob),
        // DECIMAL, JSON, ENUM, SET and text types all arrive as strings.
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)?
            .map(SqlValue::Text),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}
