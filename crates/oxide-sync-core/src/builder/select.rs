//! SELECT statement builder using the typestate pattern.
//!
//! Only the shapes the sync layer reads back are covered: a column list
//! (or `*`), one table, and the shared WHERE / ORDER BY / LIMIT tail.

use std::marker::PhantomData;

use super::clause::{Limit, OrderBy, WhereClause, push_tail};
use super::value::SqlValue;
use crate::error::Result;
use crate::ident::{quote_table, sanitize};

// Typestate markers

/// Marker: No columns selected yet.
pub struct NoColumns;
/// Marker: Columns have been selected.
pub struct HasColumns;
/// Marker: No FROM clause yet.
pub struct NoFrom;
/// Marker: FROM clause has been specified.
pub struct HasFrom;

/// A SELECT builder over a single table.
pub struct Select<Cols, From> {
    columns: Vec<String>,
    from: Option<String>,
    where_clause: Option<WhereClause>,
    order_by: Option<OrderBy>,
    limit: Option<Limit>,
    _state: PhantomData<(Cols, From)>,
}

impl Select<NoColumns, NoFrom> {
    /// Creates a new SELECT builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: vec![],
            from: None,
            where_clause: None,
            order_by: None,
            limit: None,
            _state: PhantomData,
        }
    }
}

impl Default for Select<NoColumns, NoFrom> {
    fn default() -> Self {
        Self::new()
    }
}

// Transition: NoColumns -> HasColumns
impl<From> Select<NoColumns, From> {
    /// Selects the given columns. `*` is kept as is; other names are
    /// sanitized.
    #[must_use]
    pub fn columns(self, cols: &[&str]) -> Select<HasColumns, From> {
        Select {
            columns: cols
                .iter()
                .map(|c| if *c == "*" { String::from("*") } else { sanitize(c) })
                .collect(),
            from: self.from,
            where_clause: self.where_clause,
            order_by: self.order_by,
            limit: self.limit,
            _state: PhantomData,
        }
    }

    /// Selects all columns (`SELECT *`).
    #[must_use]
    pub fn all(self) -> Select<HasColumns, From> {
        self.columns(&["*"])
    }
}

// Transition: NoFrom -> HasFrom
impl<Cols> Select<Cols, NoFrom> {
    /// Specifies the table to select from.
    #[must_use]
    pub fn from(self, table: &str) -> Select<Cols, HasFrom> {
        Select {
            columns: self.columns,
            from: Some(String::from(table)),
            where_clause: self.where_clause,
            order_by: self.order_by,
            limit: self.limit,
            _state: PhantomData,
        }
    }
}

// Methods available once FROM is specified
impl<Cols> Select<Cols, HasFrom> {
    /// Adds a WHERE clause.
    #[must_use]
    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Adds an ORDER BY clause.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Adds a LIMIT clause.
    #[must_use]
    pub const fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns `true` if a LIMIT has been set.
    #[must_use]
    pub const fn has_limit(&self) -> bool {
        self.limit.is_some()
    }
}

impl Select<HasColumns, HasFrom> {
    /// Builds the SELECT statement and returns SQL with parameters.
    pub fn build(self) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = String::from("SELECT ");
        let mut params = vec![];

        sql.push_str(&self.columns.join(", "));

        if let Some(ref table) = self.from {
            sql.push_str(" FROM ");
            sql.push_str(&quote_table(table));
        }

        push_tail(
            &mut sql,
            &mut params,
            self.where_clause.as_ref(),
            self.order_by.as_ref(),
            self.limit,
        )?;

        Ok((sql, params))
    }
}
