//! Caller-supplied clause fragments and placeholder accounting.

use super::value::{SqlValue, ToSqlValue};
use crate::error::{Result, SyncError};

/// A parameterized WHERE condition: `("id = ? AND name = ?", [1, "x"])`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    condition: String,
    params: Vec<SqlValue>,
}

impl WhereClause {
    /// Creates a condition with its bound values.
    #[must_use]
    pub fn new<T: ToSqlValue>(condition: impl Into<String>, params: Vec<T>) -> Self {
        Self {
            condition: condition.into(),
            params: params.into_iter().map(ToSqlValue::to_sql_value).collect(),
        }
    }

    /// Creates a condition without parameters.
    ///
    /// **Warning**: Only use this for conditions that don't contain user input.
    #[must_use]
    pub fn raw(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            params: vec![],
        }
    }

    /// Returns the condition text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.condition
    }

    /// Returns the bound values.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Checks that the condition has one placeholder per bound value.
    pub fn validate(&self) -> Result<()> {
        let placeholders = count_placeholders(&self.condition);
        if placeholders == self.params.len() {
            Ok(())
        } else {
            Err(SyncError::malformed(format!(
                "WHERE clause has {placeholders} placeholders but {} values",
                self.params.len()
            )))
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY fragment. The field text is emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    field: String,
    direction: Option<Direction>,
}

impl OrderBy {
    /// Orders by `field` with the server's default direction.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: None,
        }
    }

    /// Orders ascending.
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Some(Direction::Asc),
        }
    }

    /// Orders descending.
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Some(Direction::Desc),
        }
    }

    pub(crate) fn to_sql(&self) -> String {
        match self.direction {
            Some(d) => format!("{} {}", self.field, d.as_sql()),
            None => self.field.clone(),
        }
    }
}

/// A LIMIT clause in MySQL form: `LIMIT count` or `LIMIT offset, count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    offset: Option<u64>,
    count: u64,
}

impl Limit {
    /// At most `count` rows.
    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self {
            offset: None,
            count,
        }
    }

    /// `count` rows starting after `offset`.
    #[must_use]
    pub const fn with_offset(offset: u64, count: u64) -> Self {
        Self {
            offset: Some(offset),
            count,
        }
    }

    pub(crate) fn to_sql(self) -> String {
        match self.offset {
            Some(offset) => format!("{offset}, {}", self.count),
            None => self.count.to_string(),
        }
    }
}

/// Appends the shared `WHERE` / `ORDER BY` / `LIMIT` tail of a query.
pub(crate) fn push_tail(
    sql: &mut String,
    params: &mut Vec<SqlValue>,
    where_clause: Option<&WhereClause>,
    order: Option<&OrderBy>,
    limit: Option<Limit>,
) -> Result<()> {
    if let Some(where_clause) = where_clause {
        where_clause.validate()?;
        sql.push_str(" WHERE ");
        sql.push_str(where_clause.sql());
        params.extend(where_clause.params().iter().cloned());
    }

    if let Some(order) = order {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.to_sql());
    }

    if let Some(limit) = limit {
        sql.push_str(" LIMIT ");
        sql.push_str(&limit.to_sql());
    }

    Ok(())
}

/// Counts `?` placeholders outside quoted literals and identifiers.
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    placeholder_offsets(sql).len()
}

/// Substitutes each placeholder with the inline rendering of its value.
/// Used to show the last executed query; never sent to the server.
#[must_use]
pub fn inline_params(sql: &str, params: &[SqlValue]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for (offset, value) in placeholder_offsets(sql).into_iter().zip(params) {
        out.push_str(&sql[last..offset]);
        out.push_str(&value.to_sql_inline());
        last = offset + 1;
    }
    out.push_str(&sql[last..]);
    out
}

fn placeholder_offsets(sql: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in sql.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            // Backslash escapes apply inside string literals, not identifiers.
            Some(q) if c == '\\' && q != '`' => escaped = true,
            // Doubled quotes toggle twice, which leaves the state unchanged.
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => offsets.push(i),
                _ => {}
            },
        }
    }
    offsets
}
