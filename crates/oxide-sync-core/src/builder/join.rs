//! Two-table LEFT JOIN builder.

use std::marker::PhantomData;

use super::clause::{Limit, OrderBy, WhereClause, push_tail};
use super::value::SqlValue;
use crate::error::{Result, SyncError};
use crate::ident::{qualify, quote_table};

// Typestate markers

/// Marker: No join condition yet.
pub struct NoOn;
/// Marker: Join condition has been specified.
pub struct HasOn;

/// `SELECT t0.a, t1.b FROM t0 LEFT JOIN t1 ON (t0.x = t1.y)`.
///
/// Every selected field is qualified by its table so that columns with
/// the same name on both sides stay unambiguous.
pub struct LeftJoin<On> {
    left: String,
    right: String,
    left_fields: Vec<String>,
    right_fields: Vec<String>,
    on: Option<(String, String)>,
    where_clause: Option<WhereClause>,
    order_by: Option<OrderBy>,
    limit: Option<Limit>,
    _state: PhantomData<On>,
}

impl LeftJoin<NoOn> {
    /// Joins `right` onto `left`.
    #[must_use]
    pub fn new(left: &str, right: &str) -> Self {
        Self {
            left: String::from(left),
            right: String::from(right),
            left_fields: vec![],
            right_fields: vec![],
            on: None,
            where_clause: None,
            order_by: None,
            limit: None,
            _state: PhantomData,
        }
    }

    /// Sets the join columns: `left.left_column = right.right_column`.
    #[must_use]
    pub fn on(self, left_column: &str, right_column: &str) -> LeftJoin<HasOn> {
        LeftJoin {
            left: self.left,
            right: self.right,
            left_fields: self.left_fields,
            right_fields: self.right_fields,
            on: Some((String::from(left_column), String::from(right_column))),
            where_clause: self.where_clause,
            order_by: self.order_by,
            limit: self.limit,
            _state: PhantomData,
        }
    }
}

impl<On> LeftJoin<On> {
    /// Chooses the fields to select from each side.
    #[must_use]
    pub fn fields(mut self, left: &[&str], right: &[&str]) -> Self {
        self.left_fields = left.iter().map(|f| String::from(*f)).collect();
        self.right_fields = right.iter().map(|f| String::from(*f)).collect();
        self
    }

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
}

impl LeftJoin<HasOn> {
    /// Builds the join query and returns SQL with parameters.
    pub fn build(self) -> Result<(String, Vec<SqlValue>)> {
        let fields: Vec<String> = self
            .left_fields
            .iter()
            .map(|f| qualify(&self.left, f))
            .chain(self.right_fields.iter().map(|f| qualify(&self.right, f)))
            .collect();
        if fields.is_empty() {
            return Err(SyncError::malformed("left join selects no fields"));
        }

        let mut sql = String::from("SELECT ");
        let mut params = vec![];
        sql.push_str(&fields.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(&quote_table(&self.left));
        sql.push_str(" LEFT JOIN ");
        sql.push_str(&quote_table(&self.right));

        if let Some((ref left_column, ref right_column)) = self.on {
            sql.push_str(&format!(
                " ON ({} = {})",
                qualify(&self.left, left_column),
                qualify(&self.right, right_column)
            ));
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
