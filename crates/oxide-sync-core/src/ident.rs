//! Identifier handling for synthesized SQL.
//!
//! Column names coming from a dataset are stripped down to their
//! alphanumeric characters before they are embedded in a statement.
//! Table names are quoted instead, so existing names such as
//! `export_log` keep addressing the same table.

/// Keeps only the alphanumeric characters of `name`, in order.
///
/// This narrows what a column name can inject into a statement. It is
/// not a substitute for binding values as parameters.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Quotes a table name with backticks, doubling embedded backticks.
#[must_use]
pub fn quote_table(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Qualifies a sanitized column with a quoted table name.
#[must_use]
pub fn qualify(table: &str, column: &str) -> String {
    format!("{}.{}", quote_table(table), sanitize(column))
}
