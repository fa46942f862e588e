//! CSV files as datasets.
//!
//! A CSV column is tagged the way a dataframe reader would tag it:
//! `Int64` when every non-empty cell is an integer, `Float64` when every
//! non-empty cell is a number, `Boolean` when every non-empty cell is
//! `true` or `false`, `Object` otherwise. Empty cells become NULL.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use oxide_sync_core::builder::Select;
use oxide_sync_core::{
    Dataset, Frame, FrameColumn, QueryExecutor, SqlValue, TableSync, ValueTypeTag,
};
use tracing::debug;

use crate::error::{MySqlSyncError, Result};

/// Opens a CSV reader with a header row.
fn open_csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).double_quote(true).flexible(false);
    builder.from_reader(reader)
}

/// Loads a CSV file into a [`Frame`].
pub fn load_csv(path: &Path) -> Result<Frame> {
    let file = File::open(path)?;
    let frame = read_csv(BufReader::new(file))?;
    if frame.is_empty() {
        return Err(MySqlSyncError::MissingHeader(path.to_path_buf()));
    }
    debug!(path = %path.display(), rows = frame.row_count(), "Loaded CSV");
    Ok(frame)
}

/// Reads CSV text with a header row into a [`Frame`].
pub fn read_csv<R: Read>(reader: R) -> Result<Frame> {
    let mut reader = open_csv_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push(cell.to_string());
        }
    }

    let mut frame = Frame::new();
    for (name, raw) in headers.into_iter().zip(cells) {
        let tag = column_tag(&raw);
        let values = raw.iter().map(|cell| parse_cell(cell, &tag)).collect();
        frame.push_column(FrameColumn { name, tag, values });
    }
    Ok(frame)
}

/// Writes a result set as CSV with a header row. NULL becomes an
/// empty cell.
pub fn write_csv<W: Write>(columns: &[String], rows: &[Vec<SqlValue>], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().double_quote(true).from_writer(writer);
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every row of `table` as CSV. The header comes from the result
/// set, or from the table description when the table has no rows.
pub fn export_table<E: QueryExecutor, W: Write>(
    sync: &mut TableSync<E>,
    table: &str,
    writer: W,
) -> Result<()> {
    let (sql, params) = Select::new().all().from(table).build()?;
    let output = sync.query(&sql, &params)?;
    let columns = if output.columns.is_empty() {
        sync.describe(table)?.names().map(String::from).collect()
    } else {
        output.columns
    };
    debug!(table = %table, rows = output.rows.len(), "Exporting table");
    write_csv(&columns, &output.rows, writer)
}

fn column_tag(cells: &[String]) -> ValueTypeTag {
    let mut present = cells.iter().map(|c| c.trim()).filter(|c| !c.is_empty()).peekable();
    if present.peek().is_none() {
        return ValueTypeTag::Object;
    }
    let present: Vec<&str> = present.collect();
    if present.iter().all(|c| c.parse::<i64>().is_ok()) {
        ValueTypeTag::Int64
    } else if present.iter().all(|c| c.parse::<f64>().is_ok()) {
        ValueTypeTag::Float64
    } else if present.iter().all(|c| parse_bool(c).is_some()) {
        ValueTypeTag::Boolean
    } else {
        ValueTypeTag::Object
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_cell(cell: &str, tag: &ValueTypeTag) -> SqlValue {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return SqlValue::Null;
    }
    let parsed = match tag {
        ValueTypeTag::Int64 => trimmed.parse().ok().map(SqlValue::Int),
        ValueTypeTag::Float64 => trimmed.parse().ok().map(SqlValue::Float),
        ValueTypeTag::Boolean => parse_bool(trimmed).map(SqlValue::Bool),
        _ => None,
    };
    parsed.unwrap_or_else(|| SqlValue::Text(cell.to_string()))
}
