//! Bounded, read-only projection of a [`Table`].

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::types::Table;

/// Summary returned to the caller after a successful upload.
///
/// Serializes to `{filename, rows, columns, column_names, preview}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResult {
    /// Sanitized file name.
    pub filename: String,
    /// Total number of data rows.
    pub rows: usize,
    /// Number of columns.
    pub columns: usize,
    /// Column names in table order.
    pub column_names: Vec<String>,
    /// The first rows, each keyed by column name.
    pub preview: Vec<Map<String, JsonValue>>,
}

/// Build a [`PreviewResult`] holding at most `limit` rows.
///
/// Keys keep column order. When column names repeat, the rightmost cell wins.
pub fn preview_table(filename: impl Into<String>, table: &Table, limit: usize) -> PreviewResult {
    let preview = table
        .rows()
        .iter()
        .take(limit)
        .map(|row| {
            table
                .column_names()
                .iter()
                .zip(row)
                .map(|(name, cell)| (name.clone(), cell.to_json()))
                .collect::<Map<String, JsonValue>>()
        })
        .collect();

    PreviewResult {
        filename: filename.into(),
        rows: table.row_count(),
        columns: table.column_count(),
        column_names: table.column_names().to_vec(),
        preview,
    }
}
