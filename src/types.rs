//! Core data model types for the upload pipeline.
//!
//! An upload arrives as an [`UploadRequest`] (raw bytes plus the caller-declared file name) and,
//! once parsed, becomes an immutable [`Table`] of [`Value`] cells.

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Wire format for date-time cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single cell value, kept in its natural type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Date-time without time zone (spreadsheet dates).
    DateTime(NaiveDateTime),
}

impl Value {
    /// Convert to the JSON representation used on the wire.
    ///
    /// Non-finite floats have no JSON encoding and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Int64(v) => JsonValue::from(*v),
            Value::Float64(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Utf8(s) => JsonValue::String(s.clone()),
            Value::DateTime(dt) => JsonValue::String(dt.format(DATETIME_FORMAT).to_string()),
        }
    }
}

/// In-memory tabular data parsed from an upload.
///
/// Every row has exactly `column_names.len()` cells. Column names are not required to be
/// unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    column_names: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table, padding short rows with [`Value::Null`] and truncating long rows so that
    /// every row matches the header width.
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = column_names.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { column_names, rows }
    }

    /// Ordered column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Row-major cell storage.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }
}

/// A raw upload as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Raw uploaded bytes, already fully buffered.
    pub raw_bytes: Vec<u8>,
    /// File name as supplied by the client. Untrusted.
    pub declared_filename: String,
    /// Size claimed by the transport (e.g. `Content-Length`), if known.
    pub declared_size: Option<u64>,
}

impl UploadRequest {
    /// Create a request from bytes and a client-supplied file name.
    pub fn new(declared_filename: impl Into<String>, raw_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            raw_bytes: raw_bytes.into(),
            declared_filename: declared_filename.into(),
            declared_size: None,
        }
    }

    /// Attach the size declared by the transport.
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }
}
