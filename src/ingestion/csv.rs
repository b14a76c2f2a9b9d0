//! Delimited-text (CSV) parsing.

use crate::error::{ParseCause, UploadResult};
use crate::types::{Table, Value};

use super::unified::column_name;

/// Tokens treated as a missing value.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Parse an in-memory CSV payload into a [`Table`].
///
/// Rules:
///
/// - Input must be UTF-8; a leading byte-order mark is ignored.
/// - The first non-blank line is the header; blank lines are skipped.
/// - Ragged rows are padded with nulls or truncated to the header width.
/// - Each cell is typed independently (see [`infer_cell`]); nothing fails on type.
pub fn parse_csv_bytes(bytes: &[u8]) -> UploadResult<Table> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseCause::Encoding {
        message: e.to_string(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ParseCause::EmptyInput.into());
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    parse_csv_from_reader(&mut rdr)
}

/// Parse CSV data from an existing CSV reader.
///
/// The reader should be built with `has_headers(true)`; use `flexible(true)` to tolerate
/// ragged rows.
pub fn parse_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> UploadResult<Table> {
    let headers = rdr.headers().map_err(ParseCause::from)?.clone();
    if headers.is_empty() {
        return Err(ParseCause::EmptyInput.into());
    }
    let column_names: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(idx, raw)| column_name(idx, raw))
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(ParseCause::from)?;
        rows.push(record.iter().map(infer_cell).collect());
    }

    Ok(Table::new(column_names, rows))
}

/// Type a single raw CSV field.
///
/// Order: missing-value token, integer, finite float, boolean, otherwise the raw text.
pub fn infer_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if NA_TOKENS.contains(&trimmed) {
        return Value::Null;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Value::Int64(v);
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        if v.is_finite() {
            return Value::Float64(v);
        }
    }
    match trimmed {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::Utf8(raw.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_cell_prefers_natural_types() {
        assert_eq!(infer_cell("42"), Value::Int64(42));
        assert_eq!(infer_cell(" -7 "), Value::Int64(-7));
        assert_eq!(infer_cell("2.5"), Value::Float64(2.5));
        assert_eq!(infer_cell("1e3"), Value::Float64(1000.0));
        assert_eq!(infer_cell("TRUE"), Value::Bool(true));
        assert_eq!(infer_cell("no"), Value::Utf8("no".to_string()));
        assert_eq!(infer_cell("Ann "), Value::Utf8("Ann ".to_string()));
    }

    #[test]
    fn infer_cell_maps_missing_tokens_and_non_finite_to_null_or_text() {
        assert_eq!(infer_cell(""), Value::Null);
        assert_eq!(infer_cell("   "), Value::Null);
        assert_eq!(infer_cell("NaN"), Value::Null);
        assert_eq!(infer_cell("N/A"), Value::Null);
        assert_eq!(infer_cell("inf"), Value::Utf8("inf".to_string()));
    }

    #[test]
    fn bom_is_ignored() {
        let t = parse_csv_bytes(b"\xef\xbb\xbfid,name\n1,Ann\n").unwrap();
        assert_eq!(t.column_names(), ["id", "name"]);
    }

    #[test]
    fn blank_header_cells_are_named_by_position() {
        let t = parse_csv_bytes(b"id,,name\n1,2,3\n").unwrap();
        assert_eq!(t.column_names(), ["id", "Unnamed: 1", "name"]);
    }
}
