#![cfg(feature = "excel")]

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets, Xlsx};
use chrono::NaiveDateTime;

use crate::config::PipelineConfig;
use crate::error::{ParseCause, UploadResult};
use crate::types::{Table, Value};

use super::unified::column_name;

/// Parse an in-memory workbook (`.xlsx`, `.xls`, `.xlsb`, `.ods`) into a [`Table`], with the
/// cell budget of the default [`PipelineConfig`].
///
/// Behavior:
/// - The container kind is sniffed from the bytes, not taken from the file name
/// - Uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Skips rows whose cells are all empty
/// - Converts cells into their natural [`Value`]s; nothing fails on type
pub fn parse_excel_bytes(bytes: &[u8]) -> UploadResult<Table> {
    parse_excel_bytes_with_limit(bytes, PipelineConfig::default().max_sheet_cells())
}

/// Like [`parse_excel_bytes`], but fails with [`ParseCause::SheetTooLarge`] once the sheet
/// would need more than `max_cells` cells.
///
/// `.xlsx` sheets are streamed cell by cell and only occupied rows are kept, so a far-away
/// cell costs one row, not the whole bounding box. Other containers are decoded by calamine
/// as a dense range and are rejected when that range's area exceeds the budget.
pub fn parse_excel_bytes_with_limit(bytes: &[u8], max_cells: u64) -> UploadResult<Table> {
    if bytes.is_empty() {
        return Err(ParseCause::EmptyInput.into());
    }

    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(ParseCause::from)?;
    match workbook {
        Sheets::Xlsx(mut xlsx) => read_xlsx(&mut xlsx, max_cells),
        mut other => read_range(&mut other, max_cells),
    }
}

fn read_xlsx<RS: Read + Seek>(xlsx: &mut Xlsx<RS>, max_cells: u64) -> UploadResult<Table> {
    let first = first_sheet(xlsx.sheet_names())?;
    let mut cells = xlsx
        .worksheet_cells_reader(&first)
        .map_err(|e| ParseCause::from(calamine::Error::from(e)))?;

    let mut sheet = SparseSheet::default();
    while let Some(cell) = cells
        .next_cell()
        .map_err(|e| ParseCause::from(calamine::Error::from(e)))?
    {
        let (row, col) = cell.get_position();
        sheet.insert(row, col, Data::from(cell.get_value().clone()), max_cells)?;
    }
    sheet.into_table(max_cells)
}

fn read_range<RS: Read + Seek>(workbook: &mut Sheets<RS>, max_cells: u64) -> UploadResult<Table> {
    let first = first_sheet(workbook.sheet_names())?;
    let range = workbook.worksheet_range(&first).map_err(ParseCause::from)?;

    let (height, width) = range.get_size();
    let area = (height as u64).saturating_mul(width as u64);
    if area > max_cells {
        return Err(ParseCause::SheetTooLarge {
            cells: area,
            limit: max_cells,
        }
        .into());
    }

    let mut sheet = SparseSheet::default();
    for (row, col, c) in range.cells() {
        sheet.insert(row as u32, col as u32, c.clone(), max_cells)?;
    }
    sheet.into_table(max_cells)
}

fn first_sheet(names: Vec<String>) -> UploadResult<String> {
    names
        .into_iter()
        .next()
        .ok_or_else(|| ParseCause::NoWorksheet.into())
}

/// Occupied cells of one worksheet, keyed by row.
#[derive(Default)]
struct SparseSheet {
    rows: BTreeMap<u32, Vec<(u32, Data)>>,
    cells: u64,
    min_col: Option<u32>,
    max_col: u32,
}

impl SparseSheet {
    fn insert(&mut self, row: u32, col: u32, value: Data, max_cells: u64) -> UploadResult<()> {
        if matches!(value, Data::Empty) {
            return Ok(());
        }
        self.cells += 1;
        if self.cells > max_cells {
            return Err(ParseCause::SheetTooLarge {
                cells: self.cells,
                limit: max_cells,
            }
            .into());
        }
        self.min_col = Some(self.min_col.map_or(col, |m| m.min(col)));
        self.max_col = self.max_col.max(col);
        self.rows.entry(row).or_default().push((col, value));
        Ok(())
    }

    /// Lay the occupied rows out over the occupied column span; the first row is the header.
    fn into_table(self, max_cells: u64) -> UploadResult<Table> {
        // No occupied cell: no header, so an empty table.
        let Some(min_col) = self.min_col else {
            return Ok(Table::new(Vec::new(), Vec::new()));
        };
        let width = u64::from(self.max_col - min_col) + 1;
        let needed = width.saturating_mul(self.rows.len() as u64);
        if needed > max_cells {
            return Err(ParseCause::SheetTooLarge {
                cells: needed,
                limit: max_cells,
            }
            .into());
        }
        let width = width as usize;
        let offset = |col: u32| (col - min_col) as usize;

        let mut rows = self.rows.into_values();
        let mut column_names: Vec<String> = (0..width).map(|idx| column_name(idx, "")).collect();
        if let Some(header) = rows.next() {
            for (col, c) in header {
                let idx = offset(col);
                column_names[idx] = column_name(idx, &cell_to_header_string(&c));
            }
        }

        let rows: Vec<Vec<Value>> = rows
            .map(|cells| {
                let mut row = vec![Value::Null; width];
                for (col, c) in cells {
                    row[offset(col)] = convert_cell(&c);
                }
                row
            })
            .collect();

        Ok(Table::new(column_names, rows))
    }
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Convert a workbook cell into a [`Value`].
///
/// Whole floats become integers (workbooks store every number as a float). Date cells that
/// cannot be represented as a date-time degrade to their serial number.
fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Value::DateTime(ndt),
            None => float_value(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Utf8(s.clone())),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(e) => Value::Utf8(e.to_string()),
    }
}

fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::Int64(f as i64)
    } else {
        Value::Float64(f)
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
