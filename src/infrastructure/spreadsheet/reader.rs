//! Reading the first sheet of an uploaded workbook
//!
//! The first non-empty row is the header. Every later row becomes a map
//! from header text to the cell rendered as a string. Rows with no content
//! at all are dropped.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::{NaiveDate, TimeDelta};

use super::SpreadsheetError;

/// One data row of a sheet
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    /// 1-based row number as shown by spreadsheet programs
    pub number: u32,
    cells: HashMap<String, String>,
}

impl SheetRow {
    /// Trimmed value of the first header in `aliases` that is present and
    /// non-empty in this row.
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|a| self.cells.get(*a))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    #[cfg(test)]
    pub fn from_pairs(number: u32, pairs: &[(&str, &str)]) -> Self {
        Self {
            number,
            cells: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Parse `bytes` as `.xlsx` and return the data rows of the first sheet.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<SheetRow>, SpreadsheetError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| SpreadsheetError::Read(e.to_string()))?;

    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Err(SpreadsheetError::Empty);
    };
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| SpreadsheetError::Read(e.to_string()))?;

    let first_row = range.start().map(|(row, _)| row + 1).unwrap_or(1);
    let mut rows = range.rows();
    let Some(header_cells) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_cells
        .iter()
        .map(|c| cell_to_string(c).trim().to_string())
        .collect();

    let mut out = Vec::new();
    for (offset, cells) in rows.enumerate() {
        let values: HashMap<String, String> = headers
            .iter()
            .zip(cells.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell_to_string(cell)))
            .collect();

        if values.values().all(|v| v.trim().is_empty()) {
            continue;
        }
        out.push(SheetRow {
            number: first_row + 1 + offset as u32,
            cells: values,
        });
    }
    Ok(out)
}

/// Render a cell the way it would read as text. Whole floats lose their
/// fraction so that numeric phone numbers and years stay intact; date
/// cells become `YYYY-MM-DD`.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => float_to_string(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        _ => String::new(),
    }
}

fn float_to_string(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Excel's 1900 date system, counted from 1899-12-30. Serials outside the
/// representable range give `None`.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(TimeDelta::try_days(serial.floor() as i64)?)
}
