use rust_xlsxwriter::{Format, Workbook};

use super::SpreadsheetError;

/// A single output cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(f64::from(n))
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// One worksheet: a bold header row followed by data rows
#[derive(Debug, Clone)]
pub struct SheetSpec {
    pub name: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
    /// Column widths in characters, by position
    pub widths: &'static [f64],
    pub freeze_header: bool,
}

impl SheetSpec {
    pub fn new(name: &'static str, headers: &'static [&'static str]) -> Self {
        Self {
            name,
            headers,
            rows: Vec::new(),
            widths: &[],
            freeze_header: false,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Render a single-sheet workbook into memory.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, SpreadsheetError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.name)?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (i, row) in self.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(r, col as u16, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, col as u16, *n)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        for (col, width) in self.widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }
        if self.freeze_header {
            worksheet.set_freeze_panes(1, 0)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}
