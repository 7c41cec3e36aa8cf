//! `.xlsx` export and import

pub mod exports;
pub mod reader;
pub mod writer;

pub use reader::{read_first_sheet, SheetRow};
pub use writer::{Cell, SheetSpec};

use thiserror::Error;

/// MIME type of an `.xlsx` workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook: {0}")]
    Read(String),

    /// The workbook has no sheets
    #[error("Empty file")]
    Empty,
}
