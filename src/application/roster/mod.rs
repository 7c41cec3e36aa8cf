//! Bulk student import from spreadsheets

pub mod import;

pub use import::{import_students, student_input_from_row, ImportReport};
