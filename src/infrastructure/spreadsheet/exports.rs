//! Workbook layouts for each export

use super::writer::{Cell, SheetSpec};
use super::SpreadsheetError;
use crate::domain::{AttendanceExportRow, BirthdayEntry, Student};

/// Header row of the import template; the importer accepts these names.
pub const TEMPLATE_HEADERS: &[&str] = &[
    "Name",
    "FatherName",
    "LastName",
    "Address",
    "Phone",
    "Birthdate",
    "Gender",
    "Source",
    "GraduationYear",
    "Notes",
];

const TEMPLATE_WIDTHS: &[f64] = &[16.0, 16.0, 16.0, 18.0, 12.0, 12.0, 10.0, 14.0, 16.0, 30.0];

const STUDENT_HEADERS: &[&str] = &[
    "ID",
    "Name",
    "FatherName",
    "LastName",
    "Address",
    "Phone",
    "Birthdate",
    "Gender",
    "Source",
    "GraduationYear",
    "Notes",
    "CreatedAt",
];

const ATTENDANCE_HEADERS: &[&str] = &[
    "StudentID",
    "Name",
    "Phone",
    "Status",
    "MarkedAt",
    "Session",
    "SessionDate",
];

const BIRTHDAY_HEADERS: &[&str] = &[
    "StudentID",
    "Name",
    "Phone",
    "Address",
    "Birthdate",
    "Gender",
    "GraduationYear",
    "Age",
];

fn date(d: chrono::NaiveDate) -> Cell {
    Cell::Text(d.format("%Y-%m-%d").to_string())
}

fn timestamp(t: chrono::DateTime<chrono::Utc>) -> Cell {
    Cell::Text(t.format("%Y-%m-%d %H:%M:%S").to_string())
}

pub fn students_workbook(students: &[Student]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut sheet = SheetSpec::new("Students", STUDENT_HEADERS);
    for s in students {
        sheet.push_row(vec![
            s.id.into(),
            s.name.as_str().into(),
            s.father_name.clone().into(),
            s.last_name.clone().into(),
            s.address.clone().into(),
            s.phone.as_str().into(),
            s.birthdate.map(date).unwrap_or(Cell::Empty),
            s.gender.clone().into(),
            s.source.clone().into(),
            s.graduation_year.into(),
            s.notes.clone().into(),
            timestamp(s.created_at),
        ]);
    }
    sheet.to_xlsx()
}

/// Import template: header row, one sample row, frozen header.
pub fn template_workbook() -> Result<Vec<u8>, SpreadsheetError> {
    let mut sheet = SheetSpec::new("Template", TEMPLATE_HEADERS);
    sheet.widths = TEMPLATE_WIDTHS;
    sheet.freeze_header = true;
    sheet.push_row(vec![
        "Adam".into(),
        "Eric".into(),
        "Hull".into(),
        "Cruzchester".into(),
        "80071".into(),
        "2000-01-15".into(),
        "Male".into(),
        "Manual".into(),
        2027i32.into(),
        "Optional notes here".into(),
    ]);
    sheet.to_xlsx()
}

pub fn attendance_workbook(rows: &[AttendanceExportRow]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut sheet = SheetSpec::new("Attendance", ATTENDANCE_HEADERS);
    for r in rows {
        sheet.push_row(vec![
            r.student_id.into(),
            r.name.as_str().into(),
            r.phone.as_str().into(),
            r.status.as_str().into(),
            r.marked_at.map(timestamp).unwrap_or(Cell::Empty),
            r.session_title.as_str().into(),
            date(r.session_date),
        ]);
    }
    sheet.to_xlsx()
}

pub fn birthdays_workbook(rows: &[BirthdayEntry]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut sheet = SheetSpec::new("Birthdays", BIRTHDAY_HEADERS);
    for r in rows {
        sheet.push_row(vec![
            r.id.into(),
            r.name.as_str().into(),
            r.phone.as_str().into(),
            r.address.clone().into(),
            date(r.birthdate),
            r.gender.clone().into(),
            r.graduation_year.into(),
            r.age.into(),
        ]);
    }
    sheet.to_xlsx()
}
