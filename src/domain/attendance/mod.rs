//! Attendance aggregate
//!
//! One row per (session, student). Rows are created either by seeding a
//! session with `Absent` for everyone, or by marking a single student.

pub mod model;
pub mod repository;

pub use model::{
    AttendanceEntry, AttendanceExportRow, AttendanceFilter, AttendanceStatus, MarkAttendance,
};
pub use repository::AttendanceRepository;
