//! Reporting read models

pub mod model;
pub mod repository;

pub use model::{AttendanceTally, BirthdayEntry, GenderCount, Summary, YearCount};
pub use repository::ReportRepository;
