//! Core business types and repository traits

pub mod attendance;
pub mod repositories;
pub mod report;
pub mod session;
pub mod student;
pub mod user;

pub use attendance::{
    AttendanceEntry, AttendanceExportRow, AttendanceFilter, AttendanceStatus, MarkAttendance,
};
pub use report::{AttendanceTally, BirthdayEntry, GenderCount, Summary, YearCount};
pub use repositories::{DomainResult, RepositoryProvider};
pub use session::{Session, SessionFilter, SessionInput, SessionSort, SessionWithCounts};
pub use student::{
    Student, StudentFilter, StudentInput, StudentSessionEntry, StudentSort, StudentWithCounts,
    UpsertOutcome,
};
pub use user::{NewUser, User, UserRole};

pub use crate::shared::errors::DomainError;
