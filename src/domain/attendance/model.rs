use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            other => Err(format!("Unknown attendance status: {}", other)),
        }
    }
}

/// A student's row in a session roster
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceEntry {
    pub session_id: i32,
    pub student_id: i32,
    pub name: String,
    pub phone: String,
    pub status: AttendanceStatus,
    pub marked_at: Option<DateTime<Utc>>,
}

/// Roster row with the session it belongs to, for export
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceExportRow {
    pub student_id: i32,
    pub name: String,
    pub phone: String,
    pub status: AttendanceStatus,
    pub marked_at: Option<DateTime<Utc>>,
    pub session_title: String,
    pub session_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkAttendance {
    pub session_id: i32,
    pub student_id: i32,
    pub status: AttendanceStatus,
}
