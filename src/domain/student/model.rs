//! Student domain model

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::attendance::AttendanceStatus;
use crate::shared::SortKey;

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub father_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<String>,
    pub source: Option<String>,
    pub graduation_year: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A student together with attendance totals across all sessions
#[derive(Debug, Clone, PartialEq)]
pub struct StudentWithCounts {
    pub student: Student,
    pub present_count: i64,
    pub absent_count: i64,
}

/// Writable student fields, already normalised
/// (trimmed, empty strings turned into `None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentInput {
    pub name: String,
    pub father_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<String>,
    pub source: Option<String>,
    pub graduation_year: Option<i32>,
    pub notes: Option<String>,
}

impl StudentInput {
    /// Name and phone are the only required fields.
    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty() && !self.phone.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StudentSort {
    #[default]
    NameAsc,
    NameDesc,
    IdAsc,
    IdDesc,
}

impl SortKey for StudentSort {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name_asc" => Some(Self::NameAsc),
            "name_desc" => Some(Self::NameDesc),
            "id_asc" => Some(Self::IdAsc),
            "id_desc" => Some(Self::IdDesc),
            _ => None,
        }
    }
}

/// Student list filters. `None` never constrains.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Contains-match on name, father name or last name
    pub name: Option<String>,
    /// Contains-match on phone
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub graduation_year: Option<i32>,
    pub sort: StudentSort,
}

/// One session in a student's attendance history
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSessionEntry {
    pub session_id: i32,
    pub title: String,
    pub session_date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_at: Option<DateTime<Utc>>,
}

/// Result of an import upsert keyed on phone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(i32),
    Updated(i32),
}
