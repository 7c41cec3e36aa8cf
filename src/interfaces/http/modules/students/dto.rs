//! Student DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::ImportReport;
use crate::domain::{
    AttendanceStatus, StudentFilter, StudentInput, StudentSessionEntry, StudentSort,
    StudentWithCounts,
};
use crate::interfaces::http::common::not_blank;
use crate::shared::{normalize_text, parse_int_filter, to_date_only, to_int_or_null, SortKey};

// ── Requests ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StudentListQuery {
    /// Contains-match on name, father name or last name
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub graduation_year: Option<String>,
    /// `name_asc` (default), `name_desc`, `id_asc`, `id_desc`
    pub sort: Option<String>,
}

impl StudentListQuery {
    pub fn into_filter(self) -> StudentFilter {
        StudentFilter {
            name: normalize_text(self.name.as_deref()),
            phone: normalize_text(self.phone.as_deref()),
            gender: normalize_text(self.gender.as_deref()),
            graduation_year: parse_int_filter(self.graduation_year.as_deref()),
            sort: StudentSort::from_query(self.sort.as_deref()),
        }
    }
}

/// Create and update body. Optional fields are trimmed and blank values
/// stored as null; unreadable dates and years are stored as null too.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct StudentRequest {
    #[serde(default)]
    #[validate(
        required(message = "Name and phone are required"),
        custom(function = "not_blank", message = "Name and phone are required")
    )]
    pub name: Option<String>,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "Name and phone are required"),
        custom(function = "not_blank", message = "Name and phone are required")
    )]
    pub phone: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Integer or numeric string
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub graduation_year: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StudentRequest {
    pub fn into_input(self) -> StudentInput {
        StudentInput {
            name: normalize_text(self.name.as_deref()).unwrap_or_default(),
            father_name: normalize_text(self.father_name.as_deref()),
            last_name: normalize_text(self.last_name.as_deref()),
            address: normalize_text(self.address.as_deref()),
            phone: normalize_text(self.phone.as_deref()).unwrap_or_default(),
            birthdate: to_date_only(self.birthdate.as_deref()),
            gender: normalize_text(self.gender.as_deref()),
            source: normalize_text(self.source.as_deref()),
            graduation_year: to_int_or_null(self.graduation_year.as_ref()),
            notes: normalize_text(self.notes.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct NotesRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

// ── Responses ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentResponse {
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
    pub present_count: i64,
    pub absent_count: i64,
}

impl From<StudentWithCounts> for StudentResponse {
    fn from(row: StudentWithCounts) -> Self {
        let s = row.student;
        Self {
            id: s.id,
            name: s.name,
            father_name: s.father_name,
            last_name: s.last_name,
            address: s.address,
            phone: s.phone,
            birthdate: s.birthdate,
            gender: s.gender,
            source: s.source,
            graduation_year: s.graduation_year,
            notes: s.notes,
            created_at: s.created_at,
            present_count: row.present_count,
            absent_count: row.absent_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

/// One session in a student's history
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentSessionResponse {
    pub session_id: i32,
    pub title: String,
    pub session_date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_at: Option<DateTime<Utc>>,
}

impl From<StudentSessionEntry> for StudentSessionResponse {
    fn from(e: StudentSessionEntry) -> Self {
        Self {
            session_id: e.session_id,
            title: e.title,
            session_date: e.session_date,
            status: e.status,
            marked_at: e.marked_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
    /// One message per skipped row, e.g. `Row 4: missing name or phone`
    pub errors: Vec<String>,
}

impl From<ImportReport> for ImportResponse {
    fn from(r: ImportReport) -> Self {
        Self {
            inserted: r.inserted,
            updated: r.updated,
            skipped: r.skipped,
            errors: r.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_normalises_optional_fields() {
        let req: StudentRequest = serde_json::from_value(json!({
            "name": " Sara ",
            "phone": "0790",
            "father_name": "   ",
            "birthdate": "2001-02-03T00:00:00Z",
            "graduation_year": "2026",
            "gender": "F"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let input = req.into_input();
        assert_eq!(input.name, "Sara");
        assert_eq!(input.father_name, None);
        assert_eq!(input.birthdate, NaiveDate::from_ymd_opt(2001, 2, 3));
        assert_eq!(input.graduation_year, Some(2026));
    }

    #[test]
    fn missing_phone_fails_validation() {
        let req: StudentRequest = serde_json::from_value(json!({ "name": "Sara" })).unwrap();
        assert!(req.validate().is_err());

        let req: StudentRequest =
            serde_json::from_value(json!({ "name": "Sara", "phone": " " })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn unparseable_filters_do_not_constrain() {
        let filter = StudentListQuery {
            graduation_year: Some("abc".into()),
            sort: Some("shoe_size".into()),
            name: Some("  ".into()),
            ..Default::default()
        }
        .into_filter();
        assert_eq!(filter.graduation_year, None);
        assert_eq!(filter.sort, StudentSort::NameAsc);
        assert_eq!(filter.name, None);
    }
}
