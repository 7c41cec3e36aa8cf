//! Attendance DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::{AttendanceEntry, AttendanceFilter, AttendanceStatus, MarkAttendance};
use crate::interfaces::http::common::ApiError;
use crate::shared::normalize_text;

pub const MARK_REQUIRED: &str = "session_id, student_id, and valid status are required";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RosterQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
    /// `Present` or `Absent`; anything else is ignored
    pub status: Option<String>,
}

impl RosterQuery {
    pub fn into_filter(self) -> AttendanceFilter {
        AttendanceFilter {
            name: normalize_text(self.name.as_deref()),
            phone: normalize_text(self.phone.as_deref()),
            status: self
                .status
                .as_deref()
                .and_then(|s| s.trim().parse::<AttendanceStatus>().ok()),
        }
    }
}

fn is_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<AttendanceStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("status"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MarkRequest {
    #[serde(default)]
    #[validate(
        required(message = "session_id, student_id, and valid status are required"),
        range(min = 1, max = 2147483647, message = "session_id, student_id, and valid status are required")
    )]
    pub session_id: Option<i64>,
    #[serde(default)]
    #[validate(
        required(message = "session_id, student_id, and valid status are required"),
        range(min = 1, max = 2147483647, message = "session_id, student_id, and valid status are required")
    )]
    pub student_id: Option<i64>,
    /// `Present` or `Absent`
    #[serde(default)]
    #[validate(
        required(message = "session_id, student_id, and valid status are required"),
        custom(function = "is_status", message = "session_id, student_id, and valid status are required")
    )]
    pub status: Option<String>,
}

impl MarkRequest {
    pub fn into_mark(self) -> Result<MarkAttendance, ApiError> {
        let id = |raw: Option<i64>| raw.and_then(|n| i32::try_from(n).ok()).filter(|n| *n > 0);
        let status = self
            .status
            .as_deref()
            .and_then(|s| s.parse::<AttendanceStatus>().ok());

        match (id(self.session_id), id(self.student_id), status) {
            (Some(session_id), Some(student_id), Some(status)) => Ok(MarkAttendance {
                session_id,
                student_id,
                status,
            }),
            _ => Err(ApiError::bad_request(MARK_REQUIRED)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub session_id: i32,
    pub student_id: i32,
    pub name: String,
    pub phone: String,
    pub status: AttendanceStatus,
    /// Null until the row is marked
    pub marked_at: Option<DateTime<Utc>>,
}

impl From<AttendanceEntry> for AttendanceResponse {
    fn from(e: AttendanceEntry) -> Self {
        Self {
            session_id: e.session_id,
            student_id: e.student_id,
            name: e.name,
            phone: e.phone,
            status: e.status,
            marked_at: e.marked_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResponse {
    pub ok: bool,
    /// Rows created by this call; 0 when the roster was already complete
    pub inserted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_must_match_exactly() {
        let req: MarkRequest = serde_json::from_value(
            json!({ "session_id": 1, "student_id": 2, "status": "present" }),
        )
        .unwrap();
        assert!(req.validate().is_err());
        assert!(req.into_mark().is_err());
    }

    #[test]
    fn zero_ids_are_rejected() {
        let req: MarkRequest =
            serde_json::from_value(json!({ "session_id": 0, "student_id": 2, "status": "Present" }))
                .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn valid_mark_converts() {
        let req: MarkRequest =
            serde_json::from_value(json!({ "session_id": 1, "student_id": 2, "status": "Absent" }))
                .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(
            req.into_mark().unwrap(),
            MarkAttendance {
                session_id: 1,
                student_id: 2,
                status: AttendanceStatus::Absent,
            }
        );
    }

    #[test]
    fn unknown_status_filter_is_ignored() {
        let filter = RosterQuery {
            status: Some("Late".into()),
            ..Default::default()
        }
        .into_filter();
        assert_eq!(filter.status, None);
    }
}
