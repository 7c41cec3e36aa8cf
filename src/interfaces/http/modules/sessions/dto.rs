//! Session DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::{SessionFilter, SessionInput, SessionSort, SessionWithCounts};
use crate::interfaces::http::common::{not_blank, ApiError};
use crate::shared::{normalize_text, to_date_only, SortKey};

pub const TITLE_AND_DATE: &str = "Title and session_date are required";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SessionListQuery {
    /// Contains-match on title
    pub title: Option<String>,
    /// `date_desc` (default), `date_asc`, `title_asc`, `title_desc`
    pub sort: Option<String>,
}

impl SessionListQuery {
    pub fn into_filter(self) -> SessionFilter {
        SessionFilter {
            title: normalize_text(self.title.as_deref()),
            sort: SessionSort::from_query(self.sort.as_deref()),
        }
    }
}

fn is_date(value: &str) -> Result<(), ValidationError> {
    match to_date_only(Some(value)) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("date")),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SessionRequest {
    #[serde(default)]
    #[validate(
        required(message = "Title and session_date are required"),
        custom(function = "not_blank", message = "Title and session_date are required")
    )]
    pub title: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    #[validate(
        required(message = "Title and session_date are required"),
        custom(function = "is_date", message = "Title and session_date are required")
    )]
    pub session_date: Option<String>,
}

impl SessionRequest {
    pub fn into_input(self) -> Result<SessionInput, ApiError> {
        let title = normalize_text(self.title.as_deref());
        let session_date = to_date_only(self.session_date.as_deref());
        match (title, session_date) {
            (Some(title), Some(session_date)) => Ok(SessionInput {
                title,
                session_date,
            }),
            _ => Err(ApiError::bad_request(TITLE_AND_DATE)),
        }
    }
}

/// A session as shown in lists, with attendance totals
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: i32,
    pub title: String,
    pub session_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub present_count: i64,
    pub absent_count: i64,
}

impl From<SessionWithCounts> for SessionResponse {
    fn from(row: SessionWithCounts) -> Self {
        Self {
            id: row.session.id,
            title: row.session.title,
            session_date: row.session.session_date,
            created_at: row.session.created_at,
            present_count: row.present_count,
            absent_count: row.absent_count,
        }
    }
}
