//! Report DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AttendanceTally, BirthdayEntry, GenderCount, Summary, YearCount};
use crate::interfaces::http::common::ApiError;
use crate::shared::{parse_leading_int, parse_non_negative};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MonthQuery {
    /// 1-12
    pub month: Option<String>,
}

impl MonthQuery {
    pub fn month(&self) -> Result<u32, ApiError> {
        parse_leading_int(self.month.as_deref())
            .filter(|m| (1..=12).contains(m))
            .map(|m| m as u32)
            .ok_or_else(|| ApiError::bad_request("month must be 1-12"))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CountQuery {
    pub present: Option<String>,
    pub absent: Option<String>,
}

impl CountQuery {
    /// `(present, absent)`, both required and non-negative
    pub fn counts(&self) -> Result<(i64, i64), ApiError> {
        match (
            parse_non_negative(self.present.as_deref()),
            parse_non_negative(self.absent.as_deref()),
        ) {
            (Some(present), Some(absent)) => Ok((present, absent)),
            _ => Err(ApiError::bad_request(
                "present and absent must be non-negative integers",
            )),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub total_students: u64,
    pub total_sessions: u64,
    pub total_attendance: u64,
}

impl From<Summary> for SummaryResponse {
    fn from(s: Summary) -> Self {
        Self {
            total_students: s.total_students,
            total_sessions: s.total_sessions,
            total_attendance: s.total_attendance,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BirthYearCount {
    pub birth_year: i32,
    pub count: u64,
}

impl From<YearCount> for BirthYearCount {
    fn from(y: YearCount) -> Self {
        Self {
            birth_year: y.year,
            count: y.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GraduationYearCount {
    pub graduation_year: i32,
    pub count: u64,
}

impl From<YearCount> for GraduationYearCount {
    fn from(y: YearCount) -> Self {
        Self {
            graduation_year: y.year,
            count: y.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenderCountResponse {
    pub gender: String,
    pub count: u64,
}

impl From<GenderCount> for GenderCountResponse {
    fn from(g: GenderCount) -> Self {
        Self {
            gender: g.gender,
            count: g.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BirthdayResponse {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub birthdate: NaiveDate,
    pub gender: Option<String>,
    pub graduation_year: Option<i32>,
    /// Completed years as of today
    pub age: i32,
}

impl From<BirthdayEntry> for BirthdayResponse {
    fn from(b: BirthdayEntry) -> Self {
        Self {
            id: b.id,
            name: b.name,
            phone: b.phone,
            address: b.address,
            birthdate: b.birthdate,
            gender: b.gender,
            graduation_year: b.graduation_year,
            age: b.age,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TallyResponse {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub present_count: i64,
    pub absent_count: i64,
    pub total: i64,
    /// `round(100 * present / total)`, 0 without any rows
    pub percent_present: i64,
}

impl From<AttendanceTally> for TallyResponse {
    fn from(t: AttendanceTally) -> Self {
        Self {
            total: t.total(),
            percent_present: t.percent_present(),
            id: t.id,
            name: t.name,
            phone: t.phone,
            present_count: t.present_count,
            absent_count: t.absent_count,
        }
    }
}

/// Page of the exact-count report, echoing the requested counts
#[derive(Debug, Serialize, ToSchema)]
pub struct CountReportResponse {
    pub present: i64,
    pub absent: i64,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub rows: Vec<TallyResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(raw: &str) -> Result<u32, ApiError> {
        MonthQuery {
            month: Some(raw.to_string()),
        }
        .month()
    }

    #[test]
    fn month_is_bounded() {
        assert_eq!(month("3").unwrap(), 3);
        assert_eq!(month("12").unwrap(), 12);
        assert!(month("0").is_err());
        assert!(month("13").is_err());
        assert!(month("march").is_err());
        assert!(MonthQuery::default().month().is_err());
    }

    #[test]
    fn counts_must_both_be_present() {
        let q = CountQuery {
            present: Some("0".into()),
            absent: Some("11".into()),
        };
        assert_eq!(q.counts().unwrap(), (0, 11));

        let q = CountQuery {
            present: Some("-1".into()),
            absent: Some("2".into()),
        };
        let err = q.counts().unwrap_err();
        assert_eq!(err.message, "present and absent must be non-negative integers");

        assert!(CountQuery::default().counts().is_err());
    }
}
