use chrono::{DateTime, NaiveDate, Utc};

use crate::shared::SortKey;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: i32,
    pub title: String,
    pub session_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionWithCounts {
    pub session: Session,
    pub present_count: i64,
    pub absent_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionInput {
    pub title: String,
    pub session_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionSort {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

impl SortKey for SessionSort {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "date_desc" => Some(Self::DateDesc),
            "date_asc" => Some(Self::DateAsc),
            "title_asc" => Some(Self::TitleAsc),
            "title_desc" => Some(Self::TitleDesc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Contains-match on title
    pub title: Option<String>,
    pub sort: SessionSort,
}
