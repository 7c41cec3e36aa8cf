//! Report rows
//!
//! These are read-only projections over students and attendance; nothing
//! here is ever written back.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total_students: u64,
    pub total_sessions: u64,
    pub total_attendance: u64,
}

/// Student count for one birth or graduation year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderCount {
    pub gender: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BirthdayEntry {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub birthdate: NaiveDate,
    pub gender: Option<String>,
    pub graduation_year: Option<i32>,
    pub age: i32,
}

/// Whole years between `birthdate` and `today`
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age
}

/// A student with attendance totals, for the exact-count report
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceTally {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub present_count: i64,
    pub absent_count: i64,
}

impl AttendanceTally {
    pub fn total(&self) -> i64 {
        self.present_count + self.absent_count
    }

    /// `round(100 * present / total)`, 0 for a student with no rows
    pub fn percent_present(&self) -> i64 {
        let total = self.total();
        if total <= 0 {
            return 0;
        }
        (100.0 * self.present_count as f64 / total as f64).round() as i64
    }
}
