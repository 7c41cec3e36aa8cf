//! Report repository interface

use async_trait::async_trait;

use super::model::{AttendanceTally, BirthdayEntry, GenderCount, Summary, YearCount};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn summary(&self) -> DomainResult<Summary>;

    /// Students with a birthdate, grouped by birth year ascending
    async fn students_by_birth_year(&self) -> DomainResult<Vec<YearCount>>;

    /// Students with a graduation year, grouped ascending
    async fn students_by_graduation_year(&self) -> DomainResult<Vec<YearCount>>;

    /// Students with a gender, counted per value
    async fn gender_distribution(&self) -> DomainResult<Vec<GenderCount>>;

    /// Students born in `month` (1-12), ordered by day of month then name
    async fn birthdays(
        &self,
        month: u32,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<BirthdayEntry>>;

    async fn birthdays_for_export(&self, month: u32) -> DomainResult<Vec<BirthdayEntry>>;

    /// Students whose present and absent totals equal the given numbers
    async fn students_by_count(
        &self,
        present: i64,
        absent: i64,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceTally>>;
}
