//! Attendance repository interface

use async_trait::async_trait;

use super::model::{AttendanceEntry, AttendanceExportRow, AttendanceFilter, MarkAttendance};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Roster of one session ordered by student name.
    /// The caller checks that the session exists.
    async fn list_for_session(
        &self,
        session_id: i32,
        filter: AttendanceFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceEntry>>;

    /// Insert `Absent` for every student without a row in the session.
    /// Returns the number of rows inserted; a second call inserts nothing.
    async fn seed_absent(&self, session_id: i32) -> DomainResult<u64>;

    /// Upsert on (session, student), stamping `marked_at` with now.
    async fn mark(&self, mark: MarkAttendance) -> DomainResult<()>;

    /// Full roster of one session for export
    async fn export_for_session(&self, session_id: i32) -> DomainResult<Vec<AttendanceExportRow>>;
}
