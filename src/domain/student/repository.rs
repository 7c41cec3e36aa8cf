//! Student repository interface

use async_trait::async_trait;

use super::model::{
    Student, StudentFilter, StudentInput, StudentSessionEntry, StudentWithCounts, UpsertOutcome,
};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Filtered, sorted page of students with attendance totals
    async fn list(
        &self,
        filter: StudentFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<StudentWithCounts>>;

    async fn find_with_counts(&self, id: i32) -> DomainResult<Option<StudentWithCounts>>;

    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<Student>>;

    /// Insert a student, returning its id. Duplicate phone → `Conflict`.
    async fn create(&self, input: StudentInput) -> DomainResult<i32>;

    /// Replace all writable fields. Unknown id → `NotFound`.
    async fn update(&self, id: i32, input: StudentInput) -> DomainResult<()>;

    async fn update_notes(&self, id: i32, notes: Option<String>) -> DomainResult<()>;

    /// Delete the student's attendance rows, then the student.
    async fn delete(&self, id: i32) -> DomainResult<()>;

    /// Attendance history of one student, most recent session first
    async fn sessions_for_student(
        &self,
        student_id: i32,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<StudentSessionEntry>>;

    /// Every student ordered by name, for export
    async fn all(&self) -> DomainResult<Vec<Student>>;

    /// Insert, or update every field except phone when the phone exists.
    async fn upsert_by_phone(&self, input: StudentInput) -> DomainResult<UpsertOutcome>;
}
