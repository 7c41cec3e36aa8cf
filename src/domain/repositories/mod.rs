//! Repository traits for the domain layer
//!
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::attendance::AttendanceRepository;
use super::report::ReportRepository;
use super::session::SessionRepository;
use super::student::StudentRepository;
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let session = repos.sessions().find_with_counts(3).await?;
///     let inserted = repos.attendance().seed_absent(3).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn students(&self) -> &dyn StudentRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn attendance(&self) -> &dyn AttendanceRepository;
    fn reports(&self) -> &dyn ReportRepository;
    fn users(&self) -> &dyn UserRepository;
}
