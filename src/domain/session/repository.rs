//! Session repository interface

use async_trait::async_trait;

use super::model::{SessionFilter, SessionInput, SessionWithCounts};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn list(
        &self,
        filter: SessionFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<SessionWithCounts>>;

    async fn find_with_counts(&self, id: i32) -> DomainResult<Option<SessionWithCounts>>;

    async fn exists(&self, id: i32) -> DomainResult<bool>;

    /// Insert a session and return it with zero counts
    async fn create(&self, input: SessionInput) -> DomainResult<SessionWithCounts>;

    async fn update(&self, id: i32, input: SessionInput) -> DomainResult<()>;

    /// Delete the session's attendance rows, then the session.
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
