use async_trait::async_trait;

use super::model::{NewUser, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lookup by e-mail; callers pass the lower-cased form.
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>>;

    /// Admin accounts, newest first
    async fn list_admins(&self) -> DomainResult<Vec<User>>;

    async fn count_admins(&self) -> DomainResult<u64>;

    async fn count(&self) -> DomainResult<u64>;

    /// Insert a user. Duplicate e-mail → `Conflict("Email already exists")`.
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    async fn delete(&self, id: i32) -> DomainResult<()>;
}
