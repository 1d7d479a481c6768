use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait RoomLock: Send + Sync {
    /// Attempt to take the lease on `key` for `ttl_seconds`.
    /// Returns false if another owner holds an unexpired lease.
    async fn acquire(&self, key: &str, owner: &str, ttl_seconds: u64) -> DomainResult<bool>;

    /// Release the lease if it is held by `owner`.
    async fn release(&self, key: &str, owner: &str) -> DomainResult<()>;
}
