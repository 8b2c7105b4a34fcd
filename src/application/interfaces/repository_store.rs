use async_trait::async_trait;

use crate::domain::{DomainError, RepositoryId, RepositoryRecord};

/// Versions returned by [`RepositoryStore::read`], in persisted order.
pub const VERSION_READ_LIMIT: usize = 25;

/// Durable storage for merged repository records.
///
/// Records are written once and never updated. Implementations must enforce
/// identifier uniqueness themselves: a second `create` for an identifier that
/// is already stored fails with [`DomainError::AlreadyExists`], which callers
/// treat as "another writer populated it first".
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn exists(&self, id: &RepositoryId) -> Result<bool, DomainError>;

    /// Fails with [`DomainError::NotFound`] when no record is stored.
    ///
    /// Statistics come back ordered by name; versions keep the order they
    /// were written in, capped at [`VERSION_READ_LIMIT`].
    async fn read(&self, id: &RepositoryId) -> Result<RepositoryRecord, DomainError>;

    /// Writes the record, its statistics, topics and versions atomically.
    async fn create(&self, record: &RepositoryRecord) -> Result<(), DomainError>;
}
