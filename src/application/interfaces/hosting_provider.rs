use async_trait::async_trait;

use crate::domain::{DomainError, HostingSnapshot, RepositoryId};

/// Structured metadata source (statistics, description, releases).
///
/// Returns [`DomainError::NotFound`] when the hosting service does not know
/// the repository. That result is authoritative for the whole lookup.
#[async_trait]
pub trait HostingProvider: Send + Sync {
    async fn fetch(&self, id: &RepositoryId) -> Result<HostingSnapshot, DomainError>;
}
