use async_trait::async_trait;

use crate::domain::{DomainError, PackageInfo, RepositoryId};

/// Secondary source for import counts and the last indexed date.
#[async_trait]
pub trait PackageIndexProvider: Send + Sync {
    /// Returns [`DomainError::NotFound`] when the index has no page for the
    /// repository; callers continue without the index's contribution.
    async fn fetch(&self, id: &RepositoryId) -> Result<PackageInfo, DomainError>;
}
