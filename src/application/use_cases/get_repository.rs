use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::merge_sources;
use crate::application::{HostingProvider, PackageIndexProvider, RepositoryStore};
use crate::domain::{DomainError, PackageInfo, RepositoryId, RepositoryRecord};

/// Fetch-or-populate read path for repository metadata.
///
/// A stored record is returned as is. On a miss both providers are queried
/// concurrently, their results merged, and the record written in a single
/// store transaction before being read back. Nothing is cached when any step
/// fails, and a record is never refreshed once stored.
pub struct GetRepositoryUseCase {
    store: Arc<dyn RepositoryStore>,
    hosting: Arc<dyn HostingProvider>,
    package_index: Arc<dyn PackageIndexProvider>,
}

impl GetRepositoryUseCase {
    pub fn new(
        store: Arc<dyn RepositoryStore>,
        hosting: Arc<dyn HostingProvider>,
        package_index: Arc<dyn PackageIndexProvider>,
    ) -> Self {
        Self {
            store,
            hosting,
            package_index,
        }
    }

    pub async fn execute(&self, identifier: &str) -> Result<RepositoryRecord, DomainError> {
        self.execute_with_cancellation(identifier, &CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), but every provider and store call
    /// aborts with [`DomainError::Canceled`] as soon as `cancel` fires.
    pub async fn execute_with_cancellation(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<RepositoryRecord, DomainError> {
        let id = RepositoryId::parse(identifier)?;

        let exists = cancellable(cancel, "checking store", self.store.exists(&id)).await?;
        if exists {
            debug!("Cache hit for {}", id);
            return self.read_existing(&id, cancel).await;
        }

        debug!("Cache miss for {}, populating", id);
        let record = self.populate(&id, cancel).await?;

        match cancellable(cancel, "writing record", self.store.create(&record)).await {
            Ok(()) => {
                info!(
                    "Populated {} ({} statistics, {} versions)",
                    id,
                    record.statistics().len(),
                    record.versions().len()
                );
            }
            Err(e) if e.is_already_exists() => {
                info!("{} was populated concurrently, reading the stored record", id);
            }
            Err(e) => return Err(e),
        }

        cancellable(cancel, "reading record", self.store.read(&id)).await
    }

    /// Reports whether a durable record exists, without populating one.
    pub async fn is_cached(&self, identifier: &str) -> Result<bool, DomainError> {
        self.is_cached_with_cancellation(identifier, &CancellationToken::new())
            .await
    }

    pub async fn is_cached_with_cancellation(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        let id = RepositoryId::parse(identifier)?;
        cancellable(cancel, "checking store", self.store.exists(&id)).await
    }

    async fn read_existing(
        &self,
        id: &RepositoryId,
        cancel: &CancellationToken,
    ) -> Result<RepositoryRecord, DomainError> {
        match cancellable(cancel, "reading record", self.store.read(id)).await {
            Err(e) if e.is_not_found() => {
                warn!("Store reported {} as existing but the read found nothing", id);
                Err(e)
            }
            other => other,
        }
    }

    async fn populate(
        &self,
        id: &RepositoryId,
        cancel: &CancellationToken,
    ) -> Result<RepositoryRecord, DomainError> {
        let hosting = async {
            let started = Instant::now();
            let result = self.hosting.fetch(id).await;
            debug!(
                provider = "hosting",
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Fetched {}",
                id
            );
            result
        };

        let package_index = async {
            let started = Instant::now();
            let result = self.package_index.fetch(id).await;
            debug!(
                provider = "package_index",
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Fetched {}",
                id
            );
            match result {
                Ok(info) => Ok(Some(info)),
                Err(e) if e.is_not_found() => {
                    debug!("Package index has no page for {}", id);
                    Ok(None::<PackageInfo>)
                }
                Err(e) => Err(e),
            }
        };

        let (snapshot, package_info) = cancellable(cancel, "fetching providers", async {
            tokio::try_join!(hosting, package_index)
        })
        .await?;

        Ok(merge_sources(
            id.clone(),
            snapshot,
            package_info.as_ref(),
            Utc::now(),
        ))
    }
}

async fn cancellable<T, F>(
    cancel: &CancellationToken,
    operation: &str,
    future: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DomainError::canceled(format!("{} abandoned by caller", operation))),
        result = future => result,
    }
}
