use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{RepositoryStore, VERSION_READ_LIMIT};
use crate::domain::{DomainError, RepositoryId, RepositoryRecord};

/// Process-local store with the same read semantics as the SQLite store.
pub struct InMemoryRepositoryStore {
    records: Arc<Mutex<HashMap<String, RepositoryRecord>>>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl Default for InMemoryRepositoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn exists(&self, id: &RepositoryId) -> Result<bool, DomainError> {
        Ok(self.records.lock().await.contains_key(id.as_str()))
    }

    async fn read(&self, id: &RepositoryId) -> Result<RepositoryRecord, DomainError> {
        let records = self.records.lock().await;
        let record = records
            .get(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Repository not stored: {}", id)))?;

        let mut statistics = record.statistics().to_vec();
        statistics.sort_by(|a, b| a.name().cmp(b.name()));
        let versions: Vec<_> = record
            .versions()
            .iter()
            .take(VERSION_READ_LIMIT)
            .cloned()
            .collect();

        Ok(record
            .clone()
            .with_statistics(statistics)
            .with_versions(versions))
    }

    async fn create(&self, record: &RepositoryRecord) -> Result<(), DomainError> {
        let mut records = self.records.lock().await;
        if records.contains_key(record.identifier()) {
            return Err(DomainError::already_exists(format!(
                "Repository already stored: {}",
                record.id()
            )));
        }

        records.insert(record.identifier().to_string(), record.clone());
        debug!("Stored {} in memory", record.id());
        Ok(())
    }
}
