use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tracing::debug;

use crate::application::HostingProvider;
use crate::domain::{DomainError, HostingSnapshot, RepositoryId, Release, Statistic, VersionSource};

/// Offline hosting provider that derives a stable snapshot from the identifier.
///
/// Identifiers whose name starts with `missing` are reported as not found.
pub struct MockHostingProvider;

impl MockHostingProvider {
    pub fn new() -> Self {
        Self
    }

    fn seed(id: &RepositoryId) -> u64 {
        let mut hasher = DefaultHasher::new();
        id.as_str().hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for MockHostingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostingProvider for MockHostingProvider {
    async fn fetch(&self, id: &RepositoryId) -> Result<HostingSnapshot, DomainError> {
        if id.name().starts_with("missing") {
            return Err(DomainError::not_found(format!("Mock repository not found: {}", id)));
        }

        let seed = Self::seed(id);
        let stars = (seed % 5000) as i64;
        let forks = ((seed >> 16) % 500) as i64;
        debug!("Mock snapshot for {} (seed {})", id, seed);

        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().unwrap_or_default();
        let releases = (0..3u32)
            .rev()
            .map(|minor| {
                let tag = format!("v1.{}.0", minor);
                Release {
                    url: id.web_url(&format!("releases/tag/{}", tag)),
                    tag,
                    is_draft: false,
                    is_prerelease: false,
                    published_at: Some(base + Duration::days(30 * i64::from(minor))),
                }
            })
            .collect();

        Ok(HostingSnapshot {
            description: Some(format!("Mock repository {}/{}", id.owner(), id.name())),
            statistics: vec![
                Statistic::new("Forks", forks, id.web_url("network")),
                Statistic::new("Stars", stars, id.web_url("stargazers")),
            ],
            license: None,
            topics: Vec::new(),
            versions: VersionSource::Releases(releases),
        })
    }
}
