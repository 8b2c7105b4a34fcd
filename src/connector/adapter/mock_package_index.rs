use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::application::PackageIndexProvider;
use crate::domain::{DomainError, PackageInfo, RepositoryId};

const MOCK_BASE_URL: &str = "https://godoc.org";

/// Offline package index with hash-derived import counts.
pub struct MockPackageIndex;

impl MockPackageIndex {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockPackageIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageIndexProvider for MockPackageIndex {
    async fn fetch(&self, id: &RepositoryId) -> Result<PackageInfo, DomainError> {
        let mut hasher = DefaultHasher::new();
        id.as_str().hash(&mut hasher);
        let seed = hasher.finish();

        Ok(PackageInfo {
            imports: (seed % 40) as i64,
            importers: ((seed >> 8) % 2000) as i64,
            updated: None,
            page_url: format!("{}/{}", MOCK_BASE_URL, id),
        })
    }
}
