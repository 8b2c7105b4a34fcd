use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{select_current_version, RepositoryId, Version};

/// A named popularity counter with a deep link to where it can be browsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    name: String,
    value: i64,
    url: String,
}

impl Statistic {
    pub fn new(name: impl Into<String>, value: i64, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            url: url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    name: String,
    url: Option<String>,
}

impl License {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    name: String,
    url: String,
}

impl Topic {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The canonical, merged metadata record for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    id: RepositoryId,
    description: Option<String>,
    last_updated: DateTime<Utc>,
    license: Option<License>,
    topics: Vec<Topic>,
    statistics: Vec<Statistic>,
    versions: Vec<Version>,
    current_version: Version,
}

impl RepositoryRecord {
    pub fn new(id: RepositoryId, description: Option<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            id,
            description: description.filter(|d| !d.is_empty()),
            last_updated,
            license: None,
            topics: Vec::new(),
            statistics: Vec::new(),
            versions: Vec::new(),
            current_version: Version::default(),
        }
    }

    /// Reconstitutes from persisted data (used by adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RepositoryId,
        description: Option<String>,
        last_updated: DateTime<Utc>,
        license: Option<License>,
        topics: Vec<Topic>,
        statistics: Vec<Statistic>,
        versions: Vec<Version>,
        current_version: Version,
    ) -> Self {
        Self {
            id,
            description,
            last_updated,
            license,
            topics,
            statistics,
            versions,
            current_version,
        }
    }

    pub fn with_license(mut self, license: Option<License>) -> Self {
        self.license = license;
        self
    }

    pub fn with_topics(mut self, topics: Vec<Topic>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_statistics(mut self, statistics: Vec<Statistic>) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_versions(mut self, versions: Vec<Version>) -> Self {
        self.versions = versions;
        self
    }

    pub fn push_statistic(&mut self, statistic: Statistic) {
        self.statistics.push(statistic);
    }

    /// Selects and stores the current version from the versions in source order.
    pub fn derive_current_version(&mut self) {
        self.current_version = select_current_version(&self.versions);
    }

    pub fn id(&self) -> &RepositoryId {
        &self.id
    }

    pub fn identifier(&self) -> &str {
        self.id.as_str()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn statistics(&self) -> &[Statistic] {
        &self.statistics
    }

    pub fn statistic(&self, name: &str) -> Option<&Statistic> {
        self.statistics.iter().find(|s| s.name == name)
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn current_version(&self) -> &Version {
        &self.current_version
    }

    pub fn has_versions(&self) -> bool {
        !self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RepositoryRecord {
        RepositoryRecord::new(
            RepositoryId::parse("github.com/gorilla/websocket").unwrap(),
            Some("A WebSocket implementation for Go.".to_string()),
            Utc::now(),
        )
    }

    #[test]
    fn test_empty_description_is_absent() {
        let repo = RepositoryRecord::new(
            RepositoryId::parse("github.com/a/b").unwrap(),
            Some(String::new()),
            Utc::now(),
        );
        assert_eq!(repo.description(), None);
    }

    #[test]
    fn test_statistic_lookup() {
        let mut repo = record();
        repo.push_statistic(Statistic::new("Stars", 9000, "https://github.com/gorilla/websocket/stargazers"));

        assert_eq!(repo.statistic("Stars").map(Statistic::value), Some(9000));
        assert!(repo.statistic("Forks").is_none());
    }

    #[test]
    fn test_derive_current_version() {
        let mut repo = record().with_versions(vec![Version::tag("v1.2.0"), Version::tag("v1.1.0")]);
        assert!(repo.current_version().is_empty());

        repo.derive_current_version();

        assert_eq!(repo.current_version().name(), "v1.2.0");
        assert_eq!(repo.versions()[1].name(), "v1.1.0");
    }
}
