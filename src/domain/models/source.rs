use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{License, Statistic, Topic, Version};

/// A formal release as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag: String,
    pub is_draft: bool,
    pub is_prerelease: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
}

/// A raw tag ref, used when a repository publishes no formal releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub name: String,
    pub url: String,
}

/// Where the version list of a [`HostingSnapshot`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionSource {
    /// Formal releases, newest first.
    Releases(Vec<Release>),
    /// Raw tag refs in the order the hosting service listed them.
    Tags(Vec<TagRef>),
}

impl VersionSource {
    pub fn to_versions(&self) -> Vec<Version> {
        match self {
            VersionSource::Releases(releases) => releases
                .iter()
                .map(|r| Version::new(r.tag.clone(), r.published_at))
                .collect(),
            VersionSource::Tags(tags) => tags.iter().map(|t| Version::tag(t.name.clone())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VersionSource::Releases(releases) => releases.len(),
            VersionSource::Tags(tags) => tags.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Repository metadata from the hosting service's structured API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingSnapshot {
    pub description: Option<String>,
    pub statistics: Vec<Statistic>,
    pub license: Option<License>,
    pub topics: Vec<Topic>,
    pub versions: VersionSource,
}

/// Package-index facts scraped from the documentation page.
///
/// Fields that the page did not mention stay at zero / `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Number of packages this package imports.
    pub imports: i64,
    /// Number of packages importing this package.
    pub importers: i64,
    pub updated: Option<NaiveDate>,
    /// Page the facts were read from; import deep links hang off it.
    pub page_url: String,
}

impl PackageInfo {
    pub fn imports_url(&self) -> String {
        format!("{}?imports", self.page_url)
    }

    pub fn importers_url(&self) -> String {
        format!("{}?importers", self.page_url)
    }
}
