use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tagged release of a repository.
///
/// `published` is `None` for versions that came from raw tag refs rather
/// than formal releases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    name: String,
    published: Option<DateTime<Utc>>,
}

impl Version {
    pub fn new(name: impl Into<String>, published: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            published,
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    /// True for the zero value returned when a repository has no versions.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.published.is_none()
    }
}

/// Picks the version shown as "current" from versions in source order.
///
/// When the first entry has no timestamp the source order is the only
/// ordering signal available, so the first entry wins. Otherwise the most
/// recently published entry wins; equal timestamps keep source order.
/// The input slice is never reordered.
pub fn select_current_version(versions: &[Version]) -> Version {
    let Some(first) = versions.first() else {
        return Version::default();
    };

    if first.published.is_none() {
        return first.clone();
    }

    let mut by_recency = versions.to_vec();
    // sort_by is stable; untimestamped entries sort as oldest
    by_recency.sort_by(|a, b| b.published.cmp(&a.published));
    by_recency.swap_remove(0)
}
