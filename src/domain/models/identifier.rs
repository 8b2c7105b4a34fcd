use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Canonical repository identifier of the form `host/owner/name`.
///
/// The identifier is the only lookup key for a record and is never
/// rewritten once parsed, so [`RepositoryId::as_str`] returns exactly
/// what the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId {
    raw: String,
    owner_start: usize,
    name_start: usize,
}

impl RepositoryId {
    pub fn parse(identifier: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = identifier.split('/').collect();
        if parts.len() != 3 {
            return Err(DomainError::invalid_identifier(format!(
                "expected host/owner/name, got '{}'",
                identifier
            )));
        }

        for part in &parts {
            if part.is_empty() {
                return Err(DomainError::invalid_identifier(format!(
                    "empty path component in '{}'",
                    identifier
                )));
            }
            if *part == "." || *part == ".." {
                return Err(DomainError::invalid_identifier(format!(
                    "relative path component in '{}'",
                    identifier
                )));
            }
            if part.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(DomainError::invalid_identifier(format!(
                    "whitespace in '{}'",
                    identifier
                )));
            }
        }

        let owner_start = parts[0].len() + 1;
        let name_start = owner_start + parts[1].len() + 1;

        Ok(Self {
            raw: identifier.to_string(),
            owner_start,
            name_start,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.raw[..self.owner_start - 1]
    }

    pub fn owner(&self) -> &str {
        &self.raw[self.owner_start..self.name_start - 1]
    }

    pub fn name(&self) -> &str {
        &self.raw[self.name_start..]
    }

    /// Deep link into the hosting service, e.g. `https://github.com/o/n/issues`.
    pub fn web_url(&self, suffix: &str) -> String {
        let base = format!("https://{}/{}/{}", self.host(), self.owner(), self.name());
        if suffix.is_empty() {
            base
        } else {
            format!("{}/{}", base, suffix.trim_start_matches('/'))
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RepositoryId> for String {
    fn from(value: RepositoryId) -> Self {
        value.raw
    }
}
