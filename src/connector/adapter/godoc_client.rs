use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::application::PackageIndexProvider;
use crate::domain::{DomainError, PackageInfo, RepositoryId};

pub const DEFAULT_BASE_URL: &str = "https://godoc.org";
const USER_AGENT: &str = "repometa";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

static PKGINFO_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\sid\s*=\s*["']x-pkginfo["'][^>]*>"#).expect("invalid regex")
});
static ELEMENT_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)([a-z][a-z0-9]*)\b[^>]*>").expect("invalid regex"));
static PARAGRAPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p\s*>").expect("invalid regex"));
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("invalid regex"));
static IMPORTS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bimports (\S+) packages?\b(?:.*?\bimported by (\S+) packages?\b)?").expect("invalid regex")
});
static UPDATED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bUpdated (\d+-\d+-\d+)\.?(?:\s|$)").expect("invalid regex"));

/// Client for the godoc.org package pages, the scraped metadata provider.
///
/// The base URL is read from `GODOC_BASE_URL` by [`GoDocClient::from_env`]
/// and defaults to `https://godoc.org`.
pub struct GoDocClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoDocClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        let base: String = base_url.into();
        Ok(Self {
            client,
            base_url: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self, DomainError> {
        let base = std::env::var("GODOC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base)
    }

    fn page_url(&self, id: &RepositoryId) -> Result<Url, DomainError> {
        Url::parse(&format!("{}/{}", self.base_url, id.as_str()))
            .map_err(|e| DomainError::invalid_identifier(format!("Cannot build page URL for {}: {}", id, e)))
    }
}

#[async_trait]
impl PackageIndexProvider for GoDocClient {
    async fn fetch(&self, id: &RepositoryId) -> Result<PackageInfo, DomainError> {
        let url = self.page_url(id)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("godoc request for {} failed: {}", id, e)))?;

        if response.status() != StatusCode::OK {
            return Err(DomainError::not_found(format!(
                "godoc returned {} for {}",
                response.status(),
                id
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::upstream(format!("Failed to read godoc page for {}: {}", id, e)))?;

        let mut info = match extract_pkginfo_fragment(&body) {
            Some(fragment) => parse_pkginfo(&fragment)?,
            None => {
                debug!("godoc page for {} has no package info", id);
                PackageInfo::default()
            }
        };
        info.page_url = url.to_string();

        Ok(info)
    }
}

/// Returns the text of the first paragraph in the `x-pkginfo` element,
/// with markup removed and line breaks preserved.
pub fn extract_pkginfo_fragment(html: &str) -> Option<String> {
    let body = pkginfo_element_body(html)?;
    let inner = PARAGRAPH_REGEX.captures(body)?.get(1)?.as_str();
    let text = decode_entities(&TAG_REGEX.replace_all(inner, ""));

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    Some(lines.join("\n"))
}

/// Body of the `x-pkginfo` element, up to its matching close tag.
fn pkginfo_element_body(html: &str) -> Option<&str> {
    let open = PKGINFO_OPEN_REGEX.captures(html)?;
    let tag = open.get(1)?.as_str();
    let start = open.get(0)?.end();
    let rest = &html[start..];

    let mut depth = 1usize;
    for caps in ELEMENT_TAG_REGEX.captures_iter(rest) {
        if !caps[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        if caps[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(&rest[..caps.get(0)?.start()]);
            }
        }
    }

    // unterminated element
    None
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Extracts import counts and the last-updated date from package info text.
///
/// Each line is tested against both patterns. Patterns that never match
/// leave their fields at zero / `None`, but a matched pattern whose captured
/// value does not parse is an error.
pub fn parse_pkginfo(text: &str) -> Result<PackageInfo, DomainError> {
    let mut info = PackageInfo::default();

    for line in text.lines() {
        if let Some(caps) = IMPORTS_REGEX.captures(line) {
            info.imports = parse_count(&caps[1])?;
            if let Some(importers) = caps.get(2) {
                info.importers = parse_count(importers.as_str())?;
            }
        }

        if let Some(caps) = UPDATED_REGEX.captures(line) {
            let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").map_err(|e| {
                DomainError::malformed(format!("invalid updated date '{}': {}", &caps[1], e))
            })?;
            info.updated = Some(date);
        }
    }

    Ok(info)
}

fn parse_count(raw: &str) -> Result<i64, DomainError> {
    raw.parse::<i64>()
        .map_err(|e| DomainError::malformed(format!("invalid package count '{}': {}", raw, e)))
}
