use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::application::HostingProvider;
use crate::domain::{
    DomainError, HostingSnapshot, License, Release, RepositoryId, Statistic, TagRef, Topic,
    VersionSource,
};

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const USER_AGENT: &str = "repometa";

const REPOSITORY_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    description
    forks { totalCount }
    stargazers { totalCount }
    watchers { totalCount }
    issues { totalCount }
    pullRequests { totalCount }
    repositoryTopics(first: 100) { edges { node { topic { name } url } } }
    licenseInfo { name spdxId url }
    releases(first: 100, orderBy: {field: CREATED_AT, direction: DESC}) {
      edges { node { isDraft isPrerelease publishedAt url tag { name } } }
    }
    refs(refPrefix: "refs/tags/", first: 100) { edges { node { name } } }
  }
}
"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<QueryData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    description: Option<String>,
    forks: Count,
    stargazers: Count,
    watchers: Count,
    issues: Count,
    pull_requests: Count,
    repository_topics: Connection<TopicNode>,
    license_info: Option<LicenseNode>,
    releases: Connection<ReleaseNode>,
    refs: Option<Connection<RefNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Count {
    total_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: Deserialize<'de>")]
struct Connection<T> {
    #[serde(default)]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
struct TopicNode {
    topic: TopicName,
    url: String,
}

#[derive(Debug, Deserialize)]
struct TopicName {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LicenseNode {
    name: Option<String>,
    spdx_id: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseNode {
    is_draft: bool,
    is_prerelease: bool,
    published_at: Option<DateTime<Utc>>,
    url: String,
    tag: Option<RefNode>,
}

#[derive(Debug, Deserialize)]
struct RefNode {
    name: String,
}

/// GitHub GraphQL client, the structured metadata provider.
///
/// Configured from the environment with [`GitHubClient::from_env`]:
///
/// | Variable             | Default                          |
/// |----------------------|----------------------------------|
/// | `GITHUB_TOKEN`       | `""` (unauthenticated)           |
/// | `GITHUB_GRAPHQL_URL` | `https://api.github.com/graphql` |
pub struct GitHubClient {
    client: reqwest::Client,
    url: String,
}

impl GitHubClient {
    pub fn new(token: &str, url: impl Into<String>) -> Result<Self, DomainError> {
        let mut headers = HeaderMap::new();
        if !token.is_empty() {
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| DomainError::internal(format!("Invalid GitHub token: {}", e)))?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_env() -> Result<Self, DomainError> {
        let token = std::env::var("GITHUB_TOKEN").unwrap_or_default();
        let url = std::env::var("GITHUB_GRAPHQL_URL").unwrap_or_else(|_| DEFAULT_GRAPHQL_URL.to_string());
        if token.is_empty() {
            warn!("GITHUB_TOKEN is not set; GitHub requests will likely be rejected");
        }
        Self::new(&token, url)
    }
}

#[async_trait]
impl HostingProvider for GitHubClient {
    async fn fetch(&self, id: &RepositoryId) -> Result<HostingSnapshot, DomainError> {
        let request = GraphQlRequest {
            query: REPOSITORY_QUERY,
            variables: json!({ "owner": id.owner(), "name": id.name() }),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("GitHub request for {} failed: {}", id, e)))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(DomainError::upstream(format!(
                "GitHub rejected the request for {} with {}",
                id, status
            )));
        }
        if !status.is_success() {
            return Err(DomainError::upstream(format!(
                "GitHub returned {} for {}",
                status, id
            )));
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| {
            DomainError::malformed(format!("Failed to decode GitHub response for {}: {}", id, e))
        })?;

        debug!("GitHub answered for {}", id);
        snapshot_from_response(id, body)
    }
}

fn snapshot_from_response(
    id: &RepositoryId,
    response: GraphQlResponse,
) -> Result<HostingSnapshot, DomainError> {
    if response
        .errors
        .iter()
        .any(|e| e.kind.as_deref() == Some("NOT_FOUND"))
    {
        return Err(DomainError::not_found(format!("GitHub has no repository {}", id)));
    }

    let repository = match response.data.and_then(|d| d.repository) {
        Some(repository) => repository,
        None if response.errors.is_empty() => {
            return Err(DomainError::not_found(format!("GitHub has no repository {}", id)));
        }
        None => {
            let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(DomainError::upstream(format!(
                "GitHub query for {} failed: {}",
                id,
                messages.join("; ")
            )));
        }
    };

    let statistics = vec![
        Statistic::new("Forks", repository.forks.total_count, id.web_url("network")),
        Statistic::new("Issues", repository.issues.total_count, id.web_url("issues")),
        Statistic::new(
            "PullRequests",
            repository.pull_requests.total_count,
            id.web_url("pulls"),
        ),
        Statistic::new("Stars", repository.stargazers.total_count, id.web_url("stargazers")),
        Statistic::new("Watchers", repository.watchers.total_count, id.web_url("watchers")),
    ];

    let topics = repository
        .repository_topics
        .edges
        .into_iter()
        .map(|e| Topic::new(e.node.topic.name, e.node.url))
        .collect();

    let license = repository.license_info.and_then(|l| {
        let name = l.spdx_id.filter(|s| !s.is_empty()).or(l.name)?;
        Some(License::new(name, l.url))
    });

    let releases: Vec<Release> = repository
        .releases
        .edges
        .into_iter()
        .filter_map(|e| {
            let node = e.node;
            let tag = node.tag?;
            Some(Release {
                tag: tag.name,
                is_draft: node.is_draft,
                is_prerelease: node.is_prerelease,
                published_at: node.published_at,
                url: node.url,
            })
        })
        .collect();

    let versions = if releases.is_empty() {
        let tags = repository
            .refs
            .map(|r| r.edges)
            .unwrap_or_default()
            .into_iter()
            .map(|e| TagRef {
                url: id.web_url(&format!("releases/tag/{}", e.node.name)),
                name: e.node.name,
            })
            .collect();
        VersionSource::Tags(tags)
    } else {
        VersionSource::Releases(releases)
    };

    Ok(HostingSnapshot {
        description: repository.description.filter(|d| !d.is_empty()),
        statistics,
        license,
        topics,
        versions,
    })
}
