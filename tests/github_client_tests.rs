//! Integration tests for the GitHub GraphQL client against a wiremock server

use repometa::{DomainError, GitHubClient, HostingProvider, RepositoryId, VersionSource};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sarama() -> RepositoryId {
    RepositoryId::parse("github.com/Shopify/sarama").expect("valid identifier")
}

fn repository_body() -> serde_json::Value {
    json!({
        "data": {
            "repository": {
                "description": "Sarama is a Go library for Apache Kafka.",
                "forks": { "totalCount": 812 },
                "stargazers": { "totalCount": 4127 },
                "watchers": { "totalCount": 190 },
                "issues": { "totalCount": 640 },
                "pullRequests": { "totalCount": 420 },
                "repositoryTopics": { "edges": [
                    { "node": { "topic": { "name": "kafka" }, "url": "https://github.com/topics/kafka" } }
                ] },
                "licenseInfo": { "name": "MIT License", "spdxId": "MIT", "url": "http://choosealicense.com/licenses/mit/" },
                "releases": { "edges": [
                    { "node": { "isDraft": false, "isPrerelease": false, "publishedAt": "2017-11-20T10:00:00Z",
                                "url": "https://github.com/Shopify/sarama/releases/tag/v1.14.0", "tag": { "name": "v1.14.0" } } },
                    { "node": { "isDraft": false, "isPrerelease": false, "publishedAt": "2017-10-02T09:00:00Z",
                                "url": "https://github.com/Shopify/sarama/releases/tag/v1.13.0", "tag": { "name": "v1.13.0" } } }
                ] },
                "refs": { "edges": [] }
            }
        }
    })
}

async fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new("test-token", format!("{}/graphql", server.uri())).expect("client")
}

#[tokio::test]
async fn test_fetch_maps_repository() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({ "variables": { "owner": "Shopify", "name": "sarama" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_body()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server).await.fetch(&sarama()).await.expect("fetch");

    assert_eq!(
        snapshot.description.as_deref(),
        Some("Sarama is a Go library for Apache Kafka.")
    );
    let stars = snapshot
        .statistics
        .iter()
        .find(|s| s.name() == "Stars")
        .expect("stars statistic");
    assert_eq!(stars.value(), 4127);
    assert_eq!(stars.url(), "https://github.com/Shopify/sarama/stargazers");
    assert_eq!(snapshot.license.as_ref().map(|l| l.name()), Some("MIT"));
    assert_eq!(snapshot.topics.len(), 1);

    match snapshot.versions {
        VersionSource::Releases(releases) => {
            assert_eq!(releases.len(), 2);
            assert_eq!(releases[0].tag, "v1.14.0");
        }
        other => panic!("expected releases, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_error_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repository": null },
            "errors": [{ "type": "NOT_FOUND", "message": "Could not resolve to a Repository" }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch(&sarama()).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_unauthorized_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch(&sarama()).await.unwrap_err();
    assert!(matches!(err, DomainError::UpstreamUnavailable(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_server_error_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch(&sarama()).await.unwrap_err();
    assert!(matches!(err, DomainError::UpstreamUnavailable(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_undecodable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch(&sarama()).await.unwrap_err();
    assert!(matches!(err, DomainError::MalformedUpstreamData(_)), "got {:?}", err);
}
