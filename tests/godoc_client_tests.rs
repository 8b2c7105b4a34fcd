//! Integration tests for the godoc.org client against a wiremock server

use std::time::Duration;

use repometa::{DomainError, GoDocClient, PackageIndexProvider, RepositoryId};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SARAMA_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>sarama - GoDoc</title></head>
<body>
<div id="x-pkginfo">
<form name="x-refresh" method="POST" action="/-/refresh"><input type="hidden" name="path" value="github.com/Shopify/sarama"></form>
<p>Package sarama imports <a href="?imports">30 packages</a> (<a href="?import-graph">graph</a>) and is imported by <a href="?importers">433 packages</a>.
Updated <span class="timeago" title="2017-11-20T10:00:00Z">2017-11-20</span>.
<a href="javascript:document.getElementsByName('x-refresh')[0].submit();">Refresh now</a>.
<a href="/-/bot">Tools</a> for package owners.</p>
</div>
</body></html>"#;

fn sarama() -> RepositoryId {
    RepositoryId::parse("github.com/Shopify/sarama").expect("valid identifier")
}

#[tokio::test]
async fn test_fetch_parses_package_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/github.com/Shopify/sarama"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SARAMA_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let client = GoDocClient::new(server.uri()).expect("client");
    let info = client.fetch(&sarama()).await.expect("fetch");

    assert_eq!(info.imports, 30);
    assert_eq!(info.importers, 433);
    assert_eq!(info.updated.map(|d| d.to_string()).as_deref(), Some("2017-11-20"));
    assert_eq!(info.page_url, format!("{}/github.com/Shopify/sarama", server.uri()));
    assert_eq!(info.importers_url(), format!("{}/github.com/Shopify/sarama?importers", server.uri()));
}

#[tokio::test]
async fn test_page_without_fragment_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body><p>Hello</p></body></html>"))
        .mount(&server)
        .await;

    let client = GoDocClient::new(server.uri()).expect("client");
    let info = client.fetch(&sarama()).await.expect("fetch");

    assert_eq!((info.imports, info.importers), (0, 0));
    assert!(info.updated.is_none());
}

#[tokio::test]
async fn test_non_ok_status_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = GoDocClient::new(server.uri()).expect("client");
    let err = client.fetch(&sarama()).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_counts_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div id="x-pkginfo"><p>Package foo imports many packages (graph).</p></div>"#,
        ))
        .mount(&server)
        .await;

    let client = GoDocClient::new(server.uri()).expect("client");
    let err = client.fetch(&sarama()).await.unwrap_err();
    assert!(matches!(err, DomainError::MalformedUpstreamData(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_page_times_out_as_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SARAMA_PAGE)
                .set_delay(Duration::from_secs(7)),
        )
        .mount(&server)
        .await;

    let client = GoDocClient::new(server.uri()).expect("client");
    let err = client.fetch(&sarama()).await.unwrap_err();
    assert!(matches!(err, DomainError::UpstreamUnavailable(_)), "got {:?}", err);
}
