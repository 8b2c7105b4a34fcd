use chrono::{TimeZone, Utc};
use repometa::{
    License, RepositoryId, RepositoryRecord, RepositoryStore, SqliteRepositoryStore, Statistic,
    Topic, Version,
};
use tempfile::tempdir;

fn record(identifier: &str) -> RepositoryRecord {
    let id = RepositoryId::parse(identifier).expect("valid identifier");
    let published = Utc.with_ymd_and_hms(2017, 11, 20, 10, 0, 0).single();

    let mut record = RepositoryRecord::new(
        id,
        Some("Gin is a HTTP web framework written in Go".to_string()),
        Utc.with_ymd_and_hms(2017, 11, 21, 8, 30, 0).single().expect("timestamp"),
    )
    .with_license(Some(License::new(
        "MIT",
        Some("http://choosealicense.com/licenses/mit/".to_string()),
    )))
    .with_topics(vec![
        Topic::new("web", "https://github.com/topics/web"),
        Topic::new("go", "https://github.com/topics/go"),
    ])
    .with_statistics(vec![
        Statistic::new("Stars", 21000, "https://github.com/gin-gonic/gin/stargazers"),
        Statistic::new("Importers", 3869, "https://godoc.org/github.com/gin-gonic/gin?importers"),
    ])
    .with_versions(vec![
        Version::new("v1.2", published),
        Version::new("v1.1.4", None),
    ]);
    record.derive_current_version();
    record
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("repometa.sqlite");
    let original = record("github.com/gin-gonic/gin");

    {
        let store = SqliteRepositoryStore::new(&db_path).expect("sqlite init");
        store.create(&original).await.expect("create");
    }

    let store = SqliteRepositoryStore::new(&db_path).expect("sqlite reopen");
    let id = original.id().clone();
    assert!(store.exists(&id).await.expect("exists"));

    let stored = store.read(&id).await.expect("read");
    assert_eq!(stored.description(), original.description());
    assert_eq!(stored.last_updated(), original.last_updated());
    assert_eq!(stored.license(), original.license());
    assert_eq!(stored.topics(), original.topics());
    assert_eq!(stored.versions(), original.versions());
    assert_eq!(stored.current_version().name(), "v1.2");

    // statistics come back ordered by name
    let names: Vec<&str> = stored.statistics().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Importers", "Stars"]);
}

#[tokio::test]
async fn sqlite_store_keeps_records_independent() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteRepositoryStore::new(&dir.path().join("repometa.sqlite")).expect("sqlite init");

    let gin = record("github.com/gin-gonic/gin");
    let other = RepositoryRecord::new(
        RepositoryId::parse("github.com/go-sql-driver/mysql").expect("valid identifier"),
        None,
        Utc::now(),
    );

    store.create(&gin).await.expect("create gin");
    store.create(&other).await.expect("create mysql");

    let mysql = store.read(other.id()).await.expect("read mysql");
    assert!(mysql.statistics().is_empty());
    assert!(mysql.topics().is_empty());
    assert!(mysql.license().is_none());
    assert!(mysql.current_version().is_empty());

    let missing = RepositoryId::parse("github.com/gorilla/websocket").expect("valid identifier");
    assert!(!store.exists(&missing).await.expect("exists"));
    assert!(store.read(&missing).await.unwrap_err().is_not_found());
}
