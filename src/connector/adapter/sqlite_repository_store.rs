use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::{RepositoryStore, VERSION_READ_LIMIT};
use crate::domain::{
    DomainError, License, RepositoryId, RepositoryRecord, Statistic, Topic, Version,
};

pub struct SqliteRepositoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepositoryStore {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path).map_err(|e| {
            DomainError::store_unavailable(format!("Failed to open database: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::store_unavailable(format!("Failed to create in-memory database: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS repositories (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL UNIQUE,
                description TEXT,
                updated TEXT NOT NULL,
                license_name TEXT,
                license_url TEXT,
                current_version TEXT,
                current_published TEXT
            );

            CREATE TABLE IF NOT EXISTS statistics (
                repository_id TEXT NOT NULL,
                name TEXT NOT NULL,
                value INTEGER NOT NULL,
                url TEXT NOT NULL,
                FOREIGN KEY (repository_id) REFERENCES repositories(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS versions (
                repository_id TEXT NOT NULL,
                name TEXT NOT NULL,
                sort_order INTEGER NOT NULL,
                published TEXT,
                FOREIGN KEY (repository_id) REFERENCES repositories(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS topics (
                repository_id TEXT NOT NULL,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                sort_order INTEGER NOT NULL,
                FOREIGN KEY (repository_id) REFERENCES repositories(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_statistics_repository ON statistics(repository_id);
            CREATE INDEX IF NOT EXISTS idx_versions_repository ON versions(repository_id, sort_order);
            CREATE INDEX IF NOT EXISTS idx_topics_repository ON topics(repository_id, sort_order);
            "#,
        )
        .map_err(|e| DomainError::store_unavailable(format!("Failed to initialize schema: {}", e)))?;

        debug!("SQLite repository schema initialized");
        Ok(())
    }

    fn read_statistics(conn: &Connection, row_id: &str) -> Result<Vec<Statistic>, DomainError> {
        let mut stmt = conn
            .prepare(
                "SELECT name, value, url FROM statistics WHERE repository_id = ?1 ORDER BY name ASC",
            )
            .map_err(|e| DomainError::store_unavailable(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![row_id], |row| {
                Ok(Statistic::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| {
                DomainError::store_unavailable(format!("Failed to fetch repository statistics: {}", e))
            })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(|e| {
            DomainError::store_unavailable(format!("Failed to scan repository statistic: {}", e))
        })
    }

    fn read_versions(conn: &Connection, row_id: &str) -> Result<Vec<Version>, DomainError> {
        let mut stmt = conn
            .prepare(
                "SELECT name, published FROM versions WHERE repository_id = ?1 ORDER BY sort_order ASC LIMIT ?2",
            )
            .map_err(|e| DomainError::store_unavailable(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![row_id, VERSION_READ_LIMIT as i64], |row| {
                Ok(Version::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<DateTime<Utc>>>(1)?,
                ))
            })
            .map_err(|e| {
                DomainError::store_unavailable(format!("Failed to fetch repository versions: {}", e))
            })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(|e| {
            DomainError::store_unavailable(format!("Failed to scan repository version: {}", e))
        })
    }

    fn read_topics(conn: &Connection, row_id: &str) -> Result<Vec<Topic>, DomainError> {
        let mut stmt = conn
            .prepare("SELECT name, url FROM topics WHERE repository_id = ?1 ORDER BY sort_order ASC")
            .map_err(|e| DomainError::store_unavailable(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![row_id], |row| {
                Ok(Topic::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| {
                DomainError::store_unavailable(format!("Failed to fetch repository topics: {}", e))
            })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(|e| {
            DomainError::store_unavailable(format!("Failed to scan repository topic: {}", e))
        })
    }
}

/// A second insert of an already stored url trips the UNIQUE constraint.
fn is_duplicate_key(error: &rusqlite::Error) -> bool {
    match error {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

struct RepositoryRow {
    id: String,
    description: Option<String>,
    updated: DateTime<Utc>,
    license_name: Option<String>,
    license_url: Option<String>,
    current_version: Option<String>,
    current_published: Option<DateTime<Utc>>,
}

#[async_trait]
impl RepositoryStore for SqliteRepositoryStore {
    async fn exists(&self, id: &RepositoryId) -> Result<bool, DomainError> {
        let conn = self.conn.lock().await;

        conn.query_row(
            "SELECT 1 FROM repositories WHERE url = ?1 LIMIT 1",
            params![id.as_str()],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| {
            DomainError::store_unavailable(format!("Failed to check repository {}: {}", id, e))
        })
    }

    async fn read(&self, id: &RepositoryId) -> Result<RepositoryRecord, DomainError> {
        let conn = self.conn.lock().await;

        let row = conn
            .query_row(
                "SELECT id, description, updated, license_name, license_url, current_version, current_published \
                 FROM repositories WHERE url = ?1 LIMIT 1",
                params![id.as_str()],
                |row| {
                    Ok(RepositoryRow {
                        id: row.get(0)?,
                        description: row.get(1)?,
                        updated: row.get(2)?,
                        license_name: row.get(3)?,
                        license_url: row.get(4)?,
                        current_version: row.get(5)?,
                        current_published: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(|e| {
                DomainError::store_unavailable(format!("Failed to query repository {}: {}", id, e))
            })?
            .ok_or_else(|| DomainError::not_found(format!("Repository not stored: {}", id)))?;

        let statistics = Self::read_statistics(&conn, &row.id)?;
        let versions = Self::read_versions(&conn, &row.id)?;
        let topics = Self::read_topics(&conn, &row.id)?;

        let license = row.license_name.map(|name| License::new(name, row.license_url));
        let current_version = Version::new(row.current_version.unwrap_or_default(), row.current_published);

        Ok(RepositoryRecord::reconstitute(
            id.clone(),
            row.description,
            row.updated,
            license,
            topics,
            statistics,
            versions,
            current_version,
        ))
    }

    async fn create(&self, record: &RepositoryRecord) -> Result<(), DomainError> {
        let mut conn = self.conn.lock().await;
        let row_id = Uuid::new_v4().to_string();

        // dropping the transaction without commit rolls every row back
        let tx = conn.transaction().map_err(|e| {
            DomainError::store_write(format!("Failed to create transaction: {}", e))
        })?;

        let current = record.current_version();
        let (current_name, current_published) = if current.is_empty() {
            (None, None)
        } else {
            (Some(current.name()), current.published())
        };

        tx.execute(
            r#"INSERT INTO repositories (id, url, description, updated, license_name, license_url, current_version, current_published)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                row_id,
                record.identifier(),
                record.description(),
                record.last_updated(),
                record.license().map(License::name),
                record.license().and_then(License::url),
                current_name,
                current_published,
            ],
        )
        .map_err(|e| {
            if is_duplicate_key(&e) {
                DomainError::already_exists(format!("Repository already stored: {}", record.id()))
            } else {
                DomainError::store_write(format!("Failed to insert repository {}: {}", record.id(), e))
            }
        })?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO statistics (repository_id, name, value, url) VALUES (?1, ?2, ?3, ?4)")
                .map_err(|e| {
                    DomainError::store_write(format!("Failed to prepare the inserting statistics query: {}", e))
                })?;
            for stat in record.statistics() {
                stmt.execute(params![row_id, stat.name(), stat.value(), stat.url()])
                    .map_err(|e| {
                        DomainError::store_write(format!("Failed to insert repository statistic: {}", e))
                    })?;
            }
        }

        {
            let mut stmt = tx
                .prepare("INSERT INTO versions (repository_id, name, sort_order, published) VALUES (?1, ?2, ?3, ?4)")
                .map_err(|e| {
                    DomainError::store_write(format!("Failed to prepare the inserting versions query: {}", e))
                })?;
            for (i, version) in record.versions().iter().enumerate() {
                stmt.execute(params![row_id, version.name(), i as i64, version.published()])
                    .map_err(|e| {
                        DomainError::store_write(format!("Failed to insert repository version: {}", e))
                    })?;
            }
        }

        {
            let mut stmt = tx
                .prepare("INSERT INTO topics (repository_id, name, url, sort_order) VALUES (?1, ?2, ?3, ?4)")
                .map_err(|e| {
                    DomainError::store_write(format!("Failed to prepare the inserting topics query: {}", e))
                })?;
            for (i, topic) in record.topics().iter().enumerate() {
                stmt.execute(params![row_id, topic.name(), topic.url(), i as i64])
                    .map_err(|e| {
                        DomainError::store_write(format!("Failed to insert repository topic: {}", e))
                    })?;
            }
        }

        tx.commit()
            .map_err(|e| DomainError::store_write(format!("Failed to commit transaction: {}", e)))?;

        debug!("Stored {} as {}", record.id(), row_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> RepositoryRecord {
        let id = RepositoryId::parse("github.com/go-sql-driver/mysql").unwrap();
        let mut record = RepositoryRecord::new(
            id,
            Some("Go MySQL Driver".to_string()),
            Utc.with_ymd_and_hms(2017, 11, 17, 9, 30, 0).unwrap(),
        )
        .with_license(Some(License::new("MPL-2.0", Some("https://api.github.com/licenses/mpl-2.0".to_string()))))
        .with_topics(vec![
            Topic::new("mysql", "https://github.com/topics/mysql"),
            Topic::new("go", "https://github.com/topics/go"),
        ])
        .with_statistics(vec![
            Statistic::new("Watchers", 300, "https://github.com/go-sql-driver/mysql/watchers"),
            Statistic::new("Forks", 1500, "https://github.com/go-sql-driver/mysql/network"),
        ])
        .with_versions(vec![
            Version::new("v1.3", Some(Utc.with_ymd_and_hms(2016, 12, 1, 0, 0, 0).unwrap())),
            Version::new("v1.2", Some(Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap())),
            Version::tag("v1.1"),
        ]);
        record.derive_current_version();
        record
    }

    #[tokio::test]
    async fn test_create_then_read_round_trip() {
        let store = SqliteRepositoryStore::in_memory().unwrap();
        let record = sample();

        assert!(!store.exists(record.id()).await.unwrap());
        store.create(&record).await.unwrap();
        assert!(store.exists(record.id()).await.unwrap());

        let stored = store.read(record.id()).await.unwrap();
        assert_eq!(stored.identifier(), record.identifier());
        assert_eq!(stored.description(), record.description());
        assert_eq!(stored.last_updated(), record.last_updated());
        assert_eq!(stored.license(), record.license());
        assert_eq!(stored.topics(), record.topics());
        assert_eq!(stored.versions(), record.versions());
        assert_eq!(stored.current_version().name(), "v1.3");

        // statistics come back ordered by name
        let names: Vec<&str> = stored.statistics().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Forks", "Watchers"]);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let store = SqliteRepositoryStore::in_memory().unwrap();
        let id = RepositoryId::parse("github.com/nobody/nothing").unwrap();

        let err = store.read(&id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_create_is_tagged_conflict() {
        let store = SqliteRepositoryStore::in_memory().unwrap();
        let record = sample();

        store.create(&record).await.unwrap();
        let err = store.create(&record).await.unwrap_err();

        assert!(err.is_already_exists(), "unexpected error: {:?}", err);
        // the failed write left the first record untouched
        let stored = store.read(record.id()).await.unwrap();
        assert_eq!(stored.statistics().len(), 2);
        assert_eq!(stored.versions().len(), 3);
    }

    #[tokio::test]
    async fn test_versions_are_capped_on_read() {
        let store = SqliteRepositoryStore::in_memory().unwrap();
        let id = RepositoryId::parse("github.com/many/tags").unwrap();
        let versions: Vec<Version> = (0..40).map(|i| Version::tag(format!("v0.{}", i))).collect();
        let mut record = RepositoryRecord::new(id.clone(), None, Utc::now()).with_versions(versions);
        record.derive_current_version();

        store.create(&record).await.unwrap();
        let stored = store.read(&id).await.unwrap();

        assert_eq!(stored.versions().len(), VERSION_READ_LIMIT);
        assert_eq!(stored.versions()[0].name(), "v0.0");
        assert_eq!(stored.versions()[24].name(), "v0.24");
    }

    #[tokio::test]
    async fn test_record_without_versions_has_zero_current_version() {
        let store = SqliteRepositoryStore::in_memory().unwrap();
        let id = RepositoryId::parse("github.com/no/releases").unwrap();
        let record = RepositoryRecord::new(id.clone(), None, Utc::now());

        store.create(&record).await.unwrap();
        let stored = store.read(&id).await.unwrap();

        assert!(stored.current_version().is_empty());
        assert_eq!(stored.description(), None);
        assert!(stored.license().is_none());
    }
}
