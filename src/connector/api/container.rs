use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::application::{GetRepositoryUseCase, HostingProvider, PackageIndexProvider, RepositoryStore};
use crate::connector::adapter::{
    GitHubClient, GoDocClient, InMemoryRepositoryStore, MockHostingProvider, MockPackageIndex,
    SqliteRepositoryStore,
};

pub const DATABASE_FILE: &str = "repometa.sqlite";

pub struct ContainerConfig {
    pub data_dir: String,
    /// Keep records in process memory instead of `<data_dir>/repometa.sqlite`.
    pub memory_storage: bool,
    /// Use deterministic offline providers instead of GitHub and godoc.org.
    pub mock_providers: bool,
}

pub struct Container {
    store: Arc<dyn RepositoryStore>,
    hosting: Arc<dyn HostingProvider>,
    package_index: Arc<dyn PackageIndexProvider>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let store: Arc<dyn RepositoryStore> = if config.memory_storage {
            debug!("Using in-memory repository store");
            Arc::new(InMemoryRepositoryStore::new())
        } else {
            let db_path = PathBuf::from(&config.data_dir).join(DATABASE_FILE);
            debug!("Using SQLite repository store at {:?}", db_path);
            Arc::new(SqliteRepositoryStore::new(&db_path)?)
        };

        let (hosting, package_index): (Arc<dyn HostingProvider>, Arc<dyn PackageIndexProvider>) =
            if config.mock_providers {
                debug!("Using mock metadata providers");
                (Arc::new(MockHostingProvider::new()), Arc::new(MockPackageIndex::new()))
            } else {
                (Arc::new(GitHubClient::from_env()?), Arc::new(GoDocClient::from_env()?))
            };

        Ok(Self::with_components(config, store, hosting, package_index))
    }

    /// Builds a container around already constructed adapters.
    pub fn with_components(
        config: ContainerConfig,
        store: Arc<dyn RepositoryStore>,
        hosting: Arc<dyn HostingProvider>,
        package_index: Arc<dyn PackageIndexProvider>,
    ) -> Self {
        Self {
            store,
            hosting,
            package_index,
            config,
        }
    }

    pub fn get_repository_use_case(&self) -> GetRepositoryUseCase {
        GetRepositoryUseCase::new(
            self.store.clone(),
            self.hosting.clone(),
            self.package_index.clone(),
        )
    }

    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }
}
