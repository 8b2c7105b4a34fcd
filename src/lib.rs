pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    merge_sources, GetRepositoryUseCase, HostingProvider, PackageIndexProvider, RepositoryStore,
    VERSION_READ_LIMIT,
};

pub use cli::{Commands, OutputFormat};

pub use connector::{
    Container, ContainerConfig, GitHubClient, GoDocClient, InMemoryRepositoryStore,
    MockHostingProvider, MockPackageIndex, Router, SqliteRepositoryStore,
};

pub use domain::{
    select_current_version, DomainError, HostingSnapshot, License, PackageInfo, Release,
    RepositoryId, RepositoryRecord, Statistic, TagRef, Topic, Version, VersionSource,
};
