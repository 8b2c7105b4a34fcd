mod github_client;
mod godoc_client;
mod in_memory_repository_store;
mod mock_hosting_provider;
mod mock_package_index;
mod sqlite_repository_store;

pub use github_client::*;
pub use godoc_client::*;
pub use in_memory_repository_store::*;
pub use mock_hosting_provider::*;
pub use mock_package_index::*;
pub use sqlite_repository_store::*;
