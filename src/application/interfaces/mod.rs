mod hosting_provider;
mod package_index_provider;
mod repository_store;

pub use hosting_provider::*;
pub use package_index_provider::*;
pub use repository_store::*;
