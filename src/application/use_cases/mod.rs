mod get_repository;
mod merge_sources;

pub use get_repository::*;
pub use merge_sources::*;
