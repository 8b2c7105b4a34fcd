mod identifier;
mod repository;
mod source;
mod version;

pub use identifier::*;
pub use repository::*;
pub use source::*;
pub use version::*;
