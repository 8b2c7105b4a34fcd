//! # Connector Layer
//!
//! External integrations implementing the application ports:
//! - Hosting metadata (GitHub GraphQL API)
//! - Package index scraping (godoc.org)
//! - Storage (SQLite, or in-memory for throwaway runs)
//!
//! The `api` module wires these together for the command line.

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
