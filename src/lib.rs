// Library exports for Shelfmark
// This allows integration tests and the binary to share the same modules

pub mod articles;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod ids;
pub mod kinds;
pub mod pagination;
pub mod reviews;
pub mod routes;
pub mod state;
pub mod store;
