//! Elasticsearch backend for explorer
//!
//! [`ElasticClient`] implements both capabilities the core consumes:
//!
//! - [`explorer::SearchClient`]: `POST /{index}/_search`
//! - [`explorer::IndexAdapter`]: `GET /{index}`, with a 404 meaning the index
//!   does not exist yet
//!
//! Works against Elasticsearch 7.x/8.x and OpenSearch.

pub mod client;
pub mod config;
pub mod error;
pub mod remote;

pub use client::ElasticClient;
pub use config::ElasticConfig;
pub use error::ElasticError;
