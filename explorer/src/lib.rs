//! Structured search requests for Elasticsearch-compatible backends
//!
//! This crate compiles an abstract query model into a Query DSL request
//! document, runs it through a pluggable backend client and decodes the raw
//! response into typed hits and a flat, ordered list of aggregation results.
//!
//! It also detects drift between the index configuration an application
//! declares and the one actually present on the backend, so provisioning
//! tools know when an index must be rebuilt.
//!
//! # Query DSL Support
//!
//! Compiled clauses:
//! - `bool` (must, should, filter)
//! - `match` / `match_phrase` / `multi_match`
//! - `term` / `terms`
//! - `range` / `exists` / `wildcard` / `regexp`
//! - `query_string` / `nested`
//!
//! Compiled aggregations:
//! - `terms`
//! - `avg` / `sum` / `min` / `max` / `cardinality` / `value_count` / `stats`
//! - `nested` and filtered `nested`

pub mod command;
pub mod error;
pub mod finder;
pub mod index;
pub mod query;
pub mod response;

pub use command::{SearchCommand, SearchCommandBuilder, SearchCommandSource};
pub use error::{BackendError, Error};
pub use finder::{Finder, SearchClient};
pub use index::{IndexAdapter, IndexChangedChecker, IndexConfiguration};
pub use query::{AggregationDefinition, BoolQuery, Clause, Query, QueryCompiler, Sort};
pub use response::{AggregationResult, ResultDecoder, SearchResult};

/// Result type for explorer operations
pub type Result<T> = std::result::Result<T, Error>;
