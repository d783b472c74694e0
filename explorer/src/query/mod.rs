//! Query model and compiler
//!
//! The model is plain data; [`QueryCompiler`] turns it into a Query DSL
//! request document.

pub mod aggregation;
pub mod compiler;
pub mod types;

pub use aggregation::{AggregationDefinition, Aggregations, MetricKind};
pub use compiler::{QueryCompiler, SearchRequest};
pub use types::*;
