//! Search execution: compile, call the backend once, decode

use crate::command::SearchCommandSource;
use crate::error::BackendError;
use crate::query::compiler::require_index;
use crate::query::QueryCompiler;
use crate::response::{ResultDecoder, SearchResult};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Executes a request document against an index
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run one search. Retries, if any, are the implementation's business.
    async fn search(&self, index: &str, body: &Value) -> std::result::Result<Value, BackendError>;
}

#[async_trait]
impl<T: SearchClient + ?Sized> SearchClient for Arc<T> {
    async fn search(&self, index: &str, body: &Value) -> std::result::Result<Value, BackendError> {
        (**self).search(index, body).await
    }
}

/// Entry point for running searches
pub struct Finder<C> {
    client: C,
}

impl<C: SearchClient> Finder<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run a search command.
    ///
    /// Fails with [`crate::Error::InvalidArgument`] before touching the
    /// backend when the command has no index. Backend errors are returned
    /// as-is.
    pub async fn find<S>(&self, command: &S) -> Result<SearchResult>
    where
        S: SearchCommandSource + Sync + ?Sized,
    {
        let index = require_index(command)?;
        let query = command.query();
        let body = QueryCompiler::compile_query(&query);

        tracing::debug!(index = %index, "Executing search");

        let response = self.client.search(index, &body).await?;
        ResultDecoder::decode(response, &query.aggregations)
    }
}
