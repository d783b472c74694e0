//! HTTP client for the backend REST API

use crate::config::ElasticConfig;
use crate::error::{malformed, transport, ElasticError};
use crate::remote::remote_configuration;
use async_trait::async_trait;
use explorer::{BackendError, IndexAdapter, IndexConfiguration, SearchClient};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Backend client over HTTP
#[derive(Debug, Clone)]
pub struct ElasticClient {
    http: Client,
    base_url: Url,
}

impl ElasticClient {
    pub fn new(config: &ElasticConfig) -> Result<Self, ElasticError> {
        let base_url = Url::parse(&config.url)?;
        if base_url.cannot_be_a_base() {
            return Err(ElasticError::NotABase(config.url.clone()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl SearchClient for ElasticClient {
    async fn search(&self, index: &str, body: &Value) -> Result<Value, BackendError> {
        let url = self.endpoint(&[index, "_search"]);
        tracing::debug!(url = %url, "POST search");

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        read_json(response).await
    }
}

#[async_trait]
impl IndexAdapter for ElasticClient {
    async fn get_remote_configuration(
        &self,
        desired: &IndexConfiguration,
    ) -> Result<Option<IndexConfiguration>, BackendError> {
        let url = self.endpoint(&[desired.name.as_str()]);
        tracing::debug!(url = %url, "GET index configuration");

        let response = self.http.get(url).send().await.map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = read_json(response).await?;
        remote_configuration(&desired.name, document).map(Some)
    }
}

async fn read_json(response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let reason = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Backend request failed");
        return Err(BackendError::Status {
            status: status.as_u16(),
            reason,
        });
    }

    response.json::<Value>().await.map_err(malformed)
}
