//! Decides whether an index on the backend is out of date

use crate::error::{BackendError, Error};
use crate::index::comparator::{ConfigurationComparator, Difference};
use crate::index::configuration::IndexConfiguration;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches the configuration actually present on the backend
#[async_trait]
pub trait IndexAdapter: Send + Sync {
    /// `Ok(None)` when the index does not exist yet
    async fn get_remote_configuration(
        &self,
        desired: &IndexConfiguration,
    ) -> std::result::Result<Option<IndexConfiguration>, BackendError>;
}

#[async_trait]
impl<T: IndexAdapter + ?Sized> IndexAdapter for Arc<T> {
    async fn get_remote_configuration(
        &self,
        desired: &IndexConfiguration,
    ) -> std::result::Result<Option<IndexConfiguration>, BackendError> {
        (**self).get_remote_configuration(desired).await
    }
}

/// Outcome of comparing a desired configuration with the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    /// The index does not exist on the backend
    Absent,
    UpToDate,
    Changed(Vec<Difference>),
}

impl IndexStatus {
    pub fn has_changes(&self) -> bool {
        !matches!(self, IndexStatus::UpToDate)
    }
}

pub struct IndexChangedChecker<A> {
    adapter: A,
    comparator: ConfigurationComparator,
}

impl<A: IndexAdapter> IndexChangedChecker<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_comparator(adapter, ConfigurationComparator::default())
    }

    pub fn with_comparator(adapter: A, comparator: ConfigurationComparator) -> Self {
        Self {
            adapter,
            comparator,
        }
    }

    /// True when the index is absent or differs from `desired`
    pub async fn has_changes(&self, desired: &IndexConfiguration) -> Result<bool> {
        Ok(self.status(desired).await?.has_changes())
    }

    pub async fn status(&self, desired: &IndexConfiguration) -> Result<IndexStatus> {
        let actual = match self.adapter.get_remote_configuration(desired).await? {
            Some(actual) => actual,
            None => {
                tracing::info!(index = %desired.name, "Index does not exist on backend");
                return Ok(IndexStatus::Absent);
            }
        };

        if actual.name != desired.name {
            return Err(Error::invalid_argument(format!(
                "adapter returned configuration for index '{}' while '{}' was requested",
                actual.name, desired.name
            )));
        }

        let differences = self.comparator.diff(desired, &actual);
        if differences.is_empty() {
            tracing::debug!(index = %desired.name, "Index configuration up to date");
            Ok(IndexStatus::UpToDate)
        } else {
            tracing::info!(
                index = %desired.name,
                differences = differences.len(),
                "Index configuration changed"
            );
            Ok(IndexStatus::Changed(differences))
        }
    }
}
