//! Aggregation definitions

use serde_json::Value;

/// Bucket count requested from `terms` aggregations unless overridden
pub const DEFAULT_TERMS_SIZE: usize = 10;

/// Metric aggregation kinds; the name is the Query DSL key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Avg,
    Sum,
    Min,
    Max,
    Cardinality,
    ValueCount,
    Stats,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Avg => "avg",
            MetricKind::Sum => "sum",
            MetricKind::Min => "min",
            MetricKind::Max => "max",
            MetricKind::Cardinality => "cardinality",
            MetricKind::ValueCount => "value_count",
            MetricKind::Stats => "stats",
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avg" => Ok(MetricKind::Avg),
            "sum" => Ok(MetricKind::Sum),
            "min" => Ok(MetricKind::Min),
            "max" => Ok(MetricKind::Max),
            "cardinality" => Ok(MetricKind::Cardinality),
            "value_count" => Ok(MetricKind::ValueCount),
            "stats" => Ok(MetricKind::Stats),
            other => Err(format!("unknown metric aggregation '{}'", other)),
        }
    }
}

/// One requested aggregation.
///
/// The set of kinds is closed: compilation and decoding both match on it
/// exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationDefinition {
    Terms {
        field: String,
        size: usize,
    },

    Metric {
        kind: MetricKind,
        field: String,
    },

    /// Child aggregations scoped to a nested field path
    Nested {
        path: String,
        aggregations: Aggregations,
    },

    /// Terms aggregation over a nested path, restricted by `filters`
    /// (field relative to `path` -> accepted values).
    NestedFiltered {
        path: String,
        result_key: String,
        bucket_key: String,
        filters: Vec<(String, Vec<Value>)>,
        size: usize,
    },
}

impl AggregationDefinition {
    pub fn terms(field: impl Into<String>) -> Self {
        Self::terms_with_size(field, DEFAULT_TERMS_SIZE)
    }

    pub fn terms_with_size(field: impl Into<String>, size: usize) -> Self {
        Self::Terms {
            field: field.into(),
            size,
        }
    }

    pub fn metric(kind: MetricKind, field: impl Into<String>) -> Self {
        Self::Metric {
            kind,
            field: field.into(),
        }
    }

    pub fn max(field: impl Into<String>) -> Self {
        Self::metric(MetricKind::Max, field)
    }

    pub fn min(field: impl Into<String>) -> Self {
        Self::metric(MetricKind::Min, field)
    }

    pub fn avg(field: impl Into<String>) -> Self {
        Self::metric(MetricKind::Avg, field)
    }

    pub fn sum(field: impl Into<String>) -> Self {
        Self::metric(MetricKind::Sum, field)
    }

    pub fn nested(path: impl Into<String>, aggregations: Aggregations) -> Self {
        Self::Nested {
            path: path.into(),
            aggregations,
        }
    }

    pub fn nested_filtered(
        path: impl Into<String>,
        result_key: impl Into<String>,
        bucket_key: impl Into<String>,
        filters: Vec<(String, Vec<Value>)>,
    ) -> Self {
        Self::NestedFiltered {
            path: path.into(),
            result_key: result_key.into(),
            bucket_key: bucket_key.into(),
            filters,
            size: DEFAULT_TERMS_SIZE,
        }
    }
}

/// Named aggregation definitions in insertion order.
///
/// Inserting an existing name replaces the definition in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregations {
    entries: Vec<(String, AggregationDefinition)>,
}

impl Aggregations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: AggregationDefinition) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = definition,
            None => self.entries.push((name, definition)),
        }
    }

    /// Builder form of [`Aggregations::insert`]
    pub fn with(mut self, name: impl Into<String>, definition: AggregationDefinition) -> Self {
        self.insert(name, definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AggregationDefinition> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, definition)| definition)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregationDefinition)> {
        self.entries
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, AggregationDefinition)> for Aggregations {
    fn from_iter<I: IntoIterator<Item = (N, AggregationDefinition)>>(iter: I) -> Self {
        let mut aggregations = Aggregations::new();
        for (name, definition) in iter {
            aggregations.insert(name, definition);
        }
        aggregations
    }
}
