pub mod compile;
pub mod index_status;
pub mod search;

pub use compile::run_compile;
pub use index_status::run_index_status;
pub use search::run_search;

use anyhow::{anyhow, bail, Result};
use clap::Args;
use explorer::query::{AggregationDefinition, MetricKind, Sort, SortOrder};
use explorer::SearchCommandBuilder;
use serde_json::Value;

/// Search options shared by `compile` and `search`
#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Index to search
    #[arg(short, long)]
    pub index: String,

    /// Free-text query, fuzzy matched against the search fields
    #[arg(short, long)]
    pub query: Option<String>,

    /// Fields the free-text query is matched against (default: [search] default_fields)
    #[arg(long = "search-field", value_name = "FIELD")]
    pub search_fields: Vec<String>,

    /// Exact match filter (repeatable)
    #[arg(long = "where", value_name = "FIELD=VALUE")]
    pub wheres: Vec<String>,

    /// Any-of filter (repeatable)
    #[arg(long = "where-in", value_name = "FIELD=A,B,..")]
    pub where_ins: Vec<String>,

    #[arg(long)]
    pub offset: Option<u64>,

    #[arg(long)]
    pub limit: Option<u64>,

    /// Sort directive, order defaults to asc (repeatable)
    #[arg(long, value_name = "FIELD[:asc|desc]")]
    pub sort: Vec<String>,

    /// Source field to return (repeatable)
    #[arg(long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Terms aggregation (repeatable)
    #[arg(long = "terms-agg", value_name = "NAME=FIELD")]
    pub terms_aggs: Vec<String>,

    /// Metric aggregation, e.g. `avg_price=avg:price` (repeatable)
    #[arg(long = "metric-agg", value_name = "NAME=KIND:FIELD")]
    pub metric_aggs: Vec<String>,
}

impl QueryArgs {
    /// Turn the arguments into a search command
    pub fn to_builder(&self, default_fields: &[String]) -> Result<SearchCommandBuilder> {
        let search_fields: &[String] = if self.search_fields.is_empty() {
            default_fields
        } else {
            &self.search_fields
        };

        let mut builder = SearchCommandBuilder::new()
            .for_index(&self.index)
            .default_search_fields(search_fields.iter().cloned());

        if let Some(query) = &self.query {
            builder = builder.search(query);
        }

        for condition in &self.wheres {
            let (field, value) = split_pair(condition, '=')?;
            builder = builder.where_eq(field, parse_value(value));
        }

        for condition in &self.where_ins {
            let (field, values) = split_pair(condition, '=')?;
            builder = builder.where_in(field, values.split(',').map(|v| parse_value(v.trim())));
        }

        if let Some(offset) = self.offset {
            builder = builder.offset(offset);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }

        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|s| parse_sort(s))
                .collect::<Result<Vec<_>>>()?;
            builder = builder.sort(sort);
        }

        if !self.fields.is_empty() {
            builder = builder.fields(self.fields.iter().cloned());
        }

        for agg in &self.terms_aggs {
            let (name, field) = split_pair(agg, '=')?;
            builder = builder.aggregation(name, AggregationDefinition::terms(field));
        }

        for agg in &self.metric_aggs {
            let (name, definition) = split_pair(agg, '=')?;
            let (kind, field) = split_pair(definition, ':')?;
            let kind: MetricKind = kind.parse().map_err(|e: String| anyhow!(e))?;
            builder = builder.aggregation(name, AggregationDefinition::metric(kind, field));
        }

        Ok(builder)
    }
}

fn split_pair(arg: &str, separator: char) -> Result<(&str, &str)> {
    match arg.split_once(separator) {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("Expected KEY{}VALUE, got '{}'", separator, arg),
    }
}

/// Numbers and booleans keep their type, anything else is a string
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn parse_sort(raw: &str) -> Result<Sort> {
    match raw.split_once(':') {
        Some((field, order)) => {
            let order: SortOrder = order.parse().map_err(|e: String| anyhow!(e))?;
            Ok(Sort::new(field, order))
        }
        None => Ok(Sort::asc(raw)),
    }
}
