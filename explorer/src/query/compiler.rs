//! Compiles the query model into a Query DSL request document

use crate::command::SearchCommandSource;
use crate::error::Error;
use crate::query::aggregation::{AggregationDefinition, Aggregations};
use crate::query::types::*;
use crate::Result;
use serde_json::{json, Map, Value};

/// A compiled request: target index plus request body
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    pub body: Value,
}

/// Translates the query model to Query DSL documents
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compile a search command.
    ///
    /// Fails with [`Error::InvalidArgument`] when the command has no index.
    pub fn compile<S>(command: &S) -> Result<SearchRequest>
    where
        S: SearchCommandSource + ?Sized,
    {
        let index = require_index(command)?;
        let body = Self::compile_query(&command.query());

        tracing::debug!(index = %index, "Compiled search request");

        Ok(SearchRequest {
            index: index.to_string(),
            body,
        })
    }

    /// Compile a query into a request body
    pub fn compile_query(query: &Query) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), Self::compile_bool(&query.bool_query));

        if let Some(offset) = query.offset {
            body.insert("from".to_string(), json!(offset));
        }

        if let Some(limit) = query.limit {
            body.insert("size".to_string(), json!(limit));
        }

        if !query.sort.is_empty() {
            let sort: Vec<Value> = query
                .sort
                .iter()
                .map(|s| single_key(&s.field, json!(s.order.as_str())))
                .collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }

        if let Some(fields) = &query.fields {
            body.insert("fields".to_string(), json!(fields));
        }

        if let Some(min_score) = query.min_score {
            body.insert("min_score".to_string(), json!(min_score));
        }

        if !query.aggregations.is_empty() {
            body.insert(
                "aggs".to_string(),
                Self::compile_aggregations(&query.aggregations),
            );
        }

        Value::Object(body)
    }

    /// `bool` always carries `must`, `should` and `filter`, empty or not.
    pub fn compile_bool(bool_query: &BoolQuery) -> Value {
        json!({
            "bool": {
                "must": compile_list(&bool_query.must),
                "should": compile_list(&bool_query.should),
                "filter": compile_list(&bool_query.filter),
            }
        })
    }

    /// Compile a single clause into its Query DSL document
    pub fn compile_clause(clause: &Clause) -> Value {
        match clause {
            Clause::Match {
                field,
                query,
                fuzziness,
            } => {
                let mut params = Map::new();
                params.insert("query".to_string(), query.clone());
                if let Some(fuzziness) = fuzziness {
                    params.insert("fuzziness".to_string(), json!(fuzziness));
                }
                json!({ "match": single_key(field, Value::Object(params)) })
            }

            Clause::MatchPhrase { field, query, slop } => {
                let mut params = Map::new();
                params.insert("query".to_string(), json!(query));
                if let Some(slop) = slop {
                    params.insert("slop".to_string(), json!(slop));
                }
                json!({ "match_phrase": single_key(field, Value::Object(params)) })
            }

            Clause::MultiMatch {
                query,
                fields,
                fuzziness,
            } => {
                let mut params = Map::new();
                params.insert("query".to_string(), json!(query));
                if let Some(fields) = fields {
                    params.insert("fields".to_string(), json!(fields));
                }
                if let Some(fuzziness) = fuzziness {
                    params.insert("fuzziness".to_string(), json!(fuzziness));
                }
                json!({ "multi_match": params })
            }

            Clause::Term { field, value, boost } => json!({
                "term": single_key(field, json!({
                    "value": value,
                    "boost": boost.unwrap_or(DEFAULT_BOOST),
                }))
            }),

            Clause::Terms {
                field,
                values,
                boost,
            } => {
                let mut params = Map::new();
                params.insert(field.clone(), json!(values));
                params.insert("boost".to_string(), json!(boost.unwrap_or(DEFAULT_BOOST)));
                json!({ "terms": params })
            }

            Clause::Range { field, bounds } => {
                let mut params = Map::new();
                let entries = [
                    ("gt", &bounds.gt),
                    ("gte", &bounds.gte),
                    ("lt", &bounds.lt),
                    ("lte", &bounds.lte),
                ];
                for (key, bound) in entries {
                    if let Some(value) = bound {
                        params.insert(key.to_string(), value.clone());
                    }
                }
                json!({ "range": single_key(field, Value::Object(params)) })
            }

            Clause::Exists { field } => json!({ "exists": { "field": field } }),

            Clause::Wildcard { field, value } => {
                json!({ "wildcard": single_key(field, json!({ "value": value })) })
            }

            Clause::Regexp { field, value } => {
                json!({ "regexp": single_key(field, json!({ "value": value })) })
            }

            Clause::QueryString {
                query,
                default_field,
            } => {
                let mut params = Map::new();
                params.insert("query".to_string(), json!(query));
                if let Some(field) = default_field {
                    params.insert("default_field".to_string(), json!(field));
                }
                json!({ "query_string": params })
            }

            Clause::Nested { path, query } => json!({
                "nested": {
                    "path": path,
                    "query": Self::compile_clause(query),
                }
            }),

            Clause::Bool(bool_query) => Self::compile_bool(bool_query),

            Clause::Raw(document) => document.clone(),
        }
    }

    /// Compile named aggregations into an `aggs` document
    pub fn compile_aggregations(aggregations: &Aggregations) -> Value {
        let compiled: Map<String, Value> = aggregations
            .iter()
            .map(|(name, definition)| (name.to_string(), Self::compile_aggregation(definition)))
            .collect();
        Value::Object(compiled)
    }

    pub fn compile_aggregation(definition: &AggregationDefinition) -> Value {
        match definition {
            AggregationDefinition::Terms { field, size } => json!({
                "terms": { "field": field, "size": size }
            }),

            AggregationDefinition::Metric { kind, field } => {
                single_key(kind.as_str(), json!({ "field": field }))
            }

            AggregationDefinition::Nested { path, aggregations } => json!({
                "nested": { "path": path },
                "aggs": Self::compile_aggregations(aggregations),
            }),

            AggregationDefinition::NestedFiltered {
                path,
                result_key,
                bucket_key,
                filters,
                size,
            } => {
                // Single should/bool/must wrapper so more filter clauses can be appended.
                let must: Vec<Value> = filters
                    .iter()
                    .map(|(field, values)| {
                        json!({ "terms": single_key(&format!("{}.{}", path, field), json!(values)) })
                    })
                    .collect();

                let leaf = single_key(
                    result_key,
                    json!({
                        "terms": {
                            "field": format!("{}.{}", path, bucket_key),
                            "size": size,
                        }
                    }),
                );

                let filtered = json!({
                    "filter": {
                        "bool": {
                            "should": {
                                "bool": { "must": must }
                            }
                        }
                    },
                    "aggs": leaf,
                });

                json!({
                    "nested": { "path": path },
                    "aggs": single_key(result_key, filtered),
                })
            }
        }
    }
}

/// Index of a command, rejecting missing and empty names
pub(crate) fn require_index<S>(command: &S) -> Result<&str>
where
    S: SearchCommandSource + ?Sized,
{
    command
        .index()
        .filter(|index| !index.is_empty())
        .ok_or_else(|| Error::invalid_argument("an index is required to search"))
}

fn compile_list(clauses: &[Clause]) -> Value {
    Value::Array(clauses.iter().map(QueryCompiler::compile_clause).collect())
}

fn single_key(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
