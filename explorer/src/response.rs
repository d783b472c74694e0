//! Decoding of backend search responses
//!
//! Hits are kept close to the raw backend record. Aggregations are decoded by
//! walking the *requested* definitions, because flat and nested aggregations
//! have different shapes in the response and only the request says which one
//! to expect under each name.

use crate::error::Error;
use crate::query::{AggregationDefinition, Aggregations};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Suffix the backend-side leaf of a filtered nested aggregation carries
const FILTERED_SUFFIX: &str = "Filtered";

/// A decoded search response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub hits: Vec<Hit>,
    pub total: u64,
    pub aggregations: Vec<AggregationResult>,
}

impl SearchResult {
    /// Total number of matching documents reported by the backend
    pub fn count(&self) -> u64 {
        self.total
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn aggregations(&self) -> &[AggregationResult] {
        &self.aggregations
    }
}

/// A single hit. Keys other than the well-known ones are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default, skip_serializing_if = "Value::is_null")]
    pub source: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `hits.total`: an object on current backends, a bare count on older ones
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Object { value: u64 },
    Count(u64),
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            TotalHits::Object { value } | TotalHits::Count(value) => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    hits: RawHits,
    #[serde(default)]
    aggregations: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawHits {
    total: TotalHits,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// One bucket of a bucketing aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: Value,
    pub doc_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decoded values of one aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregationValues {
    Buckets(Vec<Bucket>),
    /// The whole metric document, e.g. `{"value": 10}`
    Metric(Map<String, Value>),
}

/// A named aggregation result.
///
/// Results are identified by their position in [`SearchResult::aggregations`],
/// not by name: nested aggregations may produce same-named results at
/// different paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub name: String,
    pub values: AggregationValues,
}

impl AggregationResult {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &AggregationValues {
        &self.values
    }

    pub fn buckets(&self) -> Option<&[Bucket]> {
        match &self.values {
            AggregationValues::Buckets(buckets) => Some(buckets),
            AggregationValues::Metric(_) => None,
        }
    }

    pub fn metric(&self) -> Option<&Map<String, Value>> {
        match &self.values {
            AggregationValues::Metric(values) => Some(values),
            AggregationValues::Buckets(_) => None,
        }
    }

    /// Number of buckets, or number of entries of a metric document
    pub fn len(&self) -> usize {
        match &self.values {
            AggregationValues::Buckets(buckets) => buckets.len(),
            AggregationValues::Metric(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes raw backend responses
pub struct ResultDecoder;

impl ResultDecoder {
    /// Decode a search response produced for a request carrying `requested`.
    ///
    /// A response without an `aggregations` key decodes to no aggregation
    /// results. Any other missing key is an error.
    pub fn decode(response: Value, requested: &Aggregations) -> Result<SearchResult> {
        let raw: RawResponse = serde_json::from_value(response)
            .map_err(|e| Error::decode(format!("unexpected search response: {}", e)))?;

        let aggregations = match &raw.aggregations {
            Some(raw_aggs) => Self::decode_aggregations(raw_aggs, requested)?,
            None => vec![],
        };

        tracing::debug!(
            total = raw.hits.total.value(),
            hits = raw.hits.hits.len(),
            aggregations = aggregations.len(),
            "Decoded search response"
        );

        Ok(SearchResult {
            total: raw.hits.total.value(),
            hits: raw.hits.hits,
            aggregations,
        })
    }

    /// Decode the `aggregations` document in the order of `requested`.
    ///
    /// Nested definitions contribute their children's results at the
    /// position of the parent.
    pub fn decode_aggregations(
        raw: &Map<String, Value>,
        requested: &Aggregations,
    ) -> Result<Vec<AggregationResult>> {
        let mut results = Vec::with_capacity(requested.len());
        for (name, definition) in requested.iter() {
            let raw_agg = raw
                .get(name)
                .ok_or_else(|| Error::decode(format!("aggregation '{}' missing from response", name)))?;
            decode_aggregation(name, definition, raw_agg, &mut results)?;
        }
        Ok(results)
    }
}

fn decode_aggregation(
    name: &str,
    definition: &AggregationDefinition,
    raw: &Value,
    out: &mut Vec<AggregationResult>,
) -> Result<()> {
    match definition {
        AggregationDefinition::Terms { .. } => {
            out.push(AggregationResult {
                name: name.to_string(),
                values: AggregationValues::Buckets(buckets_of(name, raw)?),
            });
        }

        AggregationDefinition::Metric { .. } => {
            let values = raw.as_object().cloned().ok_or_else(|| {
                Error::decode(format!("metric aggregation '{}' is not an object", name))
            })?;
            out.push(AggregationResult {
                name: name.to_string(),
                values: AggregationValues::Metric(values),
            });
        }

        AggregationDefinition::Nested { aggregations, .. } => {
            for (child, child_definition) in aggregations.iter() {
                let raw_child = raw.get(child).ok_or_else(|| {
                    Error::decode(format!(
                        "nested aggregation '{}' has no child '{}'",
                        name, child
                    ))
                })?;
                decode_aggregation(child, child_definition, raw_child, out)?;
            }
        }

        AggregationDefinition::NestedFiltered {
            result_key,
            bucket_key,
            ..
        } => {
            let filtered = raw.get(result_key).ok_or_else(|| {
                Error::decode(format!(
                    "filtered nested aggregation '{}' has no '{}'",
                    name, result_key
                ))
            })?;
            let (leaf_name, leaf) = filtered_leaf(filtered, result_key, bucket_key)
                .ok_or_else(|| {
                    Error::decode(format!(
                        "filtered nested aggregation '{}' has no terms leaf under '{}'",
                        name, result_key
                    ))
                })?;
            out.push(AggregationResult {
                name: leaf_name.to_string(),
                values: AggregationValues::Buckets(buckets_of(leaf_name, leaf)?),
            });
        }
    }
    Ok(())
}

/// Locate the terms leaf inside the filter bucket of a filtered nested
/// aggregation.
///
/// Lookup order: `<bucket_key>Filtered`, then `result_key` (the name the
/// request uses), then the only child carrying `buckets`. The result is
/// named after the key actually found.
///
/// Responses that name the leaf after the field rather than the bucket key
/// (`someFieldFiltered` under bucket key `someFieldNestedAggregation`)
/// match neither name and decode through the last step only.
// TODO: align the request-side leaf name with the response-side one once the
// consumers relying on the `Filtered` suffix are migrated.
fn filtered_leaf<'a>(
    filtered: &'a Value,
    result_key: &str,
    bucket_key: &str,
) -> Option<(&'a str, &'a Value)> {
    let children = filtered.as_object()?;

    let suffixed = format!("{}{}", bucket_key, FILTERED_SUFFIX);
    for key in [suffixed.as_str(), result_key] {
        if let Some((name, leaf)) = children.get_key_value(key) {
            return Some((name.as_str(), leaf));
        }
    }

    let mut leaves = children
        .iter()
        .filter(|(_, child)| child.get("buckets").is_some());
    match (leaves.next(), leaves.next()) {
        (Some((name, leaf)), None) => Some((name.as_str(), leaf)),
        _ => None,
    }
}

fn buckets_of(name: &str, raw: &Value) -> Result<Vec<Bucket>> {
    let buckets = raw
        .get("buckets")
        .ok_or_else(|| Error::decode(format!("aggregation '{}' has no buckets", name)))?;
    Vec::<Bucket>::deserialize(buckets)
        .map_err(|e| Error::decode(format!("aggregation '{}' has malformed buckets: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit() -> Value {
        json!({
            "_index": "test_index",
            "_type": "default",
            "_id": "1",
            "_score": 1.0,
            "_source": {}
        })
    }

    fn response(aggregations: Option<Value>) -> Value {
        let mut response = json!({
            "hits": { "total": { "value": 1 }, "hits": [hit()] }
        });
        if let Some(aggs) = aggregations {
            response["aggregations"] = aggs;
        }
        response
    }

    // ===================================================================
    // Hits
    // ===================================================================

    #[test]
    fn test_decode_hits() {
        let result = ResultDecoder::decode(response(None), &Aggregations::new()).unwrap();
        assert_eq!(result.count(), 1);
        assert_eq!(result.hits().len(), 1);

        let hit = &result.hits()[0];
        assert_eq!(hit.index.as_deref(), Some("test_index"));
        assert_eq!(hit.id.as_deref(), Some("1"));
        assert_eq!(hit.score, Some(1.0));
        assert_eq!(hit.extra.get("_type"), Some(&json!("default")));
    }

    #[test]
    fn test_hit_serializes_back_to_raw_record() {
        let result = ResultDecoder::decode(response(None), &Aggregations::new()).unwrap();
        assert_eq!(serde_json::to_value(&result.hits()[0]).unwrap(), hit());
    }

    #[test]
    fn test_legacy_total_count() {
        let raw = json!({ "hits": { "total": 7, "hits": [] } });
        let result = ResultDecoder::decode(raw, &Aggregations::new()).unwrap();
        assert_eq!(result.count(), 7);
    }

    #[test]
    fn test_missing_hits_is_error() {
        let err = ResultDecoder::decode(json!({ "took": 1 }), &Aggregations::new()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_mistyped_hits_is_decode_error() {
        let raw = json!({ "hits": { "total": "many", "hits": {} } });
        let err = ResultDecoder::decode(raw, &Aggregations::new()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().starts_with("Decode error: unexpected search response"));
    }

    // ===================================================================
    // Aggregations
    // ===================================================================

    #[test]
    fn test_missing_aggregations_key_decodes_empty() {
        let requested =
            Aggregations::new().with("tags", AggregationDefinition::terms("tags"));
        let result = ResultDecoder::decode(response(None), &requested).unwrap();
        assert!(result.aggregations().is_empty());
    }

    #[test]
    fn test_terms_aggregation() {
        let requested = Aggregations::new().with(
            "specificAggregation",
            AggregationDefinition::terms("specificField"),
        );
        let raw = response(Some(json!({
            "specificAggregation": { "buckets": [{ "key": "myKey", "doc_count": 42 }] }
        })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        assert_eq!(result.aggregations().len(), 1);

        let agg = &result.aggregations()[0];
        assert_eq!(agg.name(), "specificAggregation");
        assert_eq!(agg.len(), 1);
        let bucket = &agg.buckets().unwrap()[0];
        assert_eq!(bucket.key, json!("myKey"));
        assert_eq!(bucket.doc_count, 42);
    }

    #[test]
    fn test_metric_aggregation_keeps_whole_document() {
        let requested = Aggregations::new()
            .with("metricAggregation", AggregationDefinition::max("yetAnotherField"));
        let raw = response(Some(json!({ "metricAggregation": { "value": 10 } })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        let metric = result.aggregations()[0].metric().unwrap();
        assert_eq!(metric.get("value"), Some(&json!(10)));
    }

    #[test]
    fn test_bucket_passthrough_fields() {
        let requested = Aggregations::new().with("t", AggregationDefinition::terms("t"));
        let raw = response(Some(json!({
            "t": { "buckets": [{ "key": 3, "doc_count": 1, "key_as_string": "3" }] }
        })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        let bucket = &result.aggregations()[0].buckets().unwrap()[0];
        assert_eq!(bucket.key, json!(3));
        assert_eq!(bucket.extra.get("key_as_string"), Some(&json!("3")));
    }

    #[test]
    fn test_order_follows_request_not_response() {
        let requested = Aggregations::new()
            .with("b", AggregationDefinition::terms("b"))
            .with("a", AggregationDefinition::terms("a"));
        let raw = response(Some(json!({
            "a": { "buckets": [] },
            "b": { "buckets": [] },
            "unrequested": { "buckets": [] }
        })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        let names: Vec<&str> = result.aggregations().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_requested_aggregation_is_error() {
        let requested = Aggregations::new().with("tags", AggregationDefinition::terms("tags"));
        let raw = response(Some(json!({ "other": { "buckets": [] } })));

        let err = ResultDecoder::decode(raw, &requested).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_terms_without_buckets_is_error() {
        let requested = Aggregations::new().with("tags", AggregationDefinition::terms("tags"));
        let raw = response(Some(json!({ "tags": { "value": 1 } })));

        assert!(ResultDecoder::decode(raw, &requested).is_err());
    }

    #[test]
    fn test_nested_aggregation_children_in_place() {
        let requested = Aggregations::new()
            .with(
                "nestedAggregation",
                AggregationDefinition::nested(
                    "nestedAggregation",
                    Aggregations::new()
                        .with("someField", AggregationDefinition::terms("nestedAggregation.someField"))
                        .with("maxPrice", AggregationDefinition::max("nestedAggregation.price")),
                ),
            )
            .with("tail", AggregationDefinition::terms("tail"));
        let raw = response(Some(json!({
            "nestedAggregation": {
                "doc_count": 42,
                "someField": {
                    "doc_count_error_upper_bound": 0,
                    "sum_other_doc_count": 0,
                    "buckets": [{ "key": "someKey", "doc_count": 6 }]
                },
                "maxPrice": { "value": 99.5 }
            },
            "tail": { "buckets": [] }
        })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        let names: Vec<&str> = result.aggregations().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["someField", "maxPrice", "tail"]);

        let bucket = &result.aggregations()[0].buckets().unwrap()[0];
        assert_eq!(bucket.key, json!("someKey"));
        assert_eq!(bucket.doc_count, 6);
    }

    #[test]
    fn test_nested_filtered_field_named_leaf_found_by_buckets() {
        let requested = Aggregations::new().with(
            "nestedFilteredAggregation",
            AggregationDefinition::nested_filtered(
                "nestedFilteredAggregation",
                "filter_aggs",
                "someFieldNestedAggregation",
                vec![("someFilter".to_string(), vec![json!("values")])],
            ),
        );
        let raw = response(Some(json!({
            "nestedFilteredAggregation": {
                "doc_count": 42,
                "filter_aggs": {
                    "doc_count": 42,
                    "buckets": [{ "key": "someFieldNestedAggregation_check", "doc_count": 6 }],
                    "someFieldFiltered": {
                        "doc_count_error_upper_bound": 0,
                        "sum_other_doc_count": 0,
                        "buckets": [{ "key": "someFieldNestedAggregation", "doc_count": 6 }]
                    }
                }
            }
        })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        assert_eq!(result.aggregations().len(), 1);

        let agg = &result.aggregations()[0];
        assert_eq!(agg.name(), "someFieldFiltered");
        assert_eq!(agg.len(), 1);
        let bucket = &agg.buckets().unwrap()[0];
        assert_eq!(bucket.key, json!("someFieldNestedAggregation"));
        assert_eq!(bucket.doc_count, 6);
    }

    #[test]
    fn test_nested_filtered_prefers_suffixed_bucket_key() {
        let requested = Aggregations::new().with(
            "comments",
            AggregationDefinition::nested_filtered("comments", "by_author", "author", vec![]),
        );
        let raw = response(Some(json!({
            "comments": {
                "doc_count": 3,
                "by_author": {
                    "doc_count": 3,
                    "by_author": { "buckets": [{ "key": "x", "doc_count": 1 }] },
                    "authorFiltered": { "buckets": [{ "key": "kim", "doc_count": 3 }] }
                }
            }
        })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        assert_eq!(result.aggregations()[0].name(), "authorFiltered");
    }

    #[test]
    fn test_nested_filtered_accepts_request_side_leaf() {
        let requested = Aggregations::new().with(
            "comments",
            AggregationDefinition::nested_filtered("comments", "by_author", "author", vec![]),
        );
        let raw = response(Some(json!({
            "comments": {
                "doc_count": 3,
                "by_author": {
                    "doc_count": 3,
                    "by_author": { "buckets": [{ "key": "kim", "doc_count": 3 }] }
                }
            }
        })));

        let result = ResultDecoder::decode(raw, &requested).unwrap();
        assert_eq!(result.aggregations()[0].name(), "by_author");
        assert_eq!(result.aggregations()[0].buckets().unwrap()[0].key, json!("kim"));
    }
}
