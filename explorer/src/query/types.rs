//! Query DSL building blocks
//!
//! These types describe what to search for. They carry no rendering logic;
//! see [`crate::query::QueryCompiler`].

use crate::query::aggregation::{AggregationDefinition, Aggregations};
use serde_json::Value;

/// Fuzziness requested for every free-text match
pub const DEFAULT_FUZZINESS: &str = "auto";

/// Boost rendered on term-level clauses when none was given
pub const DEFAULT_BOOST: f64 = 1.0;

/// A single condition inside a boolean query
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Analyzed full-text match on one field
    Match {
        field: String,
        query: Value,
        fuzziness: Option<String>,
    },

    /// Phrase match on one field
    MatchPhrase {
        field: String,
        query: String,
        slop: Option<u32>,
    },

    /// Full-text match across several fields (all fields when `fields` is None)
    MultiMatch {
        query: String,
        fields: Option<Vec<String>>,
        fuzziness: Option<String>,
    },

    /// Exact value, not analyzed
    Term {
        field: String,
        value: Value,
        boost: Option<f64>,
    },

    /// Any of several exact values
    Terms {
        field: String,
        values: Vec<Value>,
        boost: Option<f64>,
    },

    Range {
        field: String,
        bounds: RangeBounds,
    },

    Exists {
        field: String,
    },

    Wildcard {
        field: String,
        value: String,
    },

    Regexp {
        field: String,
        value: String,
    },

    /// Lucene query syntax
    QueryString {
        query: String,
        default_field: Option<String>,
    },

    /// Clause scoped to a nested (array of objects) field
    Nested { path: String, query: Box<Clause> },

    /// Compound sub-query
    Bool(Box<BoolQuery>),

    /// Already compiled clause document, passed through verbatim
    Raw(Value),
}

impl Clause {
    /// Fuzzy full-text match on a single field
    pub fn matching(field: impl Into<String>, query: impl Into<Value>) -> Self {
        Self::Match {
            field: field.into(),
            query: query.into(),
            fuzziness: Some(DEFAULT_FUZZINESS.to_string()),
        }
    }

    pub fn match_phrase(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::MatchPhrase {
            field: field.into(),
            query: query.into(),
            slop: None,
        }
    }

    /// Fuzzy full-text match across `fields`; an empty list targets all fields
    pub fn multi_match(query: impl Into<String>, fields: Vec<String>) -> Self {
        Self::MultiMatch {
            query: query.into(),
            fields: if fields.is_empty() { None } else { Some(fields) },
            fuzziness: Some(DEFAULT_FUZZINESS.to_string()),
        }
    }

    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn terms<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            boost: None,
        }
    }

    pub fn range(field: impl Into<String>, bounds: RangeBounds) -> Self {
        Self::Range {
            field: field.into(),
            bounds,
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
        }
    }

    pub fn wildcard(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Wildcard {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn regexp(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Regexp {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn query_string(query: impl Into<String>) -> Self {
        Self::QueryString {
            query: query.into(),
            default_field: None,
        }
    }

    pub fn nested(path: impl Into<String>, query: Clause) -> Self {
        Self::Nested {
            path: path.into(),
            query: Box::new(query),
        }
    }

    /// Set an explicit boost on a term-level clause. Other clauses are
    /// returned unchanged.
    pub fn with_boost(mut self, value: f64) -> Self {
        match &mut self {
            Self::Term { boost, .. } | Self::Terms { boost, .. } => *boost = Some(value),
            _ => {}
        }
        self
    }
}

impl From<BoolQuery> for Clause {
    fn from(query: BoolQuery) -> Self {
        Self::Bool(Box::new(query))
    }
}

/// Range bounds; unset bounds are not rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
}

impl RangeBounds {
    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }
}

/// Boolean query with ordered clause lists.
///
/// Order matters for relevance in `must` and `should`, not in `filter`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub filter: Vec<Clause>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, clause: Clause) -> Self {
        self.must.push(clause);
        self
    }

    pub fn should(mut self, clause: Clause) -> Self {
        self.should.push(clause);
        self
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.filter.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.filter.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// Sort directive on a single field
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Ascending)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Descending)
    }
}

/// A complete search query: one boolean query plus paging, sorting,
/// projection and aggregations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub bool_query: BoolQuery,
    /// Rendered as `from`; absent unless set
    pub offset: Option<u64>,
    /// Rendered as `size`; absent unless set
    pub limit: Option<u64>,
    pub sort: Vec<Sort>,
    pub fields: Option<Vec<String>>,
    pub min_score: Option<f64>,
    pub aggregations: Aggregations,
}

impl Query {
    pub fn with(bool_query: BoolQuery) -> Self {
        Self {
            bool_query,
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: Vec<Sort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_score(mut self, score: f64) -> Self {
        self.min_score = Some(score);
        self
    }

    pub fn aggregation(mut self, name: impl Into<String>, definition: AggregationDefinition) -> Self {
        self.aggregations.insert(name, definition);
        self
    }

    pub fn add_aggregation(&mut self, name: impl Into<String>, definition: AggregationDefinition) {
        self.aggregations.insert(name, definition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matching_is_fuzzy() {
        match Clause::matching("title", "Lorem Ipsum") {
            Clause::Match { fuzziness, .. } => assert_eq!(fuzziness.as_deref(), Some("auto")),
            other => panic!("Expected Match, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_match_empty_fields_targets_all() {
        match Clause::multi_match("fuzzy search", vec![]) {
            Clause::MultiMatch { fields, .. } => assert!(fields.is_none()),
            other => panic!("Expected MultiMatch, got {:?}", other),
        }
    }

    #[test]
    fn test_with_boost_only_touches_term_level() {
        let term = Clause::term("published", true).with_boost(2.0);
        assert_eq!(
            term,
            Clause::Term {
                field: "published".to_string(),
                value: json!(true),
                boost: Some(2.0),
            }
        );

        let exists = Clause::exists("title").with_boost(2.0);
        assert_eq!(exists, Clause::exists("title"));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_replacing_aggregation_keeps_position() {
        let query = Query::default()
            .aggregation("a", AggregationDefinition::terms("x"))
            .aggregation("b", AggregationDefinition::terms("y"))
            .aggregation("a", AggregationDefinition::terms("z"));

        let names: Vec<&str> = query.aggregations.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            query.aggregations.get("a"),
            Some(&AggregationDefinition::terms("z"))
        );
    }
}
