//! Search commands: where a search request comes from
//!
//! [`SearchCommandSource`] is the capability the compiler and finder consume.
//! [`SearchCommand`] wraps a ready-made [`Query`]; [`SearchCommandBuilder`]
//! assembles one from clause lists, equality maps and a free-text string the
//! way application-side search builders describe a search.

use crate::query::{AggregationDefinition, Aggregations, BoolQuery, Clause, Query, Sort};
use serde_json::Value;

/// Anything that can describe a search against one index
pub trait SearchCommandSource {
    /// Target index; `None` means the command cannot be executed
    fn index(&self) -> Option<&str>;

    /// The query to run
    fn query(&self) -> Query;
}

/// Index name plus an explicit query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCommand {
    pub index: Option<String>,
    pub query: Option<Query>,
}

impl SearchCommand {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            query: None,
        }
    }

    pub fn with_query(index: impl Into<String>, query: Query) -> Self {
        Self {
            index: Some(index.into()),
            query: Some(query),
        }
    }

    pub fn set_index(&mut self, index: impl Into<String>) {
        self.index = Some(index.into());
    }

    pub fn set_query(&mut self, query: Query) {
        self.query = Some(query);
    }
}

impl SearchCommandSource for SearchCommand {
    fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    fn query(&self) -> Query {
        self.query.clone().unwrap_or_default()
    }
}

/// Assembles a [`Query`] from the pieces a search builder exposes.
///
/// Clause order in the compiled query: explicit `must` clauses, then the
/// free-text clause; explicit `filter` clauses, then `where` terms, then
/// `where in` terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCommandBuilder {
    index: Option<String>,
    query: Option<String>,
    default_search_fields: Vec<String>,
    must: Vec<Clause>,
    should: Vec<Clause>,
    filter: Vec<Clause>,
    wheres: Vec<(String, Value)>,
    where_ins: Vec<(String, Vec<Value>)>,
    offset: Option<u64>,
    limit: Option<u64>,
    sort: Vec<Sort>,
    fields: Option<Vec<String>>,
    aggregations: Aggregations,
}

impl SearchCommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Free-text query; compiled to a fuzzy `multi_match` over the default
    /// search fields
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn default_search_fields<S: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.default_search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn must(mut self, clauses: Vec<Clause>) -> Self {
        self.must = clauses;
        self
    }

    pub fn should(mut self, clauses: Vec<Clause>) -> Self {
        self.should = clauses;
        self
    }

    pub fn filter(mut self, clauses: Vec<Clause>) -> Self {
        self.filter = clauses;
        self
    }

    /// Equality condition, compiled to a `term` filter
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        upsert(&mut self.wheres, field.into(), value.into());
        self
    }

    /// Multi-value equality condition, compiled to a `terms` filter
    pub fn where_in<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        upsert(&mut self.where_ins, field.into(), values);
        self
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

    pub fn aggregation(mut self, name: impl Into<String>, definition: AggregationDefinition) -> Self {
        self.aggregations.insert(name, definition);
        self
    }
}

impl SearchCommandSource for SearchCommandBuilder {
    fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    fn query(&self) -> Query {
        let mut bool_query = BoolQuery {
            must: self.must.clone(),
            should: self.should.clone(),
            filter: self.filter.clone(),
        };

        if let Some(text) = self.query.as_deref().filter(|q| !q.is_empty()) {
            bool_query
                .must
                .push(Clause::multi_match(text, self.default_search_fields.clone()));
        }

        for (field, value) in &self.wheres {
            bool_query.filter.push(Clause::term(field.clone(), value.clone()));
        }

        for (field, values) in &self.where_ins {
            bool_query
                .filter
                .push(Clause::terms(field.clone(), values.iter().cloned()));
        }

        Query {
            bool_query,
            offset: self.offset,
            limit: self.limit,
            sort: self.sort.clone(),
            fields: self.fields.clone(),
            min_score: None,
            aggregations: self.aggregations.clone(),
        }
    }
}

fn upsert<V>(entries: &mut Vec<(String, V)>, key: String, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}
