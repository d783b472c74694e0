//! Structural comparison of index configurations
//!
//! Objects are compared key by key regardless of order, arrays as multisets
//! and scalars strictly: `"2"` never equals `2` and `false` never equals `0`,
//! because the backend treats them as different settings.
//!
//! Mappings are compared in full. Settings are compared only under the
//! managed paths; everything else the backend reports (uuids, creation
//! dates, shard counts) is ignored. Both sides are normalized first so that
//! `index.analysis` and top-level `analysis` are the same setting.

use crate::index::configuration::IndexConfiguration;
use serde_json::{Map, Value};
use std::fmt;

/// Settings paths tracked by default, dot separated
pub const MANAGED_SETTINGS: &[&str] = &[
    "analysis",
    "analyzer",
    "char_filter",
    "filter",
    "filters",
    "normalizer",
    "tokenizer",
    "index.max_ngram_diff",
    "index.max_shingle_diff",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferenceKind {
    /// Declared, but absent on the backend
    MissingRemotely,
    /// Present on the backend only
    OnlyRemote,
    /// Present on both sides with different values
    Changed,
}

/// One differing path, e.g. `mapping.id.type` or `settings.index.max_ngram_diff`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub path: String,
    pub kind: DifferenceKind,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DifferenceKind::MissingRemotely => "missing on backend",
            DifferenceKind::OnlyRemote => "only on backend",
            DifferenceKind::Changed => "changed",
        };
        write!(f, "{} ({})", self.path, kind)
    }
}

/// Compares a desired configuration with the actual one
#[derive(Debug, Clone)]
pub struct ConfigurationComparator {
    managed_settings: Vec<Vec<String>>,
}

impl Default for ConfigurationComparator {
    fn default() -> Self {
        Self::with_managed_settings(MANAGED_SETTINGS.iter().copied())
    }
}

impl ConfigurationComparator {
    /// Comparator tracking the given dot-separated settings paths
    pub fn with_managed_settings<S: AsRef<str>>(paths: impl IntoIterator<Item = S>) -> Self {
        let managed_settings = paths
            .into_iter()
            .map(|p| p.as_ref().split('.').map(str::to_string).collect())
            .collect();
        Self { managed_settings }
    }

    pub fn managed_settings(&self) -> impl Iterator<Item = String> + '_ {
        self.managed_settings.iter().map(|p| p.join("."))
    }

    pub fn has_changes(&self, desired: &IndexConfiguration, actual: &IndexConfiguration) -> bool {
        !self.diff(desired, actual).is_empty()
    }

    /// All differing paths, mapping first, then settings
    pub fn diff(&self, desired: &IndexConfiguration, actual: &IndexConfiguration) -> Vec<Difference> {
        let mut out = vec![];
        diff_maps("mapping", &desired.mapping, &actual.mapping, &mut out);

        let desired_settings = normalize_settings(desired.settings.clone());
        let actual_settings = normalize_settings(actual.settings.clone());

        for path in &self.managed_settings {
            let label = format!("settings.{}", path.join("."));
            match (lookup(&desired_settings, path), lookup(&actual_settings, path)) {
                (None, None) => {}
                (Some(_), None) => out.push(Difference {
                    path: label,
                    kind: DifferenceKind::MissingRemotely,
                }),
                (None, Some(_)) => out.push(Difference {
                    path: label,
                    kind: DifferenceKind::OnlyRemote,
                }),
                (Some(d), Some(a)) => diff_values(&label, d, a, &mut out),
            }
        }

        out
    }
}

/// Hoist `index.analysis` to a top-level `analysis` key.
///
/// The backend reports analysis under `index`, configurations usually
/// declare it at the top. An existing top-level `analysis` wins.
pub fn normalize_settings(mut settings: Map<String, Value>) -> Map<String, Value> {
    let analysis = match settings.get_mut("index") {
        Some(Value::Object(index)) => index.remove("analysis"),
        _ => None,
    };

    if let Some(analysis) = analysis {
        settings.entry("analysis").or_insert(analysis);
    }

    settings
}

/// Strict structural equality with order-insensitive arrays
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
        }
        (Value::Array(a), Value::Array(b)) => same_elements(a, b),
        _ => a == b,
    }
}

/// Multiset comparison: every element needs its own match on the other side
fn same_elements(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        let found = b
            .iter()
            .enumerate()
            .find(|(i, other)| !used[*i] && values_equal(item, other));
        match found {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn lookup<'a>(map: &'a Map<String, Value>, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = map.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn diff_maps(
    prefix: &str,
    desired: &Map<String, Value>,
    actual: &Map<String, Value>,
    out: &mut Vec<Difference>,
) {
    for (key, value) in desired {
        let path = format!("{}.{}", prefix, key);
        match actual.get(key) {
            Some(other) => diff_values(&path, value, other, out),
            None => out.push(Difference {
                path,
                kind: DifferenceKind::MissingRemotely,
            }),
        }
    }

    for key in actual.keys().filter(|k| !desired.contains_key(*k)) {
        out.push(Difference {
            path: format!("{}.{}", prefix, key),
            kind: DifferenceKind::OnlyRemote,
        });
    }
}

fn diff_values(path: &str, desired: &Value, actual: &Value, out: &mut Vec<Difference>) {
    match (desired, actual) {
        (Value::Object(d), Value::Object(a)) => diff_maps(path, d, a, out),
        _ => {
            if !values_equal(desired, actual) {
                out.push(Difference {
                    path: path.to_string(),
                    kind: DifferenceKind::Changed,
                });
            }
        }
    }
}
