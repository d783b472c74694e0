//! Conversion of `GET /{index}` responses into index configurations

use crate::error::malformed;
use explorer::index::normalize_settings;
use explorer::{BackendError, IndexConfiguration};
use serde_json::{Map, Value};

/// Build the configuration of `name` from a `GET /{index}` response.
///
/// The response is keyed by the concrete index name, which differs from
/// `name` when `name` is an alias; the returned configuration always carries
/// `name`.
pub fn remote_configuration(name: &str, response: Value) -> Result<IndexConfiguration, BackendError> {
    let indices = match response {
        Value::Object(indices) => indices,
        other => return Err(malformed(format!("expected index object, got {}", other))),
    };

    if indices.len() != 1 {
        return Err(malformed(format!(
            "'{}' resolves to {} indices, expected exactly one",
            name,
            indices.len()
        )));
    }

    let index = indices
        .into_iter()
        .next()
        .map(|(_, index)| index)
        .unwrap_or_default();

    let mapping = match index.pointer("/mappings/properties") {
        Some(properties) => as_object(properties.clone(), "mappings.properties")?,
        None => Map::new(),
    };

    let settings = match index.get("settings") {
        Some(settings) => as_object(settings.clone(), "settings")?,
        None => Map::new(),
    };

    Ok(IndexConfiguration::create(
        name,
        mapping,
        normalize_settings(settings),
    ))
}

fn as_object(value: Value, what: &str) -> Result<Map<String, Value>, BackendError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(malformed(format!("{} is not an object: {}", what, other))),
    }
}
