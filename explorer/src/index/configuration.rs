//! Index configuration: mapping plus settings for one named index

use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexConfiguration {
    pub name: String,
    /// Field name -> field definition; definitions may nest via `fields`
    #[serde(default, alias = "properties")]
    pub mapping: Map<String, Value>,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl IndexConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn create(
        name: impl Into<String>,
        mapping: Map<String, Value>,
        settings: Map<String, Value>,
    ) -> Self {
        Self {
            name: name.into(),
            mapping,
            settings,
        }
    }

    /// Build from JSON documents; both must be objects
    pub fn from_values(name: impl Into<String>, mapping: Value, settings: Value) -> Result<Self> {
        let name = name.into();
        let mapping = into_object(mapping, &name, "mapping")?;
        let settings = into_object(settings, &name, "settings")?;
        Ok(Self::create(name, mapping, settings))
    }
}

fn into_object(value: Value, index: &str, what: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(Error::invalid_argument(format!(
            "{} of index '{}' must be an object, got {}",
            what, index, other
        ))),
    }
}
