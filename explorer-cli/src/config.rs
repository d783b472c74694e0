//! CLI configuration
//!
//! Default location: `./explorer.toml`, override with `--config` or
//! `EXPLORER_CONFIG`. Every section is optional.
//!
//! ```toml
//! [elasticsearch]
//! url = "http://localhost:9200"
//! timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [search]
//! default_fields = ["title", "body"]
//!
//! [[indexes]]
//! name = "posts"
//! [indexes.properties.id]
//! type = "keyword"
//! [indexes.settings.index]
//! max_ngram_diff = "2"
//! ```
//!
//! Settings values are compared with their type, and the backend reports
//! most index settings as strings, so declare them as strings too.

use anyhow::{Context, Result};
use explorer::IndexConfiguration;
use explorer_elastic::ElasticConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub elasticsearch: ElasticConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Desired index configurations, checked by `index-status`
    #[serde(default)]
    pub indexes: Vec<IndexConfiguration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Fields a free-text query is matched against; empty means all fields
    #[serde(default)]
    pub default_fields: Vec<String>,
}

impl Config {
    /// Load config from `path`, or use defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Invalid config {:?}", path))
    }

    pub fn index(&self, name: &str) -> Option<&IndexConfiguration> {
        self.indexes.iter().find(|index| index.name == name)
    }
}
