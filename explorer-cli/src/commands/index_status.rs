use anyhow::{anyhow, Context, Result};
use explorer::index::IndexStatus;
use explorer::{IndexChangedChecker, IndexConfiguration};
use explorer_elastic::ElasticClient;

use crate::config::Config;

/// Check every configured index (or only `only`) against the backend.
///
/// Returns true when at least one index needs to be created or rebuilt.
pub async fn run_index_status(config: &Config, only: &[String]) -> Result<bool> {
    let desired = select_indexes(config, only)?;
    if desired.is_empty() {
        println!("No indexes configured");
        return Ok(false);
    }

    let client = ElasticClient::new(&config.elasticsearch)
        .with_context(|| format!("Invalid backend url '{}'", config.elasticsearch.url))?;
    let checker = IndexChangedChecker::new(client);

    let mut changed = 0;
    for index in &desired {
        let status = checker
            .status(index)
            .await
            .with_context(|| format!("Failed to check index '{}'", index.name))?;

        match &status {
            IndexStatus::Absent => println!("{}: absent", index.name),
            IndexStatus::UpToDate => println!("{}: up-to-date", index.name),
            IndexStatus::Changed(differences) => {
                println!("{}: changed", index.name);
                for difference in differences {
                    println!("  {}", difference);
                }
            }
        }

        if status.has_changes() {
            changed += 1;
        }
    }

    tracing::info!(checked = desired.len(), changed, "Index check finished");
    Ok(changed > 0)
}

fn select_indexes<'a>(config: &'a Config, only: &[String]) -> Result<Vec<&'a IndexConfiguration>> {
    if only.is_empty() {
        return Ok(config.indexes.iter().collect());
    }

    only.iter()
        .map(|name| {
            config
                .index(name)
                .ok_or_else(|| anyhow!("Index '{}' is not configured", name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            indexes: vec![
                IndexConfiguration::new("posts"),
                IndexConfiguration::new("comments"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_select_all_by_default() {
        let config = config();
        let names: Vec<_> = select_indexes(&config, &[])
            .unwrap()
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["posts", "comments"]);
    }

    #[test]
    fn test_select_subset() {
        let config = config();
        let selected = select_indexes(&config, &["comments".to_string()]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "comments");
    }

    #[test]
    fn test_unknown_index_is_an_error() {
        let config = config();
        assert!(select_indexes(&config, &["users".to_string()]).is_err());
    }
}
