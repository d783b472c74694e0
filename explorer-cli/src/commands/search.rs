use anyhow::{Context, Result};
use explorer::Finder;
use explorer_elastic::ElasticClient;

use super::QueryArgs;
use crate::config::Config;

/// Run the search and print the decoded result as JSON
pub async fn run_search(config: &Config, args: &QueryArgs) -> Result<()> {
    let builder = args.to_builder(&config.search.default_fields)?;
    let client = ElasticClient::new(&config.elasticsearch)
        .with_context(|| format!("Invalid backend url '{}'", config.elasticsearch.url))?;

    let results = Finder::new(client)
        .find(&builder)
        .await
        .with_context(|| format!("Search on '{}' failed", args.index))?;

    tracing::info!(
        index = %args.index,
        total = results.count(),
        hits = results.hits().len(),
        "Search finished"
    );

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
