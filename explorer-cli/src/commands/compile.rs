use anyhow::Result;
use explorer::QueryCompiler;
use serde_json::json;

use super::QueryArgs;
use crate::config::Config;

/// Print the compiled request as JSON
pub fn run_compile(config: &Config, args: &QueryArgs) -> Result<()> {
    let builder = args.to_builder(&config.search.default_fields)?;
    let request = QueryCompiler::compile(&builder)?;

    let output = json!({ "index": request.index, "body": request.body });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
