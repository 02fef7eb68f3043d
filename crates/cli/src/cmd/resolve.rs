use std::path::Path;

use anyhow::{Context, Result};
use critstore_lib::index::ScopeCategory;

use super::load_config;
use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_resolve(config: Option<&Path>, category: ScopeCategory, id: Option<&str>, output: OutputFormat) -> Result<()> {
  let (_, config) = load_config(config)?;
  let indexer = config.indexer();

  let coordinate = indexer
    .client_coordinate(category, id)
    .with_context(|| format!("Failed to resolve {category}"))?;

  if output.is_json() {
    print_json(&serde_json::json!({
      "category": category,
      "section": coordinate.section,
      "scope": coordinate.scope,
    }))?;
  } else {
    print_success(&coordinate.to_string());
    print_stat("Section", coordinate.section.as_str());
    print_stat("Scope", &coordinate.scope.to_string());
  }
  Ok(())
}
