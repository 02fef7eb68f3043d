use std::path::Path;

use anyhow::Result;
use critstore_lib::store::Section;

use super::{load_config, open_store};
use crate::output::{OutputFormat, format_bytes, print_info, print_json, symbols};

pub fn cmd_ls(config: Option<&Path>, section: Option<Section>, output: OutputFormat) -> Result<()> {
  let (_, config) = load_config(config)?;
  let manager = open_store(&config)?;

  let sections = match section {
    Some(section) => vec![section],
    None => manager.sections(),
  };

  if output.is_json() {
    let listing: Vec<_> = sections
      .iter()
      .flat_map(|section| {
        let manager = &manager;
        manager.scopes(*section).into_iter().map(move |scope| {
          serde_json::json!({
            "section": section,
            "scope": scope,
            "usage": manager.usage(*section, scope),
            "records": manager.manifest(*section, scope),
          })
        })
      })
      .collect();
    print_json(&listing)?;
    return Ok(());
  }

  if sections.iter().all(|s| manager.scopes(*s).is_empty()) {
    print_info("Store is empty");
    return Ok(());
  }

  for section in sections {
    let scopes = manager.scopes(section);
    if scopes.is_empty() {
      continue;
    }
    print_info(section.as_str());
    for scope in scopes {
      println!(
        "  {} {} ({})",
        symbols::ARROW,
        scope,
        format_bytes(manager.usage(section, scope) as u64)
      );
      for path in manager.manifest(section, scope) {
        println!("      {path}");
      }
    }
  }

  Ok(())
}
