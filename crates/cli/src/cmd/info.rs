//! Info command implementation.
//!
//! Displays where the store lives, how it is encoded and where it was
//! recovered from.

use std::path::Path;

use anyhow::Result;
use critstore_lib::persist::{Backing, Recovery};

use super::{load_config, open_store};
use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning};

pub fn cmd_info(config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let (config_path, config) = load_config(config)?;
  let manager = open_store(&config)?;
  let files = config.store_files();

  let sections = manager.sections();
  let scopes: usize = sections.iter().map(|s| manager.scopes(*s).len()).sum();
  let records: usize = sections
    .iter()
    .flat_map(|s| manager.scopes(*s).into_iter().map(move |scope| (*s, scope)))
    .map(|(section, scope)| manager.manifest(section, scope).len())
    .sum();

  if output.is_json() {
    let json_output = serde_json::json!({
      "config": dunce::simplified(&config_path),
      "modifier": files.modifier,
      "committed": files.committed,
      "codec": config.store.codec,
      "recovered_from": manager.recovered_from().as_str(),
      "sections": sections.len(),
      "scopes": scopes,
      "records": records,
    });
    print_json(&json_output)?;
    return Ok(());
  }

  print_success(&format!("critstore v{}", env!("CARGO_PKG_VERSION")));
  print_stat("Config", &dunce::simplified(&config_path).display().to_string());
  if let Backing::FileBacked(files) = manager.backing() {
    print_stat("Modifier", &files.modifier.display().to_string());
    print_stat("Committed", &files.committed.display().to_string());
  }
  print_stat("Codec", config.store.codec.as_str());
  print_stat("Recovered from", manager.recovered_from().as_str());
  println!();
  print_stat("Sections", &sections.len().to_string());
  print_stat("Scopes", &scopes.to_string());
  print_stat("Records", &records.to_string());

  if manager.recovered_from() == Recovery::Modifier {
    println!();
    print_warning("Committed file was unusable; the store was recovered from the modifier file");
  }

  Ok(())
}
