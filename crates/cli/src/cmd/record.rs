//! Record commands: read, write and remove single records.

use std::path::Path;

use anyhow::{Context, Result, bail};
use critstore_lib::store::Section;

use super::{load_config, open_store, open_store_for_write};
use crate::output::{format_payload, print_success};

pub fn cmd_get(config: Option<&Path>, section: Section, scope: u32, path: &str, utf8: bool) -> Result<()> {
  let (_, config) = load_config(config)?;
  let manager = open_store(&config)?;

  let Some(payload) = manager.read_raw(section, scope, path) else {
    bail!("No record at {section}/{scope}/{path}");
  };

  println!("{}", format_payload(payload, utf8));
  Ok(())
}

pub fn cmd_put(
  config: Option<&Path>,
  section: Section,
  scope: u32,
  path: &str,
  value: &str,
  force: bool,
) -> Result<()> {
  if path.is_empty() {
    bail!("Record path must not be empty");
  }
  let (_, config) = load_config(config)?;
  let mut manager = open_store_for_write(&config, force)?;

  manager.write_raw(section, scope, path, value.as_bytes());
  let written = manager.commit().context("Failed to commit store")?;

  print_success(&format!(
    "Wrote {section}/{scope}/{path} ({} bytes), committed {written} bytes",
    value.len()
  ));
  Ok(())
}

pub fn cmd_rm(config: Option<&Path>, section: Section, scope: u32, path: &str, force: bool) -> Result<()> {
  let (_, config) = load_config(config)?;
  let mut manager = open_store_for_write(&config, force)?;

  if !manager.remove(section, scope, path) {
    bail!("No record at {section}/{scope}/{path}");
  }
  manager.commit().context("Failed to commit store")?;

  print_success(&format!("Removed {section}/{scope}/{path}"));
  Ok(())
}
