mod info;
mod ls;
mod record;
mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use critstore_lib::config::Config;
use critstore_lib::paths;
use critstore_lib::persist::{Backing, PersistenceManager, Recovery};
use tracing::{debug, warn};

pub use info::cmd_info;
pub use ls::cmd_ls;
pub use record::{cmd_get, cmd_put, cmd_rm};
pub use resolve::cmd_resolve;

/// Config path from `--config`, else the environment/default location.
fn config_path(explicit: Option<&Path>) -> PathBuf {
  explicit.map(Path::to_path_buf).unwrap_or_else(paths::config_path)
}

/// Load the config, falling back to defaults when the default file is absent.
///
/// An explicitly passed `--config` must exist.
fn load_config(explicit: Option<&Path>) -> Result<(PathBuf, Config)> {
  let path = config_path(explicit);
  let loaded = Config::load(&path).with_context(|| format!("Failed to load config {}", path.display()))?;
  let config = match (loaded, explicit) {
    (Some(config), _) => config,
    (None, Some(_)) => bail!("Config file not found: {}", path.display()),
    (None, None) => {
      debug!(path = %path.display(), "no config file, using defaults");
      Config::default()
    }
  };
  Ok((path, config))
}

fn open_store(config: &Config) -> Result<PersistenceManager> {
  let files = config.store_files();
  PersistenceManager::open(files.clone(), config.store.codec.build())
    .with_context(|| format!("Failed to open store {}", files.committed.display()))
}

/// Open the store for a command that commits.
///
/// A cold start over existing files means they could not be decoded, usually
/// because the configured codec differs from the one that wrote them.
/// Committing would replace every record, so that needs `force`.
fn open_store_for_write(config: &Config, force: bool) -> Result<PersistenceManager> {
  let manager = open_store(config)?;
  if manager.recovered_from() != Recovery::Cold {
    return Ok(manager);
  }
  let existing = match manager.backing() {
    Backing::FileBacked(files) => [&files.committed, &files.modifier]
      .into_iter()
      .find(|path| path.exists())
      .cloned(),
    Backing::Unbacked => None,
  };
  if let Some(existing) = existing {
    if !force {
      bail!(
        "Store file {} exists but could not be loaded with the {} codec; refusing to overwrite it (pass --force to replace the store)",
        existing.display(),
        config.store.codec
      );
    }
    warn!(path = %existing.display(), "replacing unreadable store file");
  }
  Ok(manager)
}
