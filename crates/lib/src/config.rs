//! Store configuration.
//!
//! The configuration is a versioned JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "store": { "dir": "/var/lib/critstore", "codec": "compact-gzip" },
//!   "registry": {
//!     "themes": [{ "id": "dragon", "payvars": ["dragon-88", "dragon-92"] }],
//!     "extensions": ["jackpot"]
//!   },
//!   "access": { "deny": [{ "category": "transient", "kinds": ["read"] }] },
//!   "context": { "theme": "dragon", "paytable": "dragon-88" }
//! }
//! ```
//!
//! Every section is optional.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{AccessRule, RulePolicy};
use crate::codec::CodecKind;
use crate::consts::{COMMITTED_FILENAME, MODIFIER_FILENAME};
use crate::index::{GameContext, Registry, ScopeIndexer};
use crate::paths;
use crate::persist::StoreFiles;

/// Current config format version.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write config: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse config: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize config: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported config version {0}, expected {CONFIG_VERSION}")]
  UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  pub version: u32,
  #[serde(default)]
  pub store: StoreConfig,
  #[serde(default)]
  pub registry: Registry,
  #[serde(default)]
  pub access: AccessConfig,
  #[serde(default)]
  pub context: ContextConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dir: Option<PathBuf>,
  pub modifier: String,
  pub committed: String,
  pub codec: CodecKind,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      dir: None,
      modifier: MODIFIER_FILENAME.to_string(),
      committed: COMMITTED_FILENAME.to_string(),
      codec: CodecKind::default(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
  #[serde(default)]
  pub deny: Vec<AccessRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub theme: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub paytable: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self::new()
  }
}

impl Config {
  pub fn new() -> Self {
    Self {
      version: CONFIG_VERSION,
      store: StoreConfig::default(),
      registry: Registry::default(),
      access: AccessConfig::default(),
      context: ContextConfig::default(),
    }
  }

  /// Load a config file.
  ///
  /// Returns `Ok(None)` if the file doesn't exist.
  pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(ConfigError::Read(e)),
    };

    let config: Config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;

    if config.version != CONFIG_VERSION {
      return Err(ConfigError::UnsupportedVersion(config.version));
    }

    Ok(Some(config))
  }

  /// Load `path`, or the defaults when it doesn't exist.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    Ok(Self::load(path)?.unwrap_or_default())
  }

  pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(ConfigError::Write)?;
    }
    fs::write(path, content).map_err(ConfigError::Write)?;
    Ok(())
  }

  /// Resolved store directory, honoring the environment override.
  pub fn store_dir(&self) -> PathBuf {
    paths::store_dir(self.store.dir.as_deref())
  }

  pub fn store_files(&self) -> StoreFiles {
    let dir = self.store_dir();
    StoreFiles::new(dir.join(&self.store.modifier), dir.join(&self.store.committed))
  }

  pub fn policy(&self) -> RulePolicy {
    RulePolicy::from_rules(&self.access.deny)
  }

  pub fn game_context(&self) -> GameContext {
    GameContext {
      theme: self.context.theme.clone(),
      paytable: self.context.paytable.clone(),
    }
  }

  /// An indexer over the configured registry, primed with the configured context.
  pub fn indexer(&self) -> ScopeIndexer {
    let mut indexer = ScopeIndexer::new(self.registry.clone());
    indexer.set_context(self.game_context());
    indexer
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::access::AccessKind;
  use crate::consts::STORE_DIR_ENV;
  use crate::index::ScopeCategory;
  use crate::store::Section;
  use serial_test::serial;
  use tempfile::TempDir;

  #[test]
  fn load_missing_is_none() {
    let temp_dir = TempDir::new().unwrap();
    assert!(Config::load(&temp_dir.path().join("absent.json")).unwrap().is_none());
  }

  #[test]
  fn save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("critstore.json");

    let mut config = Config::new();
    config.store.codec = CodecKind::Text;
    config.registry = Registry::new().with_theme("dragon", ["dragon-88"]);
    config.context.theme = Some("dragon".to_string());
    config.save(&path).unwrap();

    assert_eq!(Config::load(&path).unwrap().unwrap(), config);
  }

  #[test]
  fn minimal_document_uses_defaults() {
    let config: Config = serde_json::from_str(r#"{"version": 1}"#).unwrap();
    assert_eq!(config, Config::new());
    assert_eq!(config.store.codec, CodecKind::CompactGzip);
    assert_eq!(config.store.modifier, MODIFIER_FILENAME);
  }

  #[test]
  fn unsupported_version_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("critstore.json");
    fs::write(&path, r#"{"version": 99}"#).unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::UnsupportedVersion(99))));
  }

  #[test]
  fn malformed_document_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("critstore.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
  }

  #[test]
  #[serial]
  fn store_files_follow_configured_dir() {
    temp_env::with_var(STORE_DIR_ENV, None::<&str>, || {
      let mut config = Config::new();
      config.store.dir = Some(PathBuf::from("/srv/critstore"));
      let files = config.store_files();
      assert_eq!(files.modifier, PathBuf::from("/srv/critstore/critical.mod"));
      assert_eq!(files.committed, PathBuf::from("/srv/critstore/critical.dat"));
    });
  }

  #[test]
  fn builds_policy_and_indexer() {
    let config: Config = serde_json::from_str(
      r#"{
        "version": 1,
        "registry": {"themes": [{"id": "dragon", "payvars": ["dragon-88"]}]},
        "access": {"deny": [{"category": "history", "kinds": ["write"]}]},
        "context": {"theme": "dragon", "paytable": "dragon-88"}
      }"#,
    )
    .unwrap();

    assert!(config.policy().is_denied(ScopeCategory::History, AccessKind::Write));
    let coordinate = config.indexer().client_coordinate(ScopeCategory::Payvar, None).unwrap();
    assert_eq!(coordinate.section, Section::PayvarCriticalData);
    assert_eq!(coordinate.scope, 0);
  }
}
