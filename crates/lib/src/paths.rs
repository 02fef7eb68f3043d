use crate::consts::{APP_NAME, CONFIG_FILENAME, CONFIG_PATH_ENV, STORE_DIR_ENV};
use std::path::{Path, PathBuf};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE").map(PathBuf::from).unwrap_or_default()
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/"))
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir())
    .join(APP_NAME)
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
  let config_home = std::env::var("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".config"));
  config_home.join(APP_NAME)
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var("LOCALAPPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir())
    .join(APP_NAME)
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

/// Config file location: `CRITSTORE_CONFIG`, else the default in [`config_dir`].
pub fn config_path() -> PathBuf {
  std::env::var(CONFIG_PATH_ENV)
    .map(PathBuf::from)
    .unwrap_or_else(|_| config_dir().join(CONFIG_FILENAME))
}

/// Store directory: `CRITSTORE_DIR`, else `configured`, else `<data_dir>/store`.
pub fn store_dir(configured: Option<&Path>) -> PathBuf {
  if let Ok(dir) = std::env::var(STORE_DIR_ENV) {
    return PathBuf::from(dir);
  }
  configured
    .map(Path::to_path_buf)
    .unwrap_or_else(|| data_dir().join("store"))
}

#[cfg(test)]
#[cfg(not(windows))]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn xdg_config_home_takes_precedence() {
    temp_env::with_vars(
      [
        ("XDG_CONFIG_HOME", Some("/custom/config")),
        ("HOME", Some("/home/user")),
        (CONFIG_PATH_ENV, None),
      ],
      || {
        assert_eq!(config_dir(), PathBuf::from("/custom/config").join(APP_NAME));
        assert_eq!(
          config_path(),
          PathBuf::from("/custom/config/critstore/critstore.json")
        );
      },
    );
  }

  #[test]
  #[serial]
  fn xdg_fallback_to_home_directories() {
    temp_env::with_vars(
      [
        ("XDG_CONFIG_HOME", None::<&str>),
        ("XDG_DATA_HOME", None::<&str>),
        ("HOME", Some("/home/user")),
      ],
      || {
        assert_eq!(config_dir(), PathBuf::from("/home/user/.config").join(APP_NAME));
        assert_eq!(data_dir(), PathBuf::from("/home/user/.local/share").join(APP_NAME));
      },
    );
  }

  #[test]
  #[serial]
  fn store_dir_env_overrides_config() {
    temp_env::with_vars([(STORE_DIR_ENV, Some("/var/lib/critstore"))], || {
      assert_eq!(
        store_dir(Some(Path::new("/etc/ignored"))),
        PathBuf::from("/var/lib/critstore")
      );
    });
  }

  #[test]
  #[serial]
  fn store_dir_falls_back_to_data_dir() {
    temp_env::with_vars(
      [
        (STORE_DIR_ENV, None),
        ("XDG_DATA_HOME", Some("/data")),
      ],
      || {
        assert_eq!(store_dir(Some(Path::new("/srv/store"))), PathBuf::from("/srv/store"));
        assert_eq!(store_dir(None), PathBuf::from("/data/critstore/store"));
      },
    );
  }

  #[test]
  #[serial]
  fn config_path_env_override() {
    temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/alt.json"), || {
      assert_eq!(config_path(), PathBuf::from("/tmp/alt.json"));
    });
  }
}
