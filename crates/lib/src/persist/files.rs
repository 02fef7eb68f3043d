//! The modifier/committed file pair.
//!
//! ```text
//! {store_dir}/
//! ├── critical.mod   # rewritten in full on every commit
//! └── critical.dat   # copy of the last fully written modifier file
//! ```

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::PersistError;
use crate::codec::{self, Codec, CodecError};
use crate::consts::{COMMITTED_FILENAME, MODIFIER_FILENAME};
use crate::store::RecordStore;

/// Locations of the two files backing a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFiles {
  pub modifier: PathBuf,
  pub committed: PathBuf,
}

/// Why a store file could not be loaded.
#[derive(Debug)]
pub(super) enum LoadFailure {
  Missing,
  Read(io::Error),
  Decode(CodecError),
}

impl std::fmt::Display for LoadFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      LoadFailure::Missing => write!(f, "file does not exist"),
      LoadFailure::Read(e) => write!(f, "read failed: {e}"),
      LoadFailure::Decode(e) => write!(f, "decode failed: {e}"),
    }
  }
}

impl StoreFiles {
  pub fn new(modifier: impl Into<PathBuf>, committed: impl Into<PathBuf>) -> Self {
    Self {
      modifier: modifier.into(),
      committed: committed.into(),
    }
  }

  /// Default file names inside `dir`.
  pub fn in_dir(dir: &Path) -> Self {
    Self::new(dir.join(MODIFIER_FILENAME), dir.join(COMMITTED_FILENAME))
  }

  /// Fails when both paths name one file, which promoting would truncate.
  pub(super) fn ensure_distinct(&self) -> Result<(), PersistError> {
    if same_file(&self.modifier, &self.committed) {
      return Err(PersistError::SharedFile {
        path: self.committed.clone(),
      });
    }
    Ok(())
  }

  pub(super) fn load(path: &Path, codec: &dyn Codec) -> Result<RecordStore, LoadFailure> {
    let bytes = match fs::read(path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LoadFailure::Missing),
      Err(e) => return Err(LoadFailure::Read(e)),
    };
    codec::decode_store(codec, &bytes).map_err(LoadFailure::Decode)
  }

  /// Truncate and rewrite the modifier file, flushing it to disk.
  pub(super) fn write_modifier(&self, image: &[u8]) -> Result<(), PersistError> {
    let write_error = |source| PersistError::WriteModifier {
      path: self.modifier.clone(),
      source,
    };

    if let Some(parent) = self.modifier.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|source| PersistError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let mut file = File::create(&self.modifier).map_err(write_error)?;
    file.write_all(image).map_err(write_error)?;
    file.sync_all().map_err(write_error)?;
    Ok(())
  }

  /// Copy the modifier file over the committed file.
  pub(super) fn promote(&self) -> Result<(), PersistError> {
    if let Some(parent) = self.committed.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|source| PersistError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    fs::copy(&self.modifier, &self.committed).map_err(|source| PersistError::PromoteModifier {
      path: self.committed.clone(),
      source,
    })?;
    Ok(())
  }
}

fn same_file(a: &Path, b: &Path) -> bool {
  if a.components().eq(b.components()) {
    return true;
  }
  match (fs::canonicalize(a), fs::canonicalize(b)) {
    (Ok(a), Ok(b)) => a == b || same_inode(&a, &b),
    _ => false,
  }
}

#[cfg(unix)]
fn same_inode(a: &Path, b: &Path) -> bool {
  use std::os::unix::fs::MetadataExt;

  match (fs::metadata(a), fs::metadata(b)) {
    (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
    _ => false,
  }
}

#[cfg(not(unix))]
fn same_inode(_a: &Path, _b: &Path) -> bool {
  false
}
