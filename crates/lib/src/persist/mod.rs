//! Persistence manager: owns the record store and its durable file pair.
//!
//! # Commit protocol
//!
//! 1. Serialize the whole store and rewrite the modifier file.
//! 2. Copy the modifier file over the committed file.
//! 3. Notify commit observers.
//!
//! # Recovery
//!
//! Opening a file-backed manager loads the committed file, falling back to the
//! modifier file (a crash between steps 1 and 2), then to an empty store.
//! Missing or undecodable files are logged and skipped; any other I/O error
//! while reading either file fails the open.

mod files;

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, Codec, CodecError, Storable};
use crate::store::{RecordStore, Section};

pub use files::StoreFiles;
use files::LoadFailure;

#[derive(Debug, Error)]
pub enum PersistError {
  #[error(transparent)]
  Codec(#[from] CodecError),

  #[error("failed to create store directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write modifier file {path}: {source}")]
  WriteModifier {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read store file {path}: {source}")]
  ReadStore {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("modifier and committed paths name the same file: {path}")]
  SharedFile { path: PathBuf },

  #[error("failed to promote modifier file to {path}: {source}")]
  PromoteModifier {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Where the manager keeps its data between processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backing {
  /// Memory only; commits persist nothing.
  Unbacked,
  FileBacked(StoreFiles),
}

/// Which source the live store was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
  Unbacked,
  Committed,
  Modifier,
  Cold,
}

impl Recovery {
  pub fn as_str(self) -> &'static str {
    match self {
      Recovery::Unbacked => "unbacked",
      Recovery::Committed => "committed file",
      Recovery::Modifier => "modifier file",
      Recovery::Cold => "cold start",
    }
  }
}

impl fmt::Display for Recovery {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

type CommitObserver = Box<dyn Fn() + Send + Sync>;

/// Owns one [`RecordStore`] and persists it through a [`Codec`].
///
/// No internal locking: share it across threads behind a mutex, and serialize
/// calls to [`commit`](Self::commit).
pub struct PersistenceManager {
  store: RecordStore,
  codec: Box<dyn Codec>,
  backing: Backing,
  recovery: Recovery,
  observers: Vec<CommitObserver>,
  commits: u64,
}

impl fmt::Debug for PersistenceManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PersistenceManager")
      .field("codec", &self.codec.name())
      .field("backing", &self.backing)
      .field("recovery", &self.recovery)
      .field("observers", &self.observers.len())
      .field("commits", &self.commits)
      .finish()
  }
}

impl PersistenceManager {
  /// A manager whose data lives only in memory.
  pub fn unbacked(codec: Box<dyn Codec>) -> Self {
    Self {
      store: RecordStore::new(),
      codec,
      backing: Backing::Unbacked,
      recovery: Recovery::Unbacked,
      observers: Vec::new(),
      commits: 0,
    }
  }

  /// A file-backed manager, recovering the store from `files`.
  pub fn open(files: StoreFiles, codec: Box<dyn Codec>) -> Result<Self, PersistError> {
    files.ensure_distinct()?;
    let (store, recovery) = recover(&files, codec.as_ref())?;
    info!(
      committed = %files.committed.display(),
      codec = %codec.name(),
      source = %recovery,
      "opened critical data store"
    );
    Ok(Self {
      store,
      codec,
      backing: Backing::FileBacked(files),
      recovery,
      observers: Vec::new(),
      commits: 0,
    })
  }

  pub fn codec(&self) -> &dyn Codec {
    self.codec.as_ref()
  }

  pub fn backing(&self) -> &Backing {
    &self.backing
  }

  pub fn recovered_from(&self) -> Recovery {
    self.recovery
  }

  /// Read-only view of the live store.
  pub fn store(&self) -> &RecordStore {
    &self.store
  }

  pub fn clear(&mut self, section: Section, scope: u32) {
    self.store.clear(section, scope);
  }

  pub fn contains(&self, section: Section, scope: u32, path: &str) -> bool {
    self.store.contains(section, scope, path)
  }

  pub fn read_raw(&self, section: Section, scope: u32, path: &str) -> Option<&[u8]> {
    self.store.read_raw(section, scope, path)
  }

  pub fn write_raw(&mut self, section: Section, scope: u32, path: &str, payload: &[u8]) {
    self.store.write(section, scope, path, payload);
  }

  pub fn remove(&mut self, section: Section, scope: u32, path: &str) -> bool {
    self.store.remove(section, scope, path)
  }

  pub fn swap_scopes(&mut self, section_a: Section, scope_a: u32, section_b: Section, scope_b: u32) {
    self.store.swap_scopes(section_a, scope_a, section_b, scope_b);
  }

  pub fn copy_scope(&mut self, src_section: Section, src_scope: u32, dst_section: Section, dst_scope: u32) {
    self.store.copy_scope(src_section, src_scope, dst_section, dst_scope);
  }

  pub fn manifest(&self, section: Section, scope: u32) -> Vec<String> {
    self.store.manifest(section, scope)
  }

  pub fn usage(&self, section: Section, scope: u32) -> usize {
    self.store.usage(section, scope)
  }

  pub fn sections(&self) -> Vec<Section> {
    self.store.sections()
  }

  pub fn scopes(&self, section: Section) -> Vec<u32> {
    self.store.scopes(section)
  }

  /// Encode `value` through the codec and store it at `path`.
  pub fn write<T: Storable>(&mut self, section: Section, scope: u32, path: &str, value: &T) -> Result<(), CodecError> {
    let payload = codec::encode(self.codec.as_ref(), value)?;
    self.store.write(section, scope, path, &payload);
    Ok(())
  }

  /// Decode the value at `path`; a missing record yields `T::default()`.
  pub fn read<T: Storable>(&self, section: Section, scope: u32, path: &str) -> Result<T, CodecError> {
    codec::decode(self.codec.as_ref(), self.store.read_raw(section, scope, path))
  }

  /// Register a callback fired after every successful commit.
  pub fn on_commit<F>(&mut self, observer: F)
  where
    F: Fn() + Send + Sync + 'static,
  {
    self.observers.push(Box::new(observer));
  }

  /// Number of successful commits made through this manager.
  pub fn commit_count(&self) -> u64 {
    self.commits
  }

  /// Flush the store to durable storage and notify observers.
  ///
  /// Returns the size of the written image; `0` when unbacked.
  pub fn commit(&mut self) -> Result<usize, PersistError> {
    let written = match &self.backing {
      Backing::Unbacked => {
        debug!("commit on unbacked store, nothing persisted");
        0
      }
      Backing::FileBacked(files) => {
        files.ensure_distinct()?;
        let image = codec::encode_store(self.codec.as_ref(), &self.store)?;
        debug!(modifier = %files.modifier.display(), bytes = image.len(), "writing modifier file");
        files.write_modifier(&image)?;
        files.promote()?;
        info!(committed = %files.committed.display(), bytes = image.len(), "store committed");
        image.len()
      }
    };

    self.commits += 1;
    debug!(observers = self.observers.len(), "notifying commit observers");
    for observer in &self.observers {
      observer();
    }
    Ok(written)
  }
}

fn recover(files: &StoreFiles, codec: &dyn Codec) -> Result<(RecordStore, Recovery), PersistError> {
  match StoreFiles::load(&files.committed, codec) {
    Ok(store) => return Ok((store, Recovery::Committed)),
    Err(LoadFailure::Missing) => debug!(path = %files.committed.display(), "no committed file"),
    Err(LoadFailure::Decode(e)) => warn!(path = %files.committed.display(), error = %e, "committed file unusable"),
    Err(LoadFailure::Read(source)) => {
      return Err(PersistError::ReadStore {
        path: files.committed.clone(),
        source,
      });
    }
  }

  match StoreFiles::load(&files.modifier, codec) {
    Ok(store) => {
      warn!(path = %files.modifier.display(), "recovered store from modifier file");
      return Ok((store, Recovery::Modifier));
    }
    Err(LoadFailure::Missing) => debug!(path = %files.modifier.display(), "no modifier file"),
    Err(LoadFailure::Decode(e)) => warn!(path = %files.modifier.display(), error = %e, "modifier file unusable"),
    Err(LoadFailure::Read(source)) => {
      return Err(PersistError::ReadStore {
        path: files.modifier.clone(),
        source,
      });
    }
  }

  info!("starting with an empty store");
  Ok((RecordStore::new(), Recovery::Cold))
}
