//! Accessor façade for game clients.
//!
//! Every request is validated against an [`AccessPolicy`] before any
//! coordinate is resolved or any record is touched. Reads resolve each
//! selector through the [`ScopeIndexer`] and gather the raw payloads into a
//! [`DataChunk`]. Transactional writes and removals are validated and then
//! left for the host to apply; they do not mutate the store.

mod chunk;
mod policy;

use thiserror::Error;
use tracing::{debug, warn};

use crate::codec::CodecError;
use crate::index::{IndexError, ScopeCategory, ScopeIndexer};
use crate::persist::PersistenceManager;

pub use chunk::{DataChunk, Selector, WriteItem};
pub use policy::{AccessKind, AccessPolicy, AccessRequest, AccessRule, PermitAll, RulePolicy};

#[derive(Debug, Error)]
pub enum AccessError {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("{access} access to {category} data is denied")]
  Denied { category: ScopeCategory, access: AccessKind },

  #[error(transparent)]
  Index(#[from] IndexError),

  #[error(transparent)]
  Codec(#[from] CodecError),
}

#[derive(Debug)]
pub struct CriticalDataAccessor<P = RulePolicy> {
  indexer: ScopeIndexer,
  persistence: PersistenceManager,
  policy: P,
}

impl<P: AccessPolicy> CriticalDataAccessor<P> {
  pub fn new(indexer: ScopeIndexer, persistence: PersistenceManager, policy: P) -> Self {
    Self {
      indexer,
      persistence,
      policy,
    }
  }

  pub fn indexer(&self) -> &ScopeIndexer {
    &self.indexer
  }

  pub fn indexer_mut(&mut self) -> &mut ScopeIndexer {
    &mut self.indexer
  }

  pub fn persistence(&self) -> &PersistenceManager {
    &self.persistence
  }

  pub fn persistence_mut(&mut self) -> &mut PersistenceManager {
    &mut self.persistence
  }

  pub fn policy(&self) -> &P {
    &self.policy
  }

  pub fn into_parts(self) -> (ScopeIndexer, PersistenceManager, P) {
    (self.indexer, self.persistence, self.policy)
  }

  pub fn read_non_transactional(&self, selectors: &[Selector]) -> Result<DataChunk, AccessError> {
    self.read(selectors, false)
  }

  pub fn read_transactional(&self, selectors: &[Selector]) -> Result<DataChunk, AccessError> {
    self.read(selectors, true)
  }

  pub fn write_transactional(&self, items: &[WriteItem]) -> Result<(), AccessError> {
    if items.is_empty() {
      return Err(AccessError::InvalidArgument("write item collection is empty".to_string()));
    }
    self.validate(AccessKind::Write, true, items.iter().map(|item| &item.selector))?;
    debug!(items = items.len(), "transactional write validated");
    Ok(())
  }

  pub fn remove_transactional(&self, selectors: &[Selector]) -> Result<(), AccessError> {
    if selectors.is_empty() {
      return Err(AccessError::InvalidArgument("selector collection is empty".to_string()));
    }
    self.validate(AccessKind::Remove, true, selectors)?;
    debug!(selectors = selectors.len(), "transactional removal validated");
    Ok(())
  }

  fn read(&self, selectors: &[Selector], transactional: bool) -> Result<DataChunk, AccessError> {
    if selectors.is_empty() {
      return Err(AccessError::InvalidArgument("selector collection is empty".to_string()));
    }
    self.validate(AccessKind::Read, transactional, selectors)?;

    let mut chunk = DataChunk::default();
    for selector in selectors {
      let coordinate = self
        .indexer
        .client_coordinate(selector.category, selector.identifier.as_deref())?;
      let payload = self
        .persistence
        .read_raw(coordinate.section, coordinate.scope, &selector.path)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
      debug!(%coordinate, path = %selector.path, bytes = payload.len(), "read record");
      chunk.insert(selector.clone(), payload);
    }
    Ok(chunk)
  }

  fn validate<'s>(
    &self,
    kind: AccessKind,
    transactional: bool,
    selectors: impl IntoIterator<Item = &'s Selector>,
  ) -> Result<(), AccessError> {
    let mut categories = Vec::new();
    for selector in selectors {
      if selector.path.is_empty() {
        return Err(AccessError::InvalidArgument(format!(
          "{} selector has an empty path",
          selector.category
        )));
      }
      categories.push(selector.category);
    }
    let request = AccessRequest::new(kind, transactional, categories);
    self.policy.validate(&request).inspect_err(|e| {
      warn!(access = %kind, transactional, error = %e, "access rejected");
    })
  }
}
