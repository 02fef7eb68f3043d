use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{self, Codec, CodecError, GenericFormat, Storable};
use crate::index::ScopeCategory;

/// Addresses one record by category, optional identifier and path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Selector {
  pub category: ScopeCategory,
  pub identifier: Option<String>,
  pub path: String,
}

impl Selector {
  /// A selector using the current context identifier.
  pub fn new(category: ScopeCategory, path: impl Into<String>) -> Self {
    Self {
      category,
      identifier: None,
      path: path.into(),
    }
  }

  pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
    self.identifier = Some(identifier.into());
    self
  }
}

/// A payload to write at a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteItem {
  pub selector: Selector,
  pub payload: Vec<u8>,
}

impl WriteItem {
  pub fn new(selector: Selector, payload: impl Into<Vec<u8>>) -> Self {
    Self {
      selector,
      payload: payload.into(),
    }
  }
}

/// Read results keyed by selector.
///
/// Selectors whose record does not exist map to an empty payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChunk {
  entries: BTreeMap<Selector, Vec<u8>>,
}

impl DataChunk {
  pub(super) fn insert(&mut self, selector: Selector, payload: Vec<u8>) {
    self.entries.insert(selector, payload);
  }

  pub fn get(&self, selector: &Selector) -> Option<&[u8]> {
    self.entries.get(selector).map(Vec::as_slice)
  }

  /// Decode the payload for `selector`; missing or empty payloads give the default.
  pub fn decode<T: Storable>(&self, codec: &dyn Codec, selector: &Selector) -> Result<T, CodecError> {
    codec::decode(codec, self.get(selector))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Selector, &[u8])> {
    self.entries.iter().map(|(selector, payload)| (selector, payload.as_slice()))
  }

  /// Opaque transfer form.
  pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
    GenericFormat::Bincode.serialize(self)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    GenericFormat::Bincode.deserialize(bytes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codec::CompactCodec;

  #[test]
  fn transfer_form_roundtrips() {
    let mut chunk = DataChunk::default();
    chunk.insert(Selector::new(ScopeCategory::GameCycle, "state"), vec![1, 2]);
    chunk.insert(
      Selector::new(ScopeCategory::Theme, "denom").with_identifier("dragon"),
      Vec::new(),
    );
    let back = DataChunk::from_bytes(&chunk.to_bytes().unwrap()).unwrap();
    assert_eq!(back, chunk);
    assert_eq!(back.len(), 2);
  }

  #[test]
  fn decode_missing_selector_is_default() {
    let chunk = DataChunk::default();
    let value: u32 = chunk
      .decode(&CompactCodec, &Selector::new(ScopeCategory::Feature, "x"))
      .unwrap();
    assert_eq!(value, 0);
  }
}
