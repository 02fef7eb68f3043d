//! A numbered scope: path-keyed byte records with size accounting.

use std::cell::Cell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Path-keyed records within one scope.
///
/// `usage` is computed from the records the first time it is asked for and
/// then kept current by every mutation made through this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scope {
  #[serde(with = "payloads")]
  records: BTreeMap<String, Vec<u8>>,
  #[serde(skip)]
  size: Cell<Option<usize>>,
}

impl PartialEq for Scope {
  fn eq(&self, other: &Self) -> bool {
    self.records == other.records
  }
}

impl Eq for Scope {}

impl Scope {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.records.contains_key(path)
  }

  pub fn get(&self, path: &str) -> Option<&[u8]> {
    self.records.get(path).map(Vec::as_slice)
  }

  /// Insert or replace the record at `path` with a copy of `payload`.
  pub fn write(&mut self, path: &str, payload: &[u8]) {
    let previous = self.records.insert(path.to_string(), payload.to_vec());
    if let Some(size) = self.size.get() {
      let removed = previous.map_or(0, |p| p.len());
      self.size.set(Some(size - removed + payload.len()));
    }
  }

  /// Remove the record at `path`, returning whether one existed.
  pub fn remove(&mut self, path: &str) -> bool {
    match self.records.remove(path) {
      Some(payload) => {
        if let Some(size) = self.size.get() {
          self.size.set(Some(size - payload.len()));
        }
        true
      }
      None => false,
    }
  }

  /// Record paths in sorted order.
  pub fn paths(&self) -> Vec<String> {
    self.records.keys().cloned().collect()
  }

  /// Sum of all payload lengths.
  pub fn usage(&self) -> usize {
    match self.size.get() {
      Some(size) => size,
      None => {
        let size = self.records.values().map(Vec::len).sum();
        self.size.set(Some(size));
        size
      }
    }
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
    self.records.iter().map(|(path, payload)| (path.as_str(), payload.as_slice()))
  }
}

/// Payloads are base64 strings in human-readable formats and raw bytes otherwise.
mod payloads {
  use std::collections::BTreeMap;

  use base64::Engine;
  use base64::engine::general_purpose::STANDARD;
  use serde::de::Error as _;
  use serde::ser::SerializeMap;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(records: &BTreeMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    let human = serializer.is_human_readable();
    let mut map = serializer.serialize_map(Some(records.len()))?;
    for (path, payload) in records {
      if human {
        map.serialize_entry(path, &STANDARD.encode(payload))?;
      } else {
        map.serialize_entry(path, payload)?;
      }
    }
    map.end()
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
    if deserializer.is_human_readable() {
      let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
      encoded
        .into_iter()
        .map(|(path, text)| {
          STANDARD
            .decode(text.as_bytes())
            .map(|payload| (path, payload))
            .map_err(|e| D::Error::custom(format!("invalid base64 payload: {e}")))
        })
        .collect()
    } else {
      BTreeMap::<String, Vec<u8>>::deserialize(deserializer)
    }
  }
}
