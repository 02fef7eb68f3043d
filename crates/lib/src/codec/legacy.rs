use std::borrow::Cow;

use super::{Codec, CodecError, GenericFormat};
use crate::store::RecordStore;

/// Encodes with `primary`; decoding falls back to `legacy` when `primary` fails.
///
/// Used to keep reading stores and payloads written by an older format after
/// switching the writer.
#[derive(Debug, Clone, Default)]
pub struct WithLegacy<P, L> {
  primary: P,
  legacy: L,
}

impl<P: Codec, L: Codec> WithLegacy<P, L> {
  pub fn new(primary: P, legacy: L) -> Self {
    Self { primary, legacy }
  }
}

impl<P: Codec, L: Codec> Codec for WithLegacy<P, L> {
  fn name(&self) -> String {
    format!("{} (legacy: {})", self.primary.name(), self.legacy.name())
  }

  fn format(&self) -> GenericFormat {
    self.primary.format()
  }

  fn seal(&self, raw: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    self.primary.seal(raw)
  }

  fn open<'a>(&self, sealed: &'a [u8]) -> Result<Cow<'a, [u8]>, CodecError> {
    self.primary.open(sealed)
  }

  fn encode_image(&self, store: &RecordStore) -> Result<Vec<u8>, CodecError> {
    self.primary.encode_image(store)
  }

  fn decode_image(&self, bytes: &[u8]) -> Result<RecordStore, CodecError> {
    self.primary.decode_image(bytes)
  }

  fn legacy(&self) -> Option<&dyn Codec> {
    Some(&self.legacy)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codec::{CompactCodec, TextCodec, decode_store, encode_store};
  use crate::store::Section;

  #[test]
  fn writes_with_primary_format() {
    let codec = WithLegacy::new(CompactCodec, TextCodec);
    let store = RecordStore::new();
    let bytes = encode_store(&codec, &store).unwrap();
    assert!(bytes.starts_with(crate::consts::BINARY_IMAGE_MAGIC));
  }

  #[test]
  fn primary_error_is_reported_when_both_fail() {
    let codec = WithLegacy::new(CompactCodec, TextCodec);
    let err = decode_store(&codec, b"neither format").unwrap_err();
    assert!(matches!(err, CodecError::BadMagic));
  }

  #[test]
  fn reads_primary_without_touching_legacy() {
    let codec = WithLegacy::new(CompactCodec, TextCodec);
    let mut store = RecordStore::new();
    store.write(Section::ThemeAnalytics, 0, "spins", &[7]);
    let bytes = encode_store(&CompactCodec, &store).unwrap();
    assert_eq!(decode_store(&codec, &bytes).unwrap(), store);
  }
}
