use std::borrow::Cow;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use super::{Codec, CodecError, GenericFormat};
use crate::store::RecordStore;

/// Compresses the inner codec's payloads and store images with gzip.
#[derive(Debug, Clone, Default)]
pub struct Gzip<C> {
  inner: C,
  level: Compression,
}

impl<C: Codec> Gzip<C> {
  pub fn new(inner: C) -> Self {
    Self::with_level(inner, Compression::default())
  }

  pub fn with_level(inner: C, level: Compression) -> Self {
    Self { inner, level }
  }

  pub fn inner(&self) -> &C {
    &self.inner
  }

  fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), self.level);
    encoder.write_all(bytes).map_err(CodecError::Compression)?;
    encoder.finish().map_err(CodecError::Compression)
  }
}

fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
  let mut decoder = GzDecoder::new(bytes);
  let mut out = Vec::new();
  decoder.read_to_end(&mut out).map_err(CodecError::Compression)?;
  Ok(out)
}

impl<C: Codec> Codec for Gzip<C> {
  fn name(&self) -> String {
    format!("{}+gzip", self.inner.name())
  }

  fn format(&self) -> GenericFormat {
    self.inner.format()
  }

  fn seal(&self, raw: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    let sealed = self.inner.seal(raw)?;
    self.compress(&sealed)
  }

  fn open<'a>(&self, sealed: &'a [u8]) -> Result<Cow<'a, [u8]>, CodecError> {
    let inflated = decompress(sealed)?;
    Ok(Cow::Owned(self.inner.open(&inflated)?.into_owned()))
  }

  fn encode_image(&self, store: &RecordStore) -> Result<Vec<u8>, CodecError> {
    let image = self.inner.encode_image(store)?;
    self.compress(&image)
  }

  fn decode_image(&self, bytes: &[u8]) -> Result<RecordStore, CodecError> {
    self.inner.decode_image(&decompress(bytes)?)
  }

  fn legacy(&self) -> Option<&dyn Codec> {
    self.inner.legacy()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codec::{CompactCodec, decode, encode};

  #[test]
  fn repetitive_payloads_shrink() {
    let codec = Gzip::new(CompactCodec);
    let value = "spin ".repeat(200);
    let plain = encode(&CompactCodec, &value).unwrap();
    let packed = encode(&codec, &value).unwrap();
    assert!(packed.len() < plain.len());
    assert_eq!(decode::<String>(&codec, Some(&packed)).unwrap(), value);
  }

  #[test]
  fn non_gzip_input_is_a_compression_error() {
    let codec = Gzip::new(CompactCodec);
    let plain = encode(&CompactCodec, &1u8).unwrap();
    assert!(matches!(
      decode::<u8>(&codec, Some(&plain)),
      Err(CodecError::Compression(_))
    ));
  }

  #[test]
  fn name_describes_stack() {
    assert_eq!(Gzip::new(CompactCodec).name(), "compact+gzip");
  }
}
