//! Codec strategies: typed values to payload bytes, and store images to file bytes.
//!
//! Value encoding has two tiers:
//! - compact: the value's type implements [`Storable`] with `TIER = Tier::Compact`
//!   and writes a tagged, length-prefixed form itself;
//! - generic: everything else goes through serde using the codec's
//!   [`GenericFormat`] (JSON for text codecs, bincode for compact ones).
//!
//! Codecs can be stacked: [`Gzip`] compresses whatever the inner codec produces,
//! [`WithLegacy`] decodes with a second codec when the primary one fails.

mod compact;
mod format;
mod gzip;
mod legacy;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::consts::STORE_IMAGE_VERSION;
use crate::store::RecordStore;

pub use compact::{CompactReader, CompactWriter, Tag};
pub use format::GenericFormat;
pub use gzip::Gzip;
pub use legacy::WithLegacy;

/// Boxed error source carried by serialization failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while encoding or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
  /// The value's type cannot be represented by the selected tier.
  #[error("type `{type_name}` is not serializable: {reason}")]
  NotSerializable { type_name: &'static str, reason: String },

  /// The serializer failed for a reason other than the type itself.
  #[error("failed to serialize `{type_name}`: {source}")]
  Serialization {
    type_name: &'static str,
    #[source]
    source: BoxError,
  },

  #[error("failed to deserialize `{type_name}`: {source}")]
  Deserialization {
    type_name: &'static str,
    #[source]
    source: BoxError,
  },

  #[error("malformed compact payload: {0}")]
  Malformed(String),

  #[error("store image has an invalid header")]
  BadMagic,

  #[error("unsupported store image version {0}, expected {STORE_IMAGE_VERSION}")]
  UnsupportedVersion(u32),

  #[error("compression failed: {0}")]
  Compression(#[source] std::io::Error),
}

/// Which encoding tier a [`Storable`] type uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
  Compact,
  Generic,
}

/// A value that can be written to and read from a record payload.
///
/// Types get the generic (serde) tier with an empty impl. Types with a compact
/// form set `TIER = Tier::Compact` and implement both compact methods.
///
/// Reading an absent or empty payload yields `Self::default()`.
pub trait Storable: Serialize + DeserializeOwned + Default {
  const TIER: Tier = Tier::Generic;

  fn encode_compact(&self, _out: &mut CompactWriter) -> Result<(), CodecError> {
    Err(CodecError::NotSerializable {
      type_name: std::any::type_name::<Self>(),
      reason: "no compact encoding declared".to_string(),
    })
  }

  fn decode_compact(_input: &mut CompactReader<'_>) -> Result<Self, CodecError> {
    Err(CodecError::Malformed(format!(
      "no compact decoding declared for `{}`",
      std::any::type_name::<Self>()
    )))
  }
}

/// A codec strategy.
///
/// `seal`/`open` post-process value payloads after/before tier encoding;
/// `encode_image`/`decode_image` handle a whole store.
pub trait Codec: fmt::Debug + Send + Sync {
  fn name(&self) -> String;

  /// Format used for the generic tier and for store images.
  fn format(&self) -> GenericFormat;

  fn seal(&self, raw: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    Ok(raw)
  }

  fn open<'a>(&self, sealed: &'a [u8]) -> Result<Cow<'a, [u8]>, CodecError> {
    Ok(Cow::Borrowed(sealed))
  }

  fn encode_image(&self, store: &RecordStore) -> Result<Vec<u8>, CodecError> {
    self.format().encode_image(store)
  }

  fn decode_image(&self, bytes: &[u8]) -> Result<RecordStore, CodecError> {
    self.format().decode_image(bytes)
  }

  /// Codec to retry with when decoding through this one fails.
  fn legacy(&self) -> Option<&dyn Codec> {
    None
  }
}

/// Human-readable JSON values and pretty JSON store images.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
  fn name(&self) -> String {
    "text".to_string()
  }

  fn format(&self) -> GenericFormat {
    GenericFormat::Json
  }
}

/// Bincode values and magic-prefixed bincode store images.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactCodec;

impl Codec for CompactCodec {
  fn name(&self) -> String {
    "compact".to_string()
  }

  fn format(&self) -> GenericFormat {
    GenericFormat::Bincode
  }
}

/// Encode a value into a record payload.
pub fn encode<T: Storable>(codec: &dyn Codec, value: &T) -> Result<Vec<u8>, CodecError> {
  let raw = match T::TIER {
    Tier::Compact => compact::to_bytes(value)?,
    Tier::Generic => codec.format().serialize(value)?,
  };
  codec.seal(raw)
}

/// Decode a record payload; absent or empty payloads yield the default value.
pub fn decode<T: Storable>(codec: &dyn Codec, payload: Option<&[u8]>) -> Result<T, CodecError> {
  match payload {
    Some(payload) if !payload.is_empty() => decode_payload(codec, payload),
    _ => Ok(T::default()),
  }
}

fn decode_payload<T: Storable>(codec: &dyn Codec, payload: &[u8]) -> Result<T, CodecError> {
  let attempt = codec.open(payload).and_then(|raw| match T::TIER {
    Tier::Compact => compact::from_bytes(&raw),
    Tier::Generic => codec.format().deserialize(&raw),
  });
  match (attempt, codec.legacy()) {
    (Err(err), Some(legacy)) => {
      debug!(codec = %codec.name(), legacy = %legacy.name(), error = %err, "retrying payload with legacy codec");
      decode_payload(legacy, payload).map_err(|_| err)
    }
    (result, _) => result,
  }
}

/// Serialize a full store image.
pub fn encode_store(codec: &dyn Codec, store: &RecordStore) -> Result<Vec<u8>, CodecError> {
  codec.encode_image(store)
}

/// Deserialize a full store image, following legacy codecs on failure.
pub fn decode_store(codec: &dyn Codec, bytes: &[u8]) -> Result<RecordStore, CodecError> {
  match (codec.decode_image(bytes), codec.legacy()) {
    (Err(err), Some(legacy)) => {
      debug!(codec = %codec.name(), legacy = %legacy.name(), error = %err, "retrying store image with legacy codec");
      decode_store(legacy, bytes).map_err(|_| err)
    }
    (result, _) => result,
  }
}

/// The configured codec variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecKind {
  /// JSON text.
  Text,
  Compact,
  #[default]
  CompactGzip,
  /// Writes compact; reads compact, falling back to text.
  CompactLegacyText,
}

impl CodecKind {
  pub fn build(self) -> Box<dyn Codec> {
    match self {
      CodecKind::Text => Box::new(TextCodec),
      CodecKind::Compact => Box::new(CompactCodec),
      CodecKind::CompactGzip => Box::new(Gzip::new(CompactCodec)),
      CodecKind::CompactLegacyText => Box::new(WithLegacy::new(CompactCodec, TextCodec)),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      CodecKind::Text => "text",
      CodecKind::Compact => "compact",
      CodecKind::CompactGzip => "compact-gzip",
      CodecKind::CompactLegacyText => "compact-legacy-text",
    }
  }
}

impl fmt::Display for CodecKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for CodecKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "text" => Ok(CodecKind::Text),
      "compact" => Ok(CodecKind::Compact),
      "compact-gzip" => Ok(CodecKind::CompactGzip),
      "compact-legacy-text" => Ok(CodecKind::CompactLegacyText),
      other => Err(format!("unknown codec: {other}")),
    }
  }
}
