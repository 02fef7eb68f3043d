//! Generic (serde) formats used for fallback-tier values and store images.

use std::any::type_name;
use std::io::Write;

use bincode::error::EncodeError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::CodecError;
use crate::consts::{BINARY_IMAGE_MAGIC, STORE_IMAGE_VERSION};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericFormat {
  Json,
  Bincode,
}

#[derive(Serialize)]
struct ImageRef<'a> {
  version: u32,
  store: &'a RecordStore,
}

#[derive(Deserialize)]
struct Image {
  version: u32,
  store: RecordStore,
}

impl GenericFormat {
  pub fn serialize<T: Serialize>(self, value: &T) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    self.serialize_into(&mut bytes, value)?;
    Ok(bytes)
  }

  /// Stream `value` into `writer`. Writer failures surface as [`CodecError::Serialization`].
  pub fn serialize_into<W: Write, T: Serialize>(self, mut writer: W, value: &T) -> Result<(), CodecError> {
    match self {
      GenericFormat::Json => serde_json::to_writer(writer, value).map_err(|e| json_encode_error::<T>(e)),
      GenericFormat::Bincode => bincode::serde::encode_into_std_write(value, &mut writer, bincode::config::standard())
        .map(|_| ())
        .map_err(|e| bincode_encode_error::<T>(e)),
    }
  }

  pub fn deserialize<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
    match self {
      GenericFormat::Json => serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialization {
        type_name: type_name::<T>(),
        source: Box::new(e),
      }),
      GenericFormat::Bincode => {
        let (value, read) =
          bincode::serde::decode_from_slice(bytes, bincode::config::standard()).map_err(|e| {
            CodecError::Deserialization {
              type_name: type_name::<T>(),
              source: Box::new(e),
            }
          })?;
        if read != bytes.len() {
          return Err(CodecError::Malformed(format!(
            "{} trailing bytes after `{}`",
            bytes.len() - read,
            type_name::<T>()
          )));
        }
        Ok(value)
      }
    }
  }

  pub fn encode_image(self, store: &RecordStore) -> Result<Vec<u8>, CodecError> {
    let image = ImageRef {
      version: STORE_IMAGE_VERSION,
      store,
    };
    match self {
      GenericFormat::Json => serde_json::to_vec_pretty(&image).map_err(|e| json_encode_error::<RecordStore>(e)),
      GenericFormat::Bincode => {
        let mut bytes = BINARY_IMAGE_MAGIC.to_vec();
        bytes.extend(self.serialize(&image)?);
        Ok(bytes)
      }
    }
  }

  pub fn decode_image(self, bytes: &[u8]) -> Result<RecordStore, CodecError> {
    let image: Image = match self {
      GenericFormat::Json => self.deserialize(bytes)?,
      GenericFormat::Bincode => {
        let body = bytes.strip_prefix(&BINARY_IMAGE_MAGIC[..]).ok_or(CodecError::BadMagic)?;
        self.deserialize(body)?
      }
    };
    if image.version != STORE_IMAGE_VERSION {
      return Err(CodecError::UnsupportedVersion(image.version));
    }
    Ok(image.store)
  }
}

/// Data errors come from the value refusing to serialize; anything else is the mechanism.
fn json_encode_error<T>(err: serde_json::Error) -> CodecError {
  if err.is_data() {
    CodecError::NotSerializable {
      type_name: type_name::<T>(),
      reason: err.to_string(),
    }
  } else {
    CodecError::Serialization {
      type_name: type_name::<T>(),
      source: Box::new(err),
    }
  }
}

fn bincode_encode_error<T>(err: EncodeError) -> CodecError {
  match err {
    EncodeError::Serde(_) | EncodeError::Other(_) | EncodeError::OtherString(_) => CodecError::NotSerializable {
      type_name: type_name::<T>(),
      reason: err.to_string(),
    },
    other => CodecError::Serialization {
      type_name: type_name::<T>(),
      source: Box::new(other),
    },
  }
}
