//! Compact self-describing value encoding.
//!
//! Every value starts with a [`Tag`] byte. Numbers follow as fixed-width little
//! endian; strings and byte arrays carry a `u32` length prefix.

use super::{CodecError, Storable, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
  Bool = 1,
  U8,
  U16,
  U32,
  U64,
  I8,
  I16,
  I32,
  I64,
  F32,
  F64,
  Str,
  Bytes,
  None,
  Some,
}

impl Tag {
  fn from_byte(byte: u8) -> Option<Self> {
    const TAGS: [Tag; 15] = [
      Tag::Bool,
      Tag::U8,
      Tag::U16,
      Tag::U32,
      Tag::U64,
      Tag::I8,
      Tag::I16,
      Tag::I32,
      Tag::I64,
      Tag::F32,
      Tag::F64,
      Tag::Str,
      Tag::Bytes,
      Tag::None,
      Tag::Some,
    ];
    TAGS.into_iter().find(|tag| *tag as u8 == byte)
  }
}

/// Append-only buffer for compact encoding.
#[derive(Debug, Default)]
pub struct CompactWriter {
  buf: Vec<u8>,
}

impl CompactWriter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn put_tag(&mut self, tag: Tag) {
    self.buf.push(tag as u8);
  }

  pub fn put_raw(&mut self, bytes: &[u8]) {
    self.buf.extend_from_slice(bytes);
  }

  /// Write a `u32` length prefix followed by the bytes.
  pub fn put_prefixed(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
    let len = u32::try_from(bytes.len()).map_err(|_| CodecError::NotSerializable {
      type_name: "[u8]",
      reason: format!("length {} exceeds u32 prefix", bytes.len()),
    })?;
    self.put_raw(&len.to_le_bytes());
    self.put_raw(bytes);
    Ok(())
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.buf
  }
}

/// Cursor over a compact payload.
#[derive(Debug)]
pub struct CompactReader<'a> {
  input: &'a [u8],
  pos: usize,
}

impl<'a> CompactReader<'a> {
  pub fn new(input: &'a [u8]) -> Self {
    Self { input, pos: 0 }
  }

  pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
    let end = self
      .pos
      .checked_add(n)
      .filter(|end| *end <= self.input.len())
      .ok_or_else(|| CodecError::Malformed(format!("truncated at byte {}, wanted {} more", self.pos, n)))?;
    let bytes = &self.input[self.pos..end];
    self.pos = end;
    Ok(bytes)
  }

  pub fn tag(&mut self) -> Result<Tag, CodecError> {
    let byte = self.take(1)?[0];
    Tag::from_byte(byte).ok_or_else(|| CodecError::Malformed(format!("unknown tag {byte:#04x}")))
  }

  pub fn expect_tag(&mut self, expected: Tag) -> Result<(), CodecError> {
    let found = self.tag()?;
    if found == expected {
      Ok(())
    } else {
      Err(CodecError::Malformed(format!("expected {expected:?}, found {found:?}")))
    }
  }

  pub fn take_prefixed(&mut self) -> Result<&'a [u8], CodecError> {
    let mut len = [0u8; 4];
    len.copy_from_slice(self.take(4)?);
    self.take(u32::from_le_bytes(len) as usize)
  }

  pub fn is_exhausted(&self) -> bool {
    self.pos == self.input.len()
  }
}

pub(super) fn to_bytes<T: Storable>(value: &T) -> Result<Vec<u8>, CodecError> {
  let mut out = CompactWriter::new();
  value.encode_compact(&mut out)?;
  Ok(out.into_bytes())
}

pub(super) fn from_bytes<T: Storable>(bytes: &[u8]) -> Result<T, CodecError> {
  let mut input = CompactReader::new(bytes);
  let value = T::decode_compact(&mut input)?;
  if !input.is_exhausted() {
    return Err(CodecError::Malformed(format!(
      "{} trailing bytes",
      bytes.len() - input.pos
    )));
  }
  Ok(value)
}

macro_rules! compact_number {
  ($($ty:ty => $tag:ident),* $(,)?) => {$(
    impl Storable for $ty {
      const TIER: Tier = Tier::Compact;

      fn encode_compact(&self, out: &mut CompactWriter) -> Result<(), CodecError> {
        out.put_tag(Tag::$tag);
        out.put_raw(&self.to_le_bytes());
        Ok(())
      }

      fn decode_compact(input: &mut CompactReader<'_>) -> Result<Self, CodecError> {
        input.expect_tag(Tag::$tag)?;
        let mut bytes = [0u8; std::mem::size_of::<$ty>()];
        bytes.copy_from_slice(input.take(std::mem::size_of::<$ty>())?);
        Ok(<$ty>::from_le_bytes(bytes))
      }
    }
  )*};
}

compact_number! {
  u8 => U8,
  u16 => U16,
  u32 => U32,
  u64 => U64,
  i8 => I8,
  i16 => I16,
  i32 => I32,
  i64 => I64,
  f32 => F32,
  f64 => F64,
}

impl Storable for bool {
  const TIER: Tier = Tier::Compact;

  fn encode_compact(&self, out: &mut CompactWriter) -> Result<(), CodecError> {
    out.put_tag(Tag::Bool);
    out.put_raw(&[u8::from(*self)]);
    Ok(())
  }

  fn decode_compact(input: &mut CompactReader<'_>) -> Result<Self, CodecError> {
    input.expect_tag(Tag::Bool)?;
    match input.take(1)?[0] {
      0 => Ok(false),
      1 => Ok(true),
      other => Err(CodecError::Malformed(format!("invalid bool byte {other}"))),
    }
  }
}

impl Storable for String {
  const TIER: Tier = Tier::Compact;

  fn encode_compact(&self, out: &mut CompactWriter) -> Result<(), CodecError> {
    out.put_tag(Tag::Str);
    out.put_prefixed(self.as_bytes())
  }

  fn decode_compact(input: &mut CompactReader<'_>) -> Result<Self, CodecError> {
    input.expect_tag(Tag::Str)?;
    let bytes = input.take_prefixed()?;
    String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::Malformed(format!("invalid UTF-8: {e}")))
  }
}

impl Storable for Vec<u8> {
  const TIER: Tier = Tier::Compact;

  fn encode_compact(&self, out: &mut CompactWriter) -> Result<(), CodecError> {
    out.put_tag(Tag::Bytes);
    out.put_prefixed(self)
  }

  fn decode_compact(input: &mut CompactReader<'_>) -> Result<Self, CodecError> {
    input.expect_tag(Tag::Bytes)?;
    Ok(input.take_prefixed()?.to_vec())
  }
}

impl<T: Storable> Storable for Option<T> {
  const TIER: Tier = T::TIER;

  fn encode_compact(&self, out: &mut CompactWriter) -> Result<(), CodecError> {
    match self {
      None => {
        out.put_tag(Tag::None);
        Ok(())
      }
      Some(value) => {
        out.put_tag(Tag::Some);
        value.encode_compact(out)
      }
    }
  }

  fn decode_compact(input: &mut CompactReader<'_>) -> Result<Self, CodecError> {
    match input.tag()? {
      Tag::None => Ok(None),
      Tag::Some => T::decode_compact(input).map(Some),
      other => Err(CodecError::Malformed(format!("expected option, found {other:?}"))),
    }
  }
}
