//! Mechanical framing of a PNG stream into chunk records.
//!
//! Nothing in this module knows what any chunk *means*. A [`ChunkReader`]
//! only handles the fixed record layout — 4-byte big-endian length, 4-byte
//! type code, the data, 4-byte CRC — and verifies each record's CRC as it
//! goes. Interpreting the chunks it produces is the next layer's job.

use core::fmt::{Debug, Write};

use crate::{crc32_over, PngError, PngResult};

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not*
///   PNG data.
#[inline]
#[must_use]
pub const fn is_png_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// A four-byte ASCII chunk type code.
///
/// Bit 5 of each byte (the ASCII case bit) is a property flag, so `IDAT` and
/// `idat` would be different chunks with different properties.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
impl ChunkType {
  /// `IHDR`: Image header, always the first chunk.
  pub const IHDR: Self = Self(*b"IHDR");
  /// `PLTE`: Palette for indexed color.
  pub const PLTE: Self = Self(*b"PLTE");
  /// `IDAT`: Compressed image data.
  pub const IDAT: Self = Self(*b"IDAT");
  /// `IEND`: Image trailer, always the last chunk.
  pub const IEND: Self = Self(*b"IEND");

  /// Ancillary chunks (lowercase first byte) can be skipped by a decoder
  /// that doesn't recognize them. Critical chunks cannot.
  #[inline]
  #[must_use]
  pub const fn is_ancillary(self) -> bool {
    (self.0[0] & 32) != 0
  }
  /// Private chunks (lowercase second byte) aren't defined by the PNG spec
  /// itself.
  #[inline]
  #[must_use]
  pub const fn is_private(self) -> bool {
    (self.0[1] & 32) != 0
  }
  /// The reserved bit (lowercase third byte) must be 0 in the current
  /// generation of the format.
  #[inline]
  #[must_use]
  pub const fn is_reserved(self) -> bool {
    (self.0[2] & 32) != 0
  }
  /// Safe-to-copy chunks (lowercase fourth byte) survive editing by
  /// software that doesn't understand them.
  #[inline]
  #[must_use]
  pub const fn is_safe_to_copy(self) -> bool {
    (self.0[3] & 32) != 0
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// Computes the CRC32 that a chunk with this type code and data would carry.
#[inline]
#[must_use]
pub fn chunk_crc(ty: ChunkType, data: &[u8]) -> u32 {
  crc32_over(&[&ty.0, data])
}

/// One chunk record out of a PNG stream, CRC already verified.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  /// The four-byte type code.
  pub ty: ChunkType,
  /// The data field, `len()` bytes of it.
  pub data: &'b [u8],
  /// The CRC stored in the stream. [`ChunkReader`] has already checked it
  /// against the computed value by the time you see the chunk.
  pub declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("ty", &self.ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl RawChunk<'_> {
  /// The chunk's declared data length.
  #[inline]
  #[must_use]
  pub const fn len(&self) -> usize {
    self.data.len()
  }
  /// If the data field is empty.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
  /// Computes the CRC over the type code and data.
  #[inline]
  #[must_use]
  pub fn compute_crc(&self) -> u32 {
    chunk_crc(self.ty, self.data)
  }
}

/// Walks a PNG byte stream producing successive verified chunk records.
///
/// Construction fails unless the stream opens with the PNG signature. After
/// that, each `next()` reads exactly one record and checks its CRC; a
/// truncated record or a CRC mismatch ends iteration with that error,
/// because a single corrupt length makes every later chunk boundary
/// untrustworthy. No chunk is ever half-read across calls.
#[derive(Debug, Clone)]
pub struct ChunkReader<'b> {
  rest: &'b [u8],
  index: usize,
  failed: bool,
}
impl<'b> ChunkReader<'b> {
  /// Makes a reader over a full PNG stream, signature included.
  #[inline]
  pub const fn new(png: &'b [u8]) -> PngResult<Self> {
    match png {
      [137, 80, 78, 71, 13, 10, 26, 10, rest @ ..] => {
        Ok(Self { rest, index: 0, failed: false })
      }
      _ => Err(PngError::Signature),
    }
  }

  fn take(&mut self, count: usize) -> PngResult<&'b [u8]> {
    if self.rest.len() < count {
      Err(PngError::Truncated)
    } else {
      let (taken, rest) = self.rest.split_at(count);
      self.rest = rest;
      Ok(taken)
    }
  }

  fn take_u32_be(&mut self) -> PngResult<u32> {
    let bytes = self.take(4)?;
    match bytes.try_into() {
      Ok(array) => Ok(u32::from_be_bytes(array)),
      Err(_) => Err(PngError::Truncated),
    }
  }

  /// Reads the next chunk record, or `Ok(None)` at a clean end of input.
  pub fn read_next(&mut self) -> PngResult<Option<RawChunk<'b>>> {
    if self.failed || self.rest.is_empty() {
      return Ok(None);
    }
    let out = self.frame_one();
    if out.is_err() {
      self.failed = true;
    }
    out
  }

  fn frame_one(&mut self) -> PngResult<Option<RawChunk<'b>>> {
    let len = self.take_u32_be()? as usize;
    let ty = ChunkType(match self.take(4)?.try_into() {
      Ok(array) => array,
      Err(_) => return Err(PngError::Truncated),
    });
    let data = self.take(len)?;
    let declared_crc = self.take_u32_be()?;
    let chunk = RawChunk { ty, data, declared_crc };
    if chunk.compute_crc() != declared_crc {
      return Err(PngError::Checksum { ty, index: self.index });
    }
    self.index += 1;
    Ok(Some(chunk))
  }
}
impl<'b> Iterator for ChunkReader<'b> {
  type Item = PngResult<RawChunk<'b>>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    self.read_next().transpose()
  }
}

#[test]
fn test_chunk_type_property_bits() {
  assert!(!ChunkType::IHDR.is_ancillary());
  assert!(!ChunkType::IHDR.is_private());
  assert!(!ChunkType::IHDR.is_reserved());
  assert!(!ChunkType::IHDR.is_safe_to_copy());
  let trns = ChunkType(*b"tRNS");
  assert!(trns.is_ancillary());
  assert!(!trns.is_private());
  assert!(!trns.is_reserved());
  assert!(!trns.is_safe_to_copy());
  let phys = ChunkType(*b"pHYs");
  assert!(phys.is_ancillary());
  assert!(phys.is_safe_to_copy());
}

#[test]
fn test_chunk_crc_matches_known_value() {
  // CRC32 of the 4 bytes "IEND" alone, a constant every PNG ends with.
  assert_eq!(chunk_crc(ChunkType::IEND, &[]), 0xAE42_6082);
}
