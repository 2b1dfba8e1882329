//! The palette chunk for indexed color.

use core::fmt::Debug;

use crate::{PngError, PngResult};

/// Palette data.
///
/// Palette entries are always 8-bit RGB, in file order, and pixel sample
/// values index into them starting from entry 0. Looking up an index the
/// palette doesn't have is an error, never a clamp: a stream that refers to
/// missing entries is malformed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Palette<'b>(&'b [[u8; 3]]);
impl<'b> Palette<'b> {
  /// Makes a palette from a `PLTE` chunk's data field.
  ///
  /// Fails unless the data length divides evenly into 3-byte entries.
  #[inline]
  pub fn from_chunk_data(data: &'b [u8]) -> PngResult<Self> {
    match bytemuck::try_cast_slice::<u8, [u8; 3]>(data) {
      Ok(entries) => Ok(Self(entries)),
      Err(_) => Err(PngError::InvalidPalette { len: data.len() }),
    }
  }

  /// Gets the entries as a slice.
  #[inline]
  #[must_use]
  pub const fn entries(&self) -> &'b [[u8; 3]] {
    self.0
  }

  /// How many entries the palette holds.
  #[inline]
  #[must_use]
  pub const fn len(&self) -> usize {
    self.0.len()
  }

  /// If the palette holds no entries.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Dereferences one pixel index to its RGB entry.
  #[inline]
  pub fn get(&self, index: usize) -> PngResult<[u8; 3]> {
    match self.0.get(index) {
      Some(entry) => Ok(*entry),
      None => Err(PngError::PaletteIndex { index, palette_len: self.0.len() }),
    }
  }
}
impl Debug for Palette<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("Palette").field(&&self.0[..self.0.len().min(4)]).field(&self.0.len()).finish()
  }
}
