//! The error type for everything that can go wrong while parsing.

use crate::ChunkType;

/// An error from the `pngrid` crate.
///
/// A PNG parse either completes or fails as a whole: after one bad length,
/// checksum, or field, none of the later offsets in the stream can be
/// trusted, so every variant here aborts the decode that raised it. The
/// fields carry enough context (chunk type and position, or row number) to
/// diagnose the input without re-running the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PngError {
  /// The stream didn't open with the 8-byte PNG signature.
  Signature,

  /// The stream ended in the middle of a chunk record.
  Truncated,

  /// A chunk's stored CRC didn't match the CRC of its type code and data.
  Checksum {
    /// Type code of the failing chunk.
    ty: ChunkType,
    /// Position of the failing chunk, counting from 0 at the first chunk.
    index: usize,
  },

  /// A chunk appeared somewhere the ordering rules forbid.
  ///
  /// This covers a first chunk that isn't the header, a second palette, a
  /// palette after image data has started, and a palette in a grayscale
  /// image.
  ChunkOrder {
    /// Type code of the out-of-place chunk.
    ty: ChunkType,
    /// Position of the out-of-place chunk.
    index: usize,
  },

  /// A header field held a value outside its allowed set.
  ///
  /// For `bit_depth` this includes depths that are legal for *some* color
  /// type but not the one this image declared.
  InvalidHeader {
    /// Name of the offending header field.
    field: &'static str,
    /// The value that field held.
    value: u32,
  },

  /// The stream is valid PNG but uses a feature this decoder rejects.
  ///
  /// Currently that's exactly one thing: Adam7 interlacing.
  Unsupported {
    /// Name of the rejected feature.
    feature: &'static str,
  },

  /// A palette chunk's data length wasn't a multiple of 3.
  InvalidPalette {
    /// The actual data length.
    len: usize,
  },

  /// An indexed-color image had no palette chunk to index into.
  MissingPalette,

  /// A pixel referenced a palette entry that doesn't exist.
  PaletteIndex {
    /// The index the pixel asked for.
    index: usize,
    /// How many entries the palette actually has.
    palette_len: usize,
  },

  /// A scanline's leading filter byte wasn't one of the five filter types.
  FilterType {
    /// Row the bad selector appeared on, counting from 0 at the top.
    row: u32,
    /// The selector value found.
    value: u8,
  },

  /// The compressed image data wasn't a valid zlib stream.
  Inflate,

  /// The decompressed image data wasn't the size the header calls for.
  DecodeLength {
    /// `height * bytes_per_filterline`, per the header.
    expected: usize,
    /// What was actually there.
    actual: usize,
  },

  /// A reconstructed row assembled into the wrong number of pixels.
  RowLength {
    /// Row that came out wrong, counting from 0 at the top.
    row: u32,
    /// The image width, which every row must match.
    expected: usize,
    /// How many pixels the row actually produced.
    actual: usize,
  },

  /// The allocator couldn't give us enough space.
  #[cfg(feature = "alloc")]
  #[cfg_attr(docs_rs, doc(cfg(feature = "alloc")))]
  Alloc,
}

#[cfg(feature = "alloc")]
impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}

/// Alias for a `Result` with [PngError] as the error type.
pub type PngResult<T> = Result<T, PngError>;
