//! The image header chunk and the geometry math that hangs off of it.

use crate::{PngError, PngResult};

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  /// Grayscale.
  Y = 0,
  /// Red, Green, Blue.
  RGB = 2,
  /// Index into a palette of RGB entries.
  Index = 3,
  /// Grayscale + Alpha.
  YA = 4,
  /// Red, Green, Blue, Alpha.
  RGBA = 6,
}
impl ColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }
}
impl TryFrom<u8> for ColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => ColorType::Y,
      2 => ColorType::RGB,
      3 => ColorType::Index,
      4 => ColorType::YA,
      6 => ColorType::RGBA,
      other => {
        return Err(PngError::InvalidHeader { field: "color_type", value: other as u32 })
      }
    })
  }
}

/// Image header data, from the mandatory first chunk.
///
/// The compression method and filter method bytes are validated during
/// [`parse`](IHDR::parse) but not stored: the format defines exactly one
/// legal value for each (zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// Width in pixels. Never zero.
  pub width: u32,
  /// Height in pixels. Never zero.
  pub height: u32,
  /// Bits per sample: 1, 2, 4, 8, or 16, within what the color type allows.
  pub bit_depth: u8,
  /// The color model the samples follow.
  pub color_type: ColorType,
  /// If the image data is stored interlaced (Adam7).
  ///
  /// Parsing keeps this as plain information; the decode pipeline rejects
  /// interlaced images before touching any image data.
  pub is_interlaced: bool,
}
impl IHDR {
  /// Parses the 13-byte data field of a header chunk.
  ///
  /// Every field is checked against its allowed set, in the order the fields
  /// appear in the stream; the first violation reports the field by name.
  /// There are no defaults and no coercion.
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    match data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([*w0, *w1, *w2, *w3]);
        if width == 0 {
          return Err(PngError::InvalidHeader { field: "width", value: 0 });
        }
        let height = u32::from_be_bytes([*h0, *h1, *h2, *h3]);
        if height == 0 {
          return Err(PngError::InvalidHeader { field: "height", value: 0 });
        }
        let color_type = ColorType::try_from(*color_type)?;
        let depth_allowed = match color_type {
          ColorType::Y => [1, 2, 4, 8, 16].contains(bit_depth),
          ColorType::RGB => [8, 16].contains(bit_depth),
          ColorType::Index => [1, 2, 4, 8].contains(bit_depth),
          ColorType::YA => [8, 16].contains(bit_depth),
          ColorType::RGBA => [8, 16].contains(bit_depth),
        };
        if !depth_allowed {
          return Err(PngError::InvalidHeader {
            field: "bit_depth",
            value: *bit_depth as u32,
          });
        }
        if *compression_method != 0 {
          return Err(PngError::InvalidHeader {
            field: "compression_method",
            value: *compression_method as u32,
          });
        }
        if *filter_method != 0 {
          return Err(PngError::InvalidHeader {
            field: "filter_method",
            value: *filter_method as u32,
          });
        }
        let is_interlaced = match interlace_method {
          0 => false,
          1 => true,
          other => {
            return Err(PngError::InvalidHeader {
              field: "interlace_method",
              value: *other as u32,
            })
          }
        };
        Ok(Self { width, height, bit_depth: *bit_depth, color_type, is_interlaced })
      }
      _ => {
        Err(PngError::InvalidHeader { field: "length", value: data.len() as u32 })
      }
    }
  }

  /// Bits of sample data per pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// The filter offset distance, in bytes.
  ///
  /// Filtering works byte-wise against the byte this many positions to the
  /// left. When a pixel is one byte or more this is the bytes per complete
  /// pixel; when several pixels pack into one byte it's 1.
  #[inline]
  #[must_use]
  pub const fn filter_unit(&self) -> usize {
    let bpp = self.bits_per_pixel() / 8;
    if bpp == 0 {
      1
    } else {
      bpp
    }
  }

  /// Bytes of sample data per row, after any partial trailing byte is
  /// rounded up.
  ///
  /// Saturating: dimensions near the format's 2^31 limit can describe more
  /// bytes than a `usize` holds, and a saturated size simply fails to
  /// allocate later instead of wrapping around to a small number.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self) -> usize {
    self.bits_per_pixel().saturating_mul(self.width as usize).saturating_add(7) / 8
  }

  /// Bytes per stored row: one leading filter byte plus the sample bytes.
  #[inline]
  #[must_use]
  pub const fn bytes_per_filterline(&self) -> usize {
    self.bytes_per_scanline().saturating_add(1)
  }

  /// Exactly how many bytes the decompressed image data must hold.
  #[inline]
  #[must_use]
  pub const fn decompressed_idat_len(&self) -> usize {
    self.bytes_per_filterline().saturating_mul(self.height as usize)
  }
}
