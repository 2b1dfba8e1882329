//! Heap-allocated pixel grids that decoding fills in.

use alloc::vec::Vec;

use bitfrob::u8_replicate_bits;
use pixel_formats::r8g8b8a8_Srgb;

use crate::{ColorType, PngResult, IHDR};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// This is how [`Bitmap`] converts 2d coordinates into index values within
/// its payload vector. If you'd like to use the exact same function it does
/// you can.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// A direct-color image: `width * height` pixels in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P = r8g8b8a8_Srgb> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}
impl<P> Bitmap<P> {
  /// Allocates a bitmap of default pixels, or fails without aborting.
  #[inline]
  pub fn try_new(width: u32, height: u32) -> PngResult<Self>
  where
    P: Default + Clone,
  {
    let count = (width as usize).saturating_mul(height as usize);
    let mut pixels: Vec<P> = Vec::new();
    pixels.try_reserve(count)?;
    pixels.resize(count, P::default());
    Ok(Self { width, height, pixels })
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&P> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut P> {
    if x < self.width && y < self.height {
      let i = xy_width_to_index(x, y, self.width);
      self.pixels.get_mut(i)
    } else {
      None
    }
  }

  /// Iterates the rows of the image, top to bottom.
  #[inline]
  pub fn rows(&self) -> impl Iterator<Item = &[P]> {
    self.pixels.chunks_exact(self.width as usize)
  }

  /// Iterates the rows of the image mutably, top to bottom.
  #[inline]
  pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [P]> {
    self.pixels.chunks_exact_mut(self.width as usize)
  }
}

/// A decoded image in its own color model, one grid variant per model.
///
/// Samples are widened to `u16` but **not** rescaled: an 8-bit image holds
/// values in `0..=255`, a 2-bit grayscale image holds values in `0..=3`, and
/// only a 16-bit image uses the full range. Indexed-color images come out as
/// [`RGB`](Self::RGB), with the palette already dereferenced into 8-bit
/// values.
///
/// [`to_rgba8`](Self::to_rgba8) converts any variant to one common format
/// when you don't care about the source model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PixelGrid {
  /// Grayscale.
  Y(Bitmap<u16>),
  /// Grayscale + Alpha.
  YA(Bitmap<[u16; 2]>),
  /// Red, Green, Blue. Also what indexed color resolves to.
  RGB(Bitmap<[u16; 3]>),
  /// Red, Green, Blue, Alpha.
  RGBA(Bitmap<[u16; 4]>),
}
impl PixelGrid {
  /// Allocates a zeroed grid of the variant and size a header calls for.
  #[inline]
  pub fn new_for(ihdr: &IHDR) -> PngResult<Self> {
    Ok(match ihdr.color_type {
      ColorType::Y => Self::Y(Bitmap::try_new(ihdr.width, ihdr.height)?),
      ColorType::YA => Self::YA(Bitmap::try_new(ihdr.width, ihdr.height)?),
      ColorType::RGB | ColorType::Index => {
        Self::RGB(Bitmap::try_new(ihdr.width, ihdr.height)?)
      }
      ColorType::RGBA => Self::RGBA(Bitmap::try_new(ihdr.width, ihdr.height)?),
    })
  }

  /// Width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    match self {
      Self::Y(b) => b.width,
      Self::YA(b) => b.width,
      Self::RGB(b) => b.width,
      Self::RGBA(b) => b.width,
    }
  }

  /// Height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    match self {
      Self::Y(b) => b.height,
      Self::YA(b) => b.height,
      Self::RGB(b) => b.height,
      Self::RGBA(b) => b.height,
    }
  }

  /// Converts the grid to 8-bit RGBA, rescaling samples as needed.
  ///
  /// `ihdr` must be the header this grid was decoded from, since the grid
  /// itself doesn't remember its sample depth. Sub-byte samples are scaled
  /// up by bit replication, 16-bit samples keep their high byte, and missing
  /// alpha becomes fully opaque.
  pub fn to_rgba8(&self, ihdr: &IHDR) -> PngResult<Bitmap<r8g8b8a8_Srgb>> {
    // palette entries are always 8-bit, whatever depth the indexes were.
    let depth = if ihdr.color_type == ColorType::Index { 8 } else { ihdr.bit_depth };
    let s8 = |sample: u16| -> u8 {
      match depth {
        16 => (sample >> 8) as u8,
        8 => sample as u8,
        d => u8_replicate_bits(d as u32, sample as u8),
      }
    };
    let mut out: Bitmap<r8g8b8a8_Srgb> = Bitmap::try_new(self.width(), self.height())?;
    match self {
      Self::Y(b) => {
        for (p, y) in out.pixels.iter_mut().zip(b.pixels.iter()) {
          let y = s8(*y);
          *p = r8g8b8a8_Srgb { r: y, g: y, b: y, a: 0xFF };
        }
      }
      Self::YA(b) => {
        for (p, [y, a]) in out.pixels.iter_mut().zip(b.pixels.iter()) {
          let y = s8(*y);
          *p = r8g8b8a8_Srgb { r: y, g: y, b: y, a: s8(*a) };
        }
      }
      Self::RGB(b) => {
        for (p, [r, g, bl]) in out.pixels.iter_mut().zip(b.pixels.iter()) {
          *p = r8g8b8a8_Srgb { r: s8(*r), g: s8(*g), b: s8(*bl), a: 0xFF };
        }
      }
      Self::RGBA(b) => {
        for (p, [r, g, bl, a]) in out.pixels.iter_mut().zip(b.pixels.iter()) {
          *p = r8g8b8a8_Srgb { r: s8(*r), g: s8(*g), b: s8(*bl), a: s8(*a) };
        }
      }
    }
    Ok(out)
  }
}

/// Somewhere that decoded images can be handed to.
///
/// [`decode_to_sink`](crate::decode_to_sink) drives a full decode and then
/// calls [`present`](Self::present) once with the finished grid.
pub trait PixelSink {
  /// Accepts a fully decoded image.
  fn present(&mut self, ihdr: &IHDR, grid: &PixelGrid);
}
