//! Undoing the per-row prediction filters on decompressed image data.

use crate::{PngError, PngResult, IHDR};

/// The Paeth predictor: whichever of `a` (left), `b` (above), `c` (above
/// left) is closest to `a + b - c`.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // Note: the PNG spec is extremely specific that you shall not, under any
  // circumstances, alter the order of evaluation of this expression's tests.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reconstructs every scanline of `decompressed` in place, top to bottom.
///
/// `decompressed` must hold exactly `height` filterlines — a filter-type
/// byte then `bytes_per_scanline` filtered bytes each — which is what
/// inflating the image data of a well-formed stream produces. Each row is
/// reconstructed from the already-reconstructed row above it (an implied
/// all-zero row for the first) and from its own bytes at the filter offset
/// distance to the left, so rows can only be processed strictly in order,
/// and only the previous row is live state at any point.
///
/// As each row finishes, `op(row, bytes)` receives its reconstructed sample
/// bytes (filter byte not included). An error from `op` aborts the whole
/// pass.
pub fn unfilter_scanlines<F>(ihdr: &IHDR, decompressed: &mut [u8], mut op: F) -> PngResult<()>
where
  F: FnMut(u32, &[u8]) -> PngResult<()>,
{
  let expected = ihdr.decompressed_idat_len();
  if decompressed.len() != expected {
    return Err(PngError::DecodeLength { expected, actual: decompressed.len() });
  }
  let bpp = ihdr.filter_unit();
  let mut prev: Option<&[u8]> = None;
  for (y, filterline) in decompressed.chunks_exact_mut(ihdr.bytes_per_filterline()).enumerate() {
    let (filter, line) = filterline.split_at_mut(1);
    match filter[0] {
      0 => (),
      1 => {
        // Sub
        for j in bpp..line.len() {
          line[j] = line[j].wrapping_add(line[j - bpp]);
        }
      }
      2 => {
        // Up: no effect on the first row, where `b` is all zero.
        if let Some(b_line) = prev {
          line.iter_mut().zip(b_line.iter()).for_each(|(x, b)| *x = x.wrapping_add(*b));
        }
      }
      3 => {
        // Average
        for j in 0..line.len() {
          let a = if j >= bpp { line[j - bpp] as u32 } else { 0 };
          let b = match prev {
            Some(b_line) => b_line[j] as u32,
            None => 0,
          };
          line[j] = line[j].wrapping_add(((a + b) / 2) as u8);
        }
      }
      4 => {
        // Paeth
        for j in 0..line.len() {
          let a = if j >= bpp { line[j - bpp] } else { 0 };
          let (b, c) = match prev {
            Some(b_line) => (b_line[j], if j >= bpp { b_line[j - bpp] } else { 0 }),
            None => (0, 0),
          };
          line[j] = line[j].wrapping_add(paeth_predict(a, b, c));
        }
      }
      value => return Err(PngError::FilterType { row: y as u32, value }),
    }
    op(y as u32, line)?;
    prev = Some(line);
  }
  Ok(())
}
