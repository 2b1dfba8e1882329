//! Turning reconstructed scanline bytes into typed pixels.

use crate::{ColorType, Palette, PixelGrid, PngError, PngResult, IHDR};

/// Yields each sample of a packed row, most significant bits first.
///
/// Works for any depth that divides a byte (1, 2, 4, 8). Trailing padding
/// bits in the last byte come out as extra samples; callers stop at the
/// image width.
#[inline]
fn unpack_samples(line: &[u8], bit_depth: u8) -> impl Iterator<Item = u8> + '_ {
  let per_byte = (8 / bit_depth) as usize;
  let mask = ((1u16 << bit_depth) - 1) as u8;
  line.iter().flat_map(move |byte| {
    (0..per_byte).map(move |k| (byte >> (8 - (k + 1) * (bit_depth as usize))) & mask)
  })
}

fn fill_row<P>(out: &mut [P], samples: impl Iterator<Item = P>) -> usize {
  let mut count = 0;
  for (slot, sample) in out.iter_mut().zip(samples) {
    *slot = sample;
    count += 1;
  }
  count
}

#[inline]
fn be16(hi: u8, lo: u8) -> u16 {
  u16::from_be_bytes([hi, lo])
}

/// Assembles one reconstructed scanline into row `row` of a pixel grid.
///
/// `line` is a row of sample bytes as [`unfilter_scanlines`] hands them out:
/// filter byte already stripped, samples big-endian at depth 16 and packed
/// most-significant-bits-first below depth 8. The grid should be the one
/// [`PixelGrid::new_for`] makes for this same header.
///
/// Indexed color needs `palette`, and every pixel's index is checked against
/// it. Each assembled row must come out to exactly `width` pixels; a row
/// that produces any other count (a short line, a grid whose variant or size
/// doesn't match the header) is an error.
///
/// [`unfilter_scanlines`]: crate::unfilter_scanlines
pub fn assemble_row(
  ihdr: &IHDR, palette: Option<&Palette<'_>>, row: u32, line: &[u8], grid: &mut PixelGrid,
) -> PngResult<()> {
  let width = ihdr.width as usize;
  let produced: usize = match (ihdr.color_type, &mut *grid) {
    (ColorType::Y, PixelGrid::Y(b)) => match b.rows_mut().nth(row as usize) {
      None => 0,
      Some(out) => {
        if ihdr.bit_depth == 16 {
          fill_row(out, line.chunks_exact(2).map(|c| be16(c[0], c[1])))
        } else {
          fill_row(out, unpack_samples(line, ihdr.bit_depth).map(u16::from))
        }
      }
    },
    (ColorType::YA, PixelGrid::YA(b)) => match b.rows_mut().nth(row as usize) {
      None => 0,
      Some(out) => {
        if ihdr.bit_depth == 16 {
          fill_row(out, line.chunks_exact(4).map(|c| [be16(c[0], c[1]), be16(c[2], c[3])]))
        } else {
          fill_row(out, line.chunks_exact(2).map(|c| [c[0] as u16, c[1] as u16]))
        }
      }
    },
    (ColorType::RGB, PixelGrid::RGB(b)) => match b.rows_mut().nth(row as usize) {
      None => 0,
      Some(out) => {
        if ihdr.bit_depth == 16 {
          fill_row(
            out,
            line
              .chunks_exact(6)
              .map(|c| [be16(c[0], c[1]), be16(c[2], c[3]), be16(c[4], c[5])]),
          )
        } else {
          fill_row(out, line.chunks_exact(3).map(|c| [c[0] as u16, c[1] as u16, c[2] as u16]))
        }
      }
    },
    (ColorType::RGBA, PixelGrid::RGBA(b)) => match b.rows_mut().nth(row as usize) {
      None => 0,
      Some(out) => {
        if ihdr.bit_depth == 16 {
          fill_row(
            out,
            line.chunks_exact(8).map(|c| {
              [be16(c[0], c[1]), be16(c[2], c[3]), be16(c[4], c[5]), be16(c[6], c[7])]
            }),
          )
        } else {
          fill_row(
            out,
            line
              .chunks_exact(4)
              .map(|c| [c[0] as u16, c[1] as u16, c[2] as u16, c[3] as u16]),
          )
        }
      }
    },
    (ColorType::Index, PixelGrid::RGB(b)) => {
      let palette = match palette {
        Some(palette) => palette,
        None => return Err(PngError::MissingPalette),
      };
      match b.rows_mut().nth(row as usize) {
        None => 0,
        Some(out) => {
          let mut count = 0;
          let samples = unpack_samples(line, ihdr.bit_depth);
          for (slot, index) in out.iter_mut().zip(samples) {
            let [r, g, bl] = palette.get(index as usize)?;
            *slot = [r as u16, g as u16, bl as u16];
            count += 1;
          }
          count
        }
      }
    }
    _ => 0,
  };
  if produced != width {
    Err(PngError::RowLength { row, expected: width, actual: produced })
  } else {
    Ok(())
  }
}
