//! The top of the pipeline: routing chunks and running whole decodes.

use alloc::vec::Vec;

use crate::{ChunkReader, ChunkType, ColorType, Palette, PngError, PngResult, RawChunk, IHDR};

#[cfg(feature = "miniz_oxide")]
use crate::{assemble_row, unfilter_scanlines, PixelGrid, PixelSink};

/// The structural content of a PNG stream: header, palette, and the
/// compressed image data, still in its separate chunks.
///
/// The image data slices concatenate (in order) into one zlib stream. The
/// chunk boundaries within it are arbitrary, so they're kept as-is rather
/// than copied into one allocation.
#[derive(Debug, Clone)]
pub struct ParsedPng<'b> {
  /// The image header.
  pub ihdr: IHDR,
  /// The palette, when the stream carries one.
  ///
  /// Mandatory for indexed color. An RGB or RGBA stream may carry one too
  /// (it's a suggested quantization there) and it's kept if so.
  pub palette: Option<Palette<'b>>,
  /// The data fields of the `IDAT` chunks, in stream order.
  pub idat: Vec<&'b [u8]>,
}

/// Routes a stream of chunks into a [`ParsedPng`], enforcing chunk order.
///
/// The rules checked here: the first chunk is the header and it appears only
/// once; at most one palette, before any image data, and never in a
/// grayscale image; image data chunks are consecutive; the trailer ends the
/// stream. Chunk types this crate doesn't know are skipped. Running out of
/// chunks before the trailer is a truncation error.
pub fn parse_chunks<'b>(
  chunks: impl Iterator<Item = PngResult<RawChunk<'b>>>,
) -> PngResult<ParsedPng<'b>> {
  let mut ihdr: Option<IHDR> = None;
  let mut palette: Option<Palette<'b>> = None;
  let mut idat: Vec<&'b [u8]> = Vec::new();
  let mut idat_ended = false;
  for (index, chunk) in chunks.enumerate() {
    let chunk = chunk?;
    if index == 0 && chunk.ty != ChunkType::IHDR {
      return Err(PngError::ChunkOrder { ty: chunk.ty, index });
    }
    match chunk.ty {
      ChunkType::IHDR => {
        if ihdr.is_some() {
          return Err(PngError::ChunkOrder { ty: chunk.ty, index });
        }
        ihdr = Some(IHDR::parse(chunk.data)?);
      }
      ChunkType::PLTE => {
        let grayscale = matches!(
          ihdr.map(|h| h.color_type),
          Some(ColorType::Y) | Some(ColorType::YA)
        );
        if palette.is_some() || !idat.is_empty() || grayscale {
          return Err(PngError::ChunkOrder { ty: chunk.ty, index });
        }
        palette = Some(Palette::from_chunk_data(chunk.data)?);
      }
      ChunkType::IDAT => {
        if idat_ended {
          return Err(PngError::ChunkOrder { ty: chunk.ty, index });
        }
        idat.push(chunk.data);
      }
      ChunkType::IEND => {
        return match ihdr {
          Some(ihdr) => Ok(ParsedPng { ihdr, palette, idat }),
          // the index 0 check already rejected a stream with no header.
          None => Err(PngError::ChunkOrder { ty: chunk.ty, index }),
        };
      }
      _ => (),
    }
    if chunk.ty != ChunkType::IDAT && !idat.is_empty() {
      idat_ended = true;
    }
  }
  Err(PngError::Truncated)
}

/// Parses a full PNG stream down to its structural content.
///
/// Signature check, chunk framing, CRC verification, header validation, and
/// chunk ordering all happen here; decompression doesn't.
#[inline]
pub fn parse_png(bytes: &[u8]) -> PngResult<ParsedPng<'_>> {
  parse_chunks(ChunkReader::new(bytes)?)
}

/// Inflates the image data chunks into exactly the buffer the header calls
/// for.
///
/// The zlib stream must decompress to exactly
/// [`decompressed_idat_len`](IHDR::decompressed_idat_len) bytes: fewer is a
/// length error, and more fails the inflate itself (the output buffer is
/// sized so it can't be overrun).
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn decompress_idat(ihdr: &IHDR, idat: &[&[u8]]) -> PngResult<Vec<u8>> {
  let expected = ihdr.decompressed_idat_len();
  let mut buffer: Vec<u8> = Vec::new();
  buffer.try_reserve(expected)?;
  buffer.resize(expected, 0);
  let actual = miniz_oxide::inflate::decompress_slice_iter_to_slice(
    &mut buffer,
    idat.iter().copied(),
    true,
    true,
  )
  .map_err(|_| PngError::Inflate)?;
  if actual != expected {
    return Err(PngError::DecodeLength { expected, actual });
  }
  Ok(buffer)
}

/// Runs the back half of the pipeline on already-parsed content.
#[cfg(feature = "miniz_oxide")]
fn decode_parsed(parsed: &ParsedPng<'_>) -> PngResult<PixelGrid> {
  let ihdr = &parsed.ihdr;
  if ihdr.is_interlaced {
    return Err(PngError::Unsupported { feature: "interlace" });
  }
  if ihdr.color_type == ColorType::Index && parsed.palette.is_none() {
    return Err(PngError::MissingPalette);
  }
  let mut decompressed = decompress_idat(ihdr, &parsed.idat)?;
  let mut grid = PixelGrid::new_for(ihdr)?;
  unfilter_scanlines(ihdr, &mut decompressed, |row, line| {
    assemble_row(ihdr, parsed.palette.as_ref(), row, line, &mut grid)
  })?;
  Ok(grid)
}

/// Decodes a full PNG stream into a [`PixelGrid`].
///
/// This is the whole pipeline in one call: chunk framing and CRC checks,
/// header and ordering validation, decompression, per-row filter
/// reconstruction, and pixel assembly (with palette dereferencing for
/// indexed color). Interlaced streams are rejected with an
/// [`Unsupported`](PngError::Unsupported) error before any of the image data
/// is touched.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn decode_pixel_grid(bytes: &[u8]) -> PngResult<PixelGrid> {
  decode_parsed(&parse_png(bytes)?)
}

/// Decodes a full PNG stream and presents the result to a [`PixelSink`].
///
/// The sink is only called when the whole decode succeeds, and it gets the
/// header alongside the grid so it knows the sample depth.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn decode_to_sink<S: PixelSink>(bytes: &[u8], sink: &mut S) -> PngResult<()> {
  let parsed = parse_png(bytes)?;
  let grid = decode_parsed(&parsed)?;
  sink.present(&parsed.ihdr, &grid);
  Ok(())
}
