use miniz_oxide::deflate::compress_to_vec_zlib;
use pngrid::{
  archive_png, chunk_crc, decode_pixel_grid, decode_to_sink, parse_png, ArchiveError,
  ChunkReader, ChunkStore, ChunkType, PixelGrid, PixelSink, PngError, RawChunk, IHDR,
  PNG_SIGNATURE,
};

fn chunk(ty: ChunkType, data: &[u8]) -> Vec<u8> {
  let mut out = Vec::new();
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(&ty.0);
  out.extend_from_slice(data);
  out.extend_from_slice(&chunk_crc(ty, data).to_be_bytes());
  out
}

fn ihdr_data(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> [u8; 13] {
  let mut out = [0; 13];
  out[0..4].copy_from_slice(&width.to_be_bytes());
  out[4..8].copy_from_slice(&height.to_be_bytes());
  out[8] = bit_depth;
  out[9] = color_type;
  out[12] = interlace;
  out
}

fn build_png(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  for c in chunks {
    out.extend_from_slice(c);
  }
  out
}

/// A whole well-formed PNG from the header fields and raw filterlines.
fn png_of(
  width: u32, height: u32, bit_depth: u8, color_type: u8, plte: Option<&[u8]>,
  filterlines: &[u8],
) -> Vec<u8> {
  let mut chunks = vec![chunk(ChunkType::IHDR, &ihdr_data(width, height, bit_depth, color_type, 0))];
  if let Some(entries) = plte {
    chunks.push(chunk(ChunkType::PLTE, entries));
  }
  chunks.push(chunk(ChunkType::IDAT, &compress_to_vec_zlib(filterlines, 6)));
  chunks.push(chunk(ChunkType::IEND, &[]));
  build_png(&chunks)
}

fn y_pixels(grid: &PixelGrid) -> &[u16] {
  match grid {
    PixelGrid::Y(b) => &b.pixels,
    _ => panic!("wrong grid variant"),
  }
}

#[test]
fn test_decode_gray8_plain_rows() {
  let png = png_of(2, 2, 8, 0, None, &[0, 10, 20, 0, 30, 40]);
  let grid = decode_pixel_grid(&png).unwrap();
  assert_eq!(y_pixels(&grid), &[10, 20, 30, 40]);
}

#[test]
fn test_decode_gray8_with_none_and_up_filters() {
  // row 0 stored plain, row 1 stored as deltas against row 0.
  let png = png_of(2, 2, 8, 0, None, &[0, 10, 20, 2, 20, 20]);
  let grid = decode_pixel_grid(&png).unwrap();
  assert_eq!(grid.width(), 2);
  assert_eq!(grid.height(), 2);
  assert_eq!(y_pixels(&grid), &[10, 20, 30, 40]);
}

#[test]
fn test_decode_indexed_through_palette() {
  // 4-bit indexes 0 and 1, two palette entries.
  let plte = [255, 0, 0, 0, 255, 0];
  let png = png_of(2, 1, 4, 3, Some(&plte), &[0, 0x01]);
  match decode_pixel_grid(&png).unwrap() {
    PixelGrid::RGB(b) => assert_eq!(b.pixels, vec![[255, 0, 0], [0, 255, 0]]),
    other => panic!("wrong grid variant: {other:?}"),
  }
  // the same image without its palette can't decode.
  let png = png_of(2, 1, 4, 3, None, &[0, 0x01]);
  assert_eq!(decode_pixel_grid(&png), Err(PngError::MissingPalette));
}

#[test]
fn test_decode_rgba16_keeps_full_samples() {
  let line = [0, 0xFF, 0x00, 0x12, 0x34, 0x00, 0x01, 0xFF, 0xFF];
  let png = png_of(1, 1, 16, 6, None, &line);
  match decode_pixel_grid(&png).unwrap() {
    PixelGrid::RGBA(b) => assert_eq!(b.pixels, vec![[0xFF00, 0x1234, 0x0001, 0xFFFF]]),
    other => panic!("wrong grid variant: {other:?}"),
  }
}

#[test]
fn test_idat_may_split_across_chunks() {
  let zlib = compress_to_vec_zlib(&[0, 10, 20, 2, 20, 20], 6);
  let (front, back) = zlib.split_at(zlib.len() / 2);
  let png = build_png(&[
    chunk(ChunkType::IHDR, &ihdr_data(2, 2, 8, 0, 0)),
    chunk(ChunkType::IDAT, front),
    chunk(ChunkType::IDAT, back),
    chunk(ChunkType::IEND, &[]),
  ]);
  let grid = decode_pixel_grid(&png).unwrap();
  assert_eq!(y_pixels(&grid), &[10, 20, 30, 40]);
}

#[test]
fn test_corrupt_bytes_fail_the_crc_check() {
  let mut png = png_of(2, 2, 8, 0, None, &[0, 10, 20, 2, 20, 20]);
  // flip a bit inside the header's data field.
  png[8 + 8 + 8] ^= 1;
  assert_eq!(
    decode_pixel_grid(&png),
    Err(PngError::Checksum { ty: ChunkType::IHDR, index: 0 })
  );
}

#[test]
fn test_truncated_streams_are_truncation_errors() {
  let mut png = png_of(2, 2, 8, 0, None, &[0, 10, 20, 2, 20, 20]);
  png.truncate(png.len() - 2); // cuts into the trailer's CRC
  assert_eq!(decode_pixel_grid(&png), Err(PngError::Truncated));
  // dropping the trailer entirely parses every chunk but never finishes.
  let no_iend = build_png(&[
    chunk(ChunkType::IHDR, &ihdr_data(2, 2, 8, 0, 0)),
    chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 10, 20, 2, 20, 20], 6)),
  ]);
  assert_eq!(decode_pixel_grid(&no_iend), Err(PngError::Truncated));
}

#[test]
fn test_interlaced_streams_are_rejected_before_decompression() {
  let png = build_png(&[
    chunk(ChunkType::IHDR, &ihdr_data(2, 2, 8, 0, 1)),
    // deliberately not a zlib stream: rejection must come first.
    chunk(ChunkType::IDAT, &[1, 2, 3]),
    chunk(ChunkType::IEND, &[]),
  ]);
  assert_eq!(
    decode_pixel_grid(&png),
    Err(PngError::Unsupported { feature: "interlace" })
  );
}

#[test]
fn test_chunk_ordering_rules() {
  let ihdr = chunk(ChunkType::IHDR, &ihdr_data(2, 1, 8, 0, 0));
  let ihdr_indexed = chunk(ChunkType::IHDR, &ihdr_data(2, 1, 4, 3, 0));
  let plte = chunk(ChunkType::PLTE, &[255, 0, 0, 0, 255, 0]);
  let idat = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2], 6));
  let iend = chunk(ChunkType::IEND, &[]);

  // the header must come first.
  let png = build_png(&[iend.clone()]);
  assert_eq!(
    parse_png(&png).unwrap_err(),
    PngError::ChunkOrder { ty: ChunkType::IEND, index: 0 }
  );
  // and must not repeat.
  let png = build_png(&[ihdr.clone(), ihdr.clone(), iend.clone()]);
  assert_eq!(
    parse_png(&png).unwrap_err(),
    PngError::ChunkOrder { ty: ChunkType::IHDR, index: 1 }
  );
  // at most one palette,
  let png =
    build_png(&[ihdr_indexed.clone(), plte.clone(), plte.clone(), idat.clone(), iend.clone()]);
  assert_eq!(
    parse_png(&png).unwrap_err(),
    PngError::ChunkOrder { ty: ChunkType::PLTE, index: 2 }
  );
  // before the image data,
  let png = build_png(&[ihdr_indexed.clone(), idat.clone(), plte.clone(), iend.clone()]);
  assert_eq!(
    parse_png(&png).unwrap_err(),
    PngError::ChunkOrder { ty: ChunkType::PLTE, index: 2 }
  );
  // and never in a grayscale image.
  let png = build_png(&[ihdr.clone(), plte.clone(), idat.clone(), iend.clone()]);
  assert_eq!(
    parse_png(&png).unwrap_err(),
    PngError::ChunkOrder { ty: ChunkType::PLTE, index: 1 }
  );
  // image data chunks must be consecutive.
  let text = chunk(ChunkType(*b"tEXt"), b"comment\0hello");
  let png = build_png(&[ihdr, idat.clone(), text, idat, iend]);
  assert_eq!(
    parse_png(&png).unwrap_err(),
    PngError::ChunkOrder { ty: ChunkType::IDAT, index: 3 }
  );
}

#[test]
fn test_bad_zlib_and_bad_lengths_are_distinct_errors() {
  // not a zlib stream at all.
  let png = build_png(&[
    chunk(ChunkType::IHDR, &ihdr_data(2, 2, 8, 0, 0)),
    chunk(ChunkType::IDAT, &[1, 2, 3]),
    chunk(ChunkType::IEND, &[]),
  ]);
  assert_eq!(decode_pixel_grid(&png), Err(PngError::Inflate));
  // a valid stream holding one row where the header promises two.
  let png = build_png(&[
    chunk(ChunkType::IHDR, &ihdr_data(2, 2, 8, 0, 0)),
    chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 10, 20], 6)),
    chunk(ChunkType::IEND, &[]),
  ]);
  assert_eq!(decode_pixel_grid(&png), Err(PngError::DecodeLength { expected: 6, actual: 3 }));
}

#[derive(Default)]
struct VecSink {
  got: Option<(IHDR, PixelGrid)>,
}
impl PixelSink for VecSink {
  fn present(&mut self, ihdr: &IHDR, grid: &PixelGrid) {
    self.got = Some((*ihdr, grid.clone()));
  }
}

#[test]
fn test_decode_to_sink_presents_once_with_the_header() {
  let png = png_of(2, 2, 8, 0, None, &[0, 10, 20, 2, 20, 20]);
  let mut sink = VecSink::default();
  decode_to_sink(&png, &mut sink).unwrap();
  let (ihdr, grid) = sink.got.unwrap();
  assert_eq!(ihdr.width, 2);
  assert_eq!(ihdr.bit_depth, 8);
  assert_eq!(y_pixels(&grid), &[10, 20, 30, 40]);
  // the sink's grid converts like any other.
  let rgba = grid.to_rgba8(&ihdr).unwrap();
  assert_eq!(rgba.pixels[0].r, 10);
  assert_eq!(rgba.pixels[3].g, 40);
  assert_eq!(rgba.pixels[3].a, 255);

  // a failed decode never reaches the sink.
  let mut sink = VecSink::default();
  assert!(decode_to_sink(&[1, 2, 3], &mut sink).is_err());
  assert!(sink.got.is_none());
}

#[derive(Default)]
struct MemStore {
  info: Vec<(String, IHDR)>,
  chunks: Vec<(String, usize, ChunkType)>,
  fail_at: Option<usize>,
}
impl ChunkStore for MemStore {
  type Error = &'static str;

  fn insert_info(&mut self, key: &str, ihdr: &IHDR) -> Result<(), Self::Error> {
    self.info.push((key.to_string(), *ihdr));
    Ok(())
  }

  fn insert_chunk(
    &mut self, key: &str, index: usize, chunk: &RawChunk<'_>,
  ) -> Result<(), Self::Error> {
    if self.fail_at == Some(index) {
      return Err("store full");
    }
    self.chunks.push((key.to_string(), index, chunk.ty));
    Ok(())
  }
}

#[test]
fn test_archive_inserts_every_chunk() {
  let png = png_of(2, 1, 4, 3, Some(&[255, 0, 0, 0, 255, 0]), &[0, 0x01]);
  let mut store = MemStore::default();
  archive_png("cat.png", &png, &mut store).unwrap();
  assert_eq!(store.info.len(), 1);
  assert_eq!(store.info[0].0, "cat.png");
  assert_eq!(store.info[0].1.width, 2);
  let types: Vec<ChunkType> = store.chunks.iter().map(|(_, _, ty)| *ty).collect();
  assert_eq!(types, vec![ChunkType::IHDR, ChunkType::PLTE, ChunkType::IDAT, ChunkType::IEND]);
  assert_eq!(store.chunks[2].1, 2);
}

#[test]
fn test_archive_stops_on_store_and_stream_errors() {
  let png = png_of(2, 2, 8, 0, None, &[0, 10, 20, 2, 20, 20]);
  let mut store = MemStore { fail_at: Some(1), ..MemStore::default() };
  assert_eq!(
    archive_png("k", &png, &mut store),
    Err(ArchiveError::Store("store full"))
  );
  assert_eq!(store.chunks.len(), 1); // just the header made it in

  let mut store = MemStore::default();
  assert_eq!(
    archive_png("k", b"not a png", &mut store),
    Err(ArchiveError::Png(PngError::Signature))
  );
}

#[test]
fn test_huge_dimensions_fail_to_allocate_instead_of_panicking() {
  // every chunk here is well-formed; only the allocation can't happen.
  let png = build_png(&[
    chunk(ChunkType::IHDR, &ihdr_data(u32::MAX, u32::MAX, 8, 6, 0)),
    chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0; 16], 6)),
    chunk(ChunkType::IEND, &[]),
  ]);
  assert_eq!(decode_pixel_grid(&png), Err(PngError::Alloc));
}

#[test]
fn test_random_bytes_never_panic() {
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    // raw bytes almost never pass the signature check.
    if let Ok(reader) = ChunkReader::new(&v) {
      for _ in reader {}
    }
    let _ = decode_pixel_grid(&v);
    // force the walk past the signature too.
    let mut signed = PNG_SIGNATURE.to_vec();
    signed.extend_from_slice(&v);
    for _ in ChunkReader::new(&signed).unwrap() {}
    let _ = decode_pixel_grid(&signed);
  }
}
