//! Archiving a PNG's chunks into external storage, without decoding them.

use crate::{ChunkReader, ChunkType, PngError, RawChunk, IHDR};

/// Storage that [`archive_png`] writes a stream's records into.
///
/// Implementations decide what a `key` means and where the bytes go; this
/// crate only drives the walk. Both methods can refuse a record, which
/// aborts the archive with that error.
pub trait ChunkStore {
  /// The implementation's own failure type.
  type Error;

  /// Accepts the parsed header of the stream under `key`.
  ///
  /// Called exactly once per archive, before any chunk is inserted.
  fn insert_info(&mut self, key: &str, ihdr: &IHDR) -> Result<(), Self::Error>;

  /// Accepts one verified chunk record, `index` counting from 0 at the
  /// header.
  fn insert_chunk(&mut self, key: &str, index: usize, chunk: &RawChunk<'_>)
    -> Result<(), Self::Error>;
}

/// An error from [`archive_png`]: either the stream was bad or the store
/// refused a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveError<E> {
  /// The stream failed to parse, so archiving stopped.
  Png(PngError),
  /// The store rejected a record.
  Store(E),
}
impl<E> From<PngError> for ArchiveError<E> {
  #[inline]
  fn from(e: PngError) -> Self {
    Self::Png(e)
  }
}

/// Walks a PNG stream and inserts every chunk record into a store.
///
/// The stream gets the same framing, CRC, header, and first-chunk checks a
/// decode would apply, but the image data is never decompressed: this is for
/// keeping streams, not pixels. Every chunk is inserted, including types
/// this crate doesn't otherwise interpret, so the stored records can
/// reproduce the file. Stops after the trailer; a stream that ends without
/// one is a truncation error, though everything before the end will already
/// have been inserted.
pub fn archive_png<S: ChunkStore>(
  key: &str, bytes: &[u8], store: &mut S,
) -> Result<(), ArchiveError<S::Error>> {
  let mut reader = ChunkReader::new(bytes)?;
  let mut index = 0;
  while let Some(chunk) = reader.read_next()? {
    if index == 0 {
      if chunk.ty != ChunkType::IHDR {
        return Err(PngError::ChunkOrder { ty: chunk.ty, index }.into());
      }
      let ihdr = IHDR::parse(chunk.data)?;
      store.insert_info(key, &ihdr).map_err(ArchiveError::Store)?;
    }
    store.insert_chunk(key, index, &chunk).map_err(ArchiveError::Store)?;
    if chunk.ty == ChunkType::IEND {
      return Ok(());
    }
    index += 1;
  }
  Err(PngError::Truncated.into())
}
