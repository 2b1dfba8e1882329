#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for decoding PNG data streams into pixel grids.
//!
//! The general format of a PNG is that the information is stored in "chunks":
//! length-prefixed, typed, CRC-protected records. You walk the chunks in file
//! order, the first one is always the image header, and the compressed image
//! data is spread over one or more `IDAT` chunks that form a single zlib
//! stream. After decompression each image row carries a leading filter byte
//! that says how to reconstruct that row from the row above it and the bytes
//! to its left.
//!
//! ## Decoding In One Call
//! With the `alloc` and `miniz_oxide` features (both default) you can call
//! [`decode_pixel_grid`] and get a [`PixelGrid`] out of raw PNG bytes.
//!
//! ## Decoding Step By Step
//! Every stage is also public, so you can run the pipeline yourself and keep
//! control over allocation:
//!
//! 1) Walk the chunks with a [`ChunkReader`], or route them in one pass with
//!    [`parse_png`]. Every chunk is CRC-checked as it's produced.
//! 2) Inflate the concatenated `IDAT` data. [`decompress_idat`] does this
//!    with `miniz_oxide`, but any zlib inflater works — the rest of the
//!    pipeline only ever sees already-decompressed bytes.
//! 3) Call [`unfilter_scanlines`] to undo the per-row prediction filters.
//!    Your callback gets each reconstructed row of bytes, top to bottom.
//! 4) Call [`assemble_row`] to turn reconstructed bytes into typed pixels,
//!    dereferencing through the [`Palette`] for indexed color.
//!
//! Parsing never recovers from a malformed stream: one bad length or CRC
//! means every later offset is untrustworthy, so each failure aborts the
//! whole decode with a [`PngError`] describing where things went wrong.
//!
//! Interlaced (Adam7) images are detected and rejected, not decoded.

#[cfg(feature = "alloc")]
extern crate alloc;

mod crc32;
pub(crate) use crc32::*;

mod error;
pub use error::*;

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod plte;
pub use plte::*;

mod unfilter;
pub use unfilter::*;

#[cfg(feature = "alloc")]
mod grid;
#[cfg(feature = "alloc")]
pub use grid::*;

#[cfg(feature = "alloc")]
mod assemble;
#[cfg(feature = "alloc")]
pub use assemble::*;

#[cfg(feature = "alloc")]
mod decode;
#[cfg(feature = "alloc")]
pub use decode::*;

mod store;
pub use store::*;
