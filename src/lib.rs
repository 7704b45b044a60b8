//! **lz4kit** - strict single-block LZ4 decoding for binary format parsers.
//!
//! Container formats often embed raw LZ4 blocks and record the decompressed
//! size somewhere in their own headers. lz4kit decodes exactly one such
//! block and reports precisely why a malformed one was rejected.
//!
//! # Modules
//! | Module | Contents |
//! |--------|----------|
//! | [`compression::lz4`] | Block decoder and size-prepended helpers |
//! | [`reader`]           | [`ByteReader`] sources: slices, cursors, buffered streams |
//! | [`error`]            | [`Lz4DecodeError`] and the library-wide [`Error`] |
//!
//! # Example
//! ```
//! use lz4kit::compression::lz4::decode_lz4_block;
//! use lz4kit::reader::SliceReader;
//!
//! // One literal 'z', then ten more copied from one byte back.
//! let block = [0x16, b'z', 0x01, 0x00, 0x00];
//! let out = decode_lz4_block(&mut SliceReader::new(&block), 11, false).unwrap();
//! assert_eq!(out, [b'z'; 11]);
//! ```

pub mod compression;
pub mod error;
pub mod reader;
pub(crate) mod utils;

pub use compression::lz4::{DecodeOptions, Lz4BlockDecoder, decode_lz4_block};
pub use error::{Error, Lz4DecodeError, Result};
pub use reader::{ByteReader, Exhausted, IoReader, SliceReader};
