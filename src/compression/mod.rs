//! Decompression for the compressed payloads found inside container formats.
//!
//! ## Submodules
//!
//! | Module  | Algorithm | Typical use |
//! |---------|-----------|-------------|
//! | [`lz4`] | LZ4 block | Single blocks embedded in a larger binary structure |
//!
//! ## Choosing the right function
//!
//! * **Size-prepended blobs** - a `u32 LE` decompressed size followed by the
//!   block; use [`lz4::decompress_lz4`].
//! * **Blocks described by a header** - the container already records both
//!   sizes; use [`lz4::read_lz4_block`] (or [`lz4::read_lz4_block_at`] to
//!   seek first) on the container's reader.
//! * **Anything else** - build a [`crate::reader::ByteReader`] over the
//!   compressed bytes and call [`lz4::decode_lz4_block`], or configure an
//!   [`lz4::Lz4BlockDecoder`] with [`lz4::DecodeOptions`].

pub mod lz4;
