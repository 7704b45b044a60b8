//! LZ4 block decompression.
//!
//! A raw LZ4 block is a run of *sequences*:
//!
//! ```text
//! token            (u8)  high nibble = literal length, low nibble = match length - 4
//! [literal length] (u8…) present when the high nibble is 15; 255 continues the chain
//! literals         (literal length bytes)
//! offset           (u16 LE) backward distance into the output, never 0
//! [match length]   (u8…) present when the low nibble is 15; 255 continues the chain
//! ```
//!
//! The final sequence stops after its literals. A block carries no size of
//! its own, so the decompressed size always comes from the surrounding
//! container: either a `u32 LE` prefix ([`decompress_lz4`]) or a size field
//! the caller has already parsed ([`decompress_lz4_with_size`],
//! [`read_lz4_block`]).

use std::io::{BufRead, Cursor, Read, Seek, SeekFrom};

use tracing::{debug, trace, warn};

use crate::error::Lz4DecodeError;
use crate::reader::{ByteReader, IoReader, SliceReader};
use crate::utils::{bytesv, le_u32};
use crate::{Error, Result};

/// Matches always cover at least this many bytes; the token stores the
/// length minus this bias.
pub const MIN_MATCH: usize = 4;

/// Default ceiling for a single literal or match run.
///
/// This is the largest input an LZ4 block can describe, so no well-formed
/// run is longer.
pub const MAX_RUN_LENGTH: usize = 0x7E00_0000;

/// A nibble of 15 means "more length bytes follow".
const RUN_MASK: u8 = 0x0F;

/// Output capacity reserved up front; beyond this the buffer grows as data
/// is actually produced.
const PREALLOCATION_LIMIT: usize = 1 << 24;

/// Literals are pulled from the reader at most this many bytes at a time.
const LITERAL_CHUNK: usize = 1 << 16;

/// Knobs for [`Lz4BlockDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Stop successfully when the output fills up instead of failing with
    /// [`Lz4DecodeError::OutputFull`].
    ///
    /// The reader is then left in the middle of a sequence and must not be
    /// used to decode anything else.
    pub allow_partial_read: bool,
    /// Longest literal or match run accepted, in bytes.
    pub max_run_length: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            allow_partial_read: false,
            max_run_length: MAX_RUN_LENGTH,
        }
    }
}

impl DecodeOptions {
    /// Default options: strict capacity, [`MAX_RUN_LENGTH`] ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [`DecodeOptions::allow_partial_read`].
    pub fn with_partial_read(mut self, allow: bool) -> Self {
        self.allow_partial_read = allow;
        self
    }

    /// Set [`DecodeOptions::max_run_length`].
    pub fn with_max_run_length(mut self, max: usize) -> Self {
        self.max_run_length = max;
        self
    }
}

/// Why the decode loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Input ended on a sequence boundary with the output complete.
    EndOfBlock,
    /// Output filled up in partial-read mode.
    Capacity,
}

/// Decoder for single LZ4 blocks.
///
/// Holds no state between calls; one value can be shared by any number of
/// decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4BlockDecoder {
    options: DecodeOptions,
}

impl Lz4BlockDecoder {
    /// Create a decoder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given options.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// The options this decoder applies.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode one block from `reader` into a fresh buffer of `output_size`
    /// bytes.
    ///
    /// Without partial reads the result is exactly `output_size` bytes long,
    /// and the block must end exactly where `reader` runs out.
    pub fn decode<R: ByteReader + ?Sized>(
        &self,
        reader: &mut R,
        output_size: usize,
    ) -> std::result::Result<Vec<u8>, Lz4DecodeError> {
        let start = reader.position();
        debug!(
            output_size,
            allow_partial_read = self.options.allow_partial_read,
            "decoding lz4 block"
        );

        let mut out = Vec::with_capacity(output_size.min(PREALLOCATION_LIMIT));
        let result = self.decode_sequences(reader, &mut out, output_size);
        let consumed = reader.position().saturating_sub(start);

        match result {
            Ok(Stop::EndOfBlock) => {
                debug!(consumed, produced = out.len(), "lz4 block decoded");
            }
            Ok(Stop::Capacity) => {
                warn!(
                    consumed,
                    produced = out.len(),
                    "output full, reader left mid-sequence"
                );
            }
            Err(e) => {
                debug!(
                    consumed,
                    produced = out.len(),
                    error = e.kind(),
                    "lz4 block rejected"
                );
            }
        }

        result.map(|_| out)
    }

    fn decode_sequences<R: ByteReader + ?Sized>(
        &self,
        reader: &mut R,
        out: &mut Vec<u8>,
        output_size: usize,
    ) -> std::result::Result<Stop, Lz4DecodeError> {
        let ceiling = self.options.max_run_length;

        loop {
            let token = reader.read_u8()?;

            let literal_len =
                read_run_length(reader, token >> 4, 0, ceiling, Lz4DecodeError::TooManyLiterals)?;
            let room = output_size - out.len();
            if literal_len > room {
                if !self.options.allow_partial_read {
                    return Err(Lz4DecodeError::OutputFull);
                }
                copy_literals(reader, out, room)?;
                return Ok(Stop::Capacity);
            }
            copy_literals(reader, out, literal_len)?;

            if reader.is_exhausted() {
                if out.len() != output_size {
                    return Err(Lz4DecodeError::OutOfData);
                }
                return Ok(Stop::EndOfBlock);
            }

            let mut offset = [0u8; 2];
            reader.read_exact(&mut offset)?;
            let offset = u16::from_le_bytes(offset) as usize;
            if offset == 0 {
                return Err(Lz4DecodeError::ZeroOffset);
            }
            if offset > out.len() {
                return Err(Lz4DecodeError::OffsetTooLarge);
            }

            let match_len = read_run_length(
                reader,
                token & RUN_MASK,
                MIN_MATCH,
                ceiling,
                Lz4DecodeError::MatchTooLong,
            )?;
            trace!(literal_len, offset, match_len, position = out.len(), "sequence");

            let room = output_size - out.len();
            if match_len > room {
                if !self.options.allow_partial_read {
                    return Err(Lz4DecodeError::OutputFull);
                }
                copy_match(out, offset, room);
                return Ok(Stop::Capacity);
            }
            copy_match(out, offset, match_len);
        }
    }
}

/// Decode one LZ4 block of `output_size` bytes from `reader`.
///
/// With `allow_partial_read`, a block that would overflow `output_size`
/// yields its first `output_size` bytes instead of
/// [`Lz4DecodeError::OutputFull`]; `reader` is then left mid-sequence.
pub fn decode_lz4_block<R: ByteReader + ?Sized>(
    reader: &mut R,
    output_size: usize,
    allow_partial_read: bool,
) -> std::result::Result<Vec<u8>, Lz4DecodeError> {
    let options = DecodeOptions::new().with_partial_read(allow_partial_read);
    Lz4BlockDecoder::with_options(options).decode(reader, output_size)
}

/// Read a length field: `nibble + bias`, extended by 255-continued bytes
/// when the nibble is saturated.
fn read_run_length<R: ByteReader + ?Sized>(
    reader: &mut R,
    nibble: u8,
    bias: usize,
    ceiling: usize,
    overrun: Lz4DecodeError,
) -> std::result::Result<usize, Lz4DecodeError> {
    let mut len = nibble as usize + bias;
    if nibble == RUN_MASK {
        loop {
            let b = reader.read_u8()?;
            len = len
                .checked_add(b as usize)
                .filter(|&n| n <= ceiling)
                .ok_or(overrun)?;
            if b != 0xFF {
                break;
            }
        }
    }
    if len > ceiling {
        return Err(overrun);
    }
    Ok(len)
}

/// Append `len` literal bytes from `reader`.
fn copy_literals<R: ByteReader + ?Sized>(
    reader: &mut R,
    out: &mut Vec<u8>,
    mut len: usize,
) -> std::result::Result<(), Lz4DecodeError> {
    while len > 0 {
        let chunk = len.min(LITERAL_CHUNK);
        let start = out.len();
        out.resize(start + chunk, 0);
        reader.read_exact(&mut out[start..])?;
        len -= chunk;
    }
    Ok(())
}

/// Append `len` bytes copied from `offset` bytes back in `out`.
///
/// `offset` must be in `1..=out.len()`. When the source overlaps the bytes
/// being written, the copy runs forward one byte at a time so each written
/// byte can feed the rest of the match.
fn copy_match(out: &mut Vec<u8>, offset: usize, len: usize) {
    let src = out.len() - offset;
    if offset >= len {
        out.extend_from_within(src..src + len);
    } else if offset == 1 {
        let b = out[src];
        out.resize(out.len() + len, b);
    } else {
        out.reserve(len);
        for i in src..src + len {
            let b = out[i];
            out.push(b);
        }
    }
}

/// Decompress an LZ4 block in the size-prepended layout.
///
/// `data` must begin with a little-endian `u32` decompressed-size prefix
/// followed by the raw LZ4 block, the layout produced by
/// `lz4_flex::compress_prepend_size`.
pub fn decompress_lz4(data: &[u8]) -> Result<Vec<u8>> {
    let mut r = Cursor::new(data);
    let size = le_u32(&mut r)? as usize;
    Ok(Lz4BlockDecoder::new().decode(&mut r, size)?)
}

/// Decompress a raw LZ4 block whose decompressed size is known from the
/// surrounding format.
pub fn decompress_lz4_with_size(data: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
    let mut r = SliceReader::new(data);
    Ok(Lz4BlockDecoder::new().decode(&mut r, decompressed_size)?)
}

/// Read a `compressed_size`-byte LZ4 block from `r` and decompress it.
///
/// `r` is left just past the compressed block.
pub fn read_lz4_block<R: Read>(
    r: &mut R,
    compressed_size: usize,
    decompressed_size: usize,
) -> Result<Vec<u8>> {
    let block = bytesv(r, compressed_size)?;
    decompress_lz4_with_size(&block, decompressed_size)
}

/// Seek to `offset` in `r`, then behave like [`read_lz4_block`].
pub fn read_lz4_block_at<R: Read + Seek>(
    r: &mut R,
    offset: u64,
    compressed_size: usize,
    decompressed_size: usize,
) -> Result<Vec<u8>> {
    r.seek(SeekFrom::Start(offset))?;
    read_lz4_block(r, compressed_size, decompressed_size)
}

/// Decompress an LZ4 block straight from a buffered stream.
///
/// The block must run to the end of `r`; bound it with [`Read::take`] when
/// it sits inside a larger stream. A failure of the stream itself is
/// reported as [`Error::Io`] rather than as truncated data.
pub fn decompress_lz4_from<R: BufRead>(r: R, decompressed_size: usize) -> Result<Vec<u8>> {
    let mut reader = IoReader::new(r);
    let result = Lz4BlockDecoder::new().decode(&mut reader, decompressed_size);
    // A failing stream can also look like a clean end of block.
    if let Some(io) = reader.take_error() {
        return Err(Error::Io(io));
    }
    Ok(result?)
}
