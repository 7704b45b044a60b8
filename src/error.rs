//! Library-wide error and result types.

use std::fmt;
use std::io;

/// Result alias used throughout lz4kit.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single LZ4 block could not be decoded.
///
/// Every variant is terminal for the decode call that produced it. None of
/// them carry a payload; the variant alone says which structural expectation
/// of the block was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lz4DecodeError {
    /// The literal-length extension chain overflowed or exceeded the run
    /// ceiling.
    TooManyLiterals,
    /// The input ended before a required read completed, or before the
    /// declared output size was produced.
    OutOfData,
    /// There is no output room left for the next literal or match run.
    OutputFull,
    /// A match offset decoded as zero.
    ZeroOffset,
    /// A match offset exceeds the number of bytes produced so far.
    OffsetTooLarge,
    /// The match-length extension chain overflowed or exceeded the run
    /// ceiling.
    MatchTooLong,
}

impl Lz4DecodeError {
    /// Stable snake_case name of this error kind, suitable for logs.
    pub fn kind(self) -> &'static str {
        match self {
            Lz4DecodeError::TooManyLiterals => "too_many_literals",
            Lz4DecodeError::OutOfData => "out_of_data",
            Lz4DecodeError::OutputFull => "output_full",
            Lz4DecodeError::ZeroOffset => "zero_offset",
            Lz4DecodeError::OffsetTooLarge => "offset_too_large",
            Lz4DecodeError::MatchTooLong => "match_too_long",
        }
    }
}

impl fmt::Display for Lz4DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lz4DecodeError::TooManyLiterals => write!(f, "literal run too long"),
            Lz4DecodeError::OutOfData => write!(f, "compressed data ended early"),
            Lz4DecodeError::OutputFull => write!(f, "output buffer full"),
            Lz4DecodeError::ZeroOffset => write!(f, "match offset is zero"),
            Lz4DecodeError::OffsetTooLarge => write!(f, "match offset out of range"),
            Lz4DecodeError::MatchTooLong => write!(f, "match run too long"),
        }
    }
}

impl std::error::Error for Lz4DecodeError {}

/// All errors the library can produce.
///
/// Error messages are kept intentionally terse; callers that need richer
/// context should wrap `Error` in their own type.
#[derive(Debug)]
pub enum Error {
    /// The stream ended before all expected bytes could be read.
    UnexpectedEof,
    /// An underlying I/O operation failed.
    Io(io::Error),
    /// The LZ4 block itself is malformed.
    Lz4(Lz4DecodeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => write!(f, "unexpected end of file"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Lz4(e) => write!(f, "lz4 decompression failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Lz4(e) => Some(e),
            Error::UnexpectedEof => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(e)
        }
    }
}

impl From<Lz4DecodeError> for Error {
    fn from(e: Lz4DecodeError) -> Self {
        Error::Lz4(e)
    }
}
