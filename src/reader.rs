//! Forward-only byte sources the block decoder reads from.
//!
//! The decoder never seeks: it needs to pull exact byte counts, to know when
//! the source has run dry, and to report how far it got. [`ByteReader`]
//! captures exactly that, so the same decoder runs over a bare slice, a
//! [`Cursor`] a container parser is already walking, or any buffered
//! [`std::io::Read`].

use std::fmt;
use std::io::{self, BufRead, Cursor};

use crate::error::Lz4DecodeError;

/// The source ran out of bytes before a read could be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte source exhausted")
    }
}

impl std::error::Error for Exhausted {}

impl From<Exhausted> for Lz4DecodeError {
    fn from(_: Exhausted) -> Self {
        Lz4DecodeError::OutOfData
    }
}

/// A sequential byte source.
pub trait ByteReader {
    /// Fill `buf` completely, or report [`Exhausted`].
    ///
    /// On failure the contents of `buf` and the reader position are
    /// unspecified.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Exhausted>;

    /// Whether no further byte can be read.
    fn is_exhausted(&mut self) -> bool;

    /// Number of bytes consumed so far.
    fn position(&self) -> u64;

    /// Read one byte.
    #[inline]
    fn read_u8(&mut self) -> Result<u8, Exhausted> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }
}

impl<B: ByteReader + ?Sized> ByteReader for &mut B {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Exhausted> {
        (**self).read_exact(buf)
    }

    #[inline]
    fn is_exhausted(&mut self) -> bool {
        (**self).is_exhausted()
    }

    #[inline]
    fn position(&self) -> u64 {
        (**self).position()
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, Exhausted> {
        (**self).read_u8()
    }
}

/// Borrowed cursor over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// The bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        let data = self.data;
        &data[self.pos..]
    }
}

impl ByteReader for SliceReader<'_> {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Exhausted> {
        let src = self
            .data
            .get(self.pos..self.pos + buf.len())
            .ok_or(Exhausted)?;
        buf.copy_from_slice(src);
        self.pos += buf.len();
        Ok(())
    }

    #[inline]
    fn is_exhausted(&mut self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    fn position(&self) -> u64 {
        self.pos as u64
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, Exhausted> {
        let b = *self.data.get(self.pos).ok_or(Exhausted)?;
        self.pos += 1;
        Ok(b)
    }
}

/// Lets a container parser hand its own cursor to the decoder; the cursor
/// ends up positioned just past the compressed block.
impl<T: AsRef<[u8]>> ByteReader for Cursor<T> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Exhausted> {
        let data = self.get_ref().as_ref();
        let start = usize::try_from(Cursor::position(self)).map_err(|_| Exhausted)?;
        let src = start
            .checked_add(buf.len())
            .and_then(|end| data.get(start..end))
            .ok_or(Exhausted)?;
        buf.copy_from_slice(src);
        self.set_position((start + buf.len()) as u64);
        Ok(())
    }

    fn is_exhausted(&mut self) -> bool {
        Cursor::position(self) >= self.get_ref().as_ref().len() as u64
    }

    fn position(&self) -> u64 {
        Cursor::position(self)
    }
}

/// Adapter over any buffered [`std::io::Read`].
///
/// An I/O failure looks like exhaustion to the decoder; the failure itself
/// is kept and can be recovered with [`IoReader::take_error`].
pub struct IoReader<R> {
    inner: R,
    consumed: u64,
    error: Option<io::Error>,
}

impl<R: BufRead> IoReader<R> {
    /// Wrap `inner`, counting bytes from its current position.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            consumed: 0,
            error: None,
        }
    }

    /// The I/O failure that ended the last read, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Unwrap this `IoReader`, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> ByteReader for IoReader<R> {
    fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<(), Exhausted> {
        while !buf.is_empty() {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(e);
                    return Err(Exhausted);
                }
            };
            if available.is_empty() {
                return Err(Exhausted);
            }
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            self.inner.consume(n);
            self.consumed += n as u64;
            buf = &mut buf[n..];
        }
        Ok(())
    }

    fn is_exhausted(&mut self) -> bool {
        loop {
            match self.inner.fill_buf() {
                Ok(available) => return available.is_empty(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(e);
                    return true;
                }
            }
        }
    }

    fn position(&self) -> u64 {
        self.consumed
    }
}

impl<R> fmt::Debug for IoReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoReader")
            .field("consumed", &self.consumed)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Read};

    use super::*;

    #[test]
    fn slice_reader_tracks_position() {
        let mut r = SliceReader::new(&[1, 2, 3, 4, 5]);
        let mut buf = [0u8; 2];
        r.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(r.read_u8(), Ok(3));
        assert_eq!(r.position(), 3);
        assert_eq!(r.remaining(), &[4, 5]);
        assert!(!r.is_exhausted());

        let mut big = [0u8; 3];
        assert_eq!(r.read_exact(&mut big), Err(Exhausted));
        r.read_exact(&mut buf).unwrap();
        assert!(r.is_exhausted());
        assert_eq!(r.read_u8(), Err(Exhausted));
    }

    #[test]
    fn cursor_starts_at_its_own_position() {
        let mut c = Cursor::new(vec![9u8, 8, 7, 6]);
        c.set_position(2);
        assert_eq!(ByteReader::read_u8(&mut c), Ok(7));
        assert_eq!(ByteReader::position(&c), 3);
        assert!(!ByteReader::is_exhausted(&mut c));
        let mut buf = [0u8; 2];
        assert_eq!(ByteReader::read_exact(&mut c, &mut buf), Err(Exhausted));
    }

    #[test]
    fn io_reader_spans_buffer_refills() {
        let data: Vec<u8> = (0..=255).collect();
        let mut r = IoReader::new(BufReader::with_capacity(7, data.as_slice()));
        let mut buf = [0u8; 100];
        r.read_exact(&mut buf).unwrap();
        assert_eq!(&buf[..], &data[..100]);
        assert_eq!(r.position(), 100);
        assert!(!r.is_exhausted());
        assert!(r.take_error().is_none());
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn io_reader_keeps_the_failure() {
        let mut r = IoReader::new(BufReader::new(Failing));
        assert_eq!(r.read_u8(), Err(Exhausted));
        let e = r.take_error().expect("error recorded");
        assert_eq!(e.to_string(), "disk on fire");
    }
}
