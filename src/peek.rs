use std::fmt::{Debug, Formatter};
use std::io::{self, IoSliceMut, Read};

#[derive(Debug, thiserror::Error)]
pub enum PeekError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("stream ended after {available} bytes while peeking {requested}")]
    InsufficientData { requested: usize, available: usize },
}

/// A reader that can look at upcoming bytes without consuming them.
///
/// `PeekReader` buffers exactly as much of the source as a peek asks for.
/// Reads drain the buffer first and then go straight to the source, so once
/// the peeked prefix has been delivered the wrapper adds a single indirection
/// and nothing else: bulk reads like [`Read::read_to_end`] and
/// [`Read::read_vectored`] are forwarded to the source's own implementations.
///
/// The source is owned for the lifetime of the `PeekReader`; [`into_inner`]
/// hands it back.
///
/// [`into_inner`]: PeekReader::into_inner
pub struct PeekReader<R> {
    inner: R,
    // Peeked bytes not yet delivered live in buffer[pos..].
    buffer: Vec<u8>,
    pos: usize,
}

impl<R: Read> PeekReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            pos: 0,
        }
    }

    /// Returns the next `n` bytes of the stream without consuming them.
    ///
    /// Repeated calls with the same or a smaller `n` return the same bytes
    /// and perform no further reads on the source. A larger `n` grows the
    /// buffered prefix. After reads have started, the peek window covers the
    /// bytes the next `read` call will see.
    ///
    /// Fails with [`PeekError::InsufficientData`] when the source ends before
    /// `n` bytes are available; whatever was buffered stays readable.
    pub fn peek(&mut self, n: usize) -> Result<&[u8], PeekError> {
        let available = self.fill_to(n)?;
        if available < n {
            return Err(PeekError::InsufficientData {
                requested: n,
                available,
            });
        }
        Ok(&self.buffer[self.pos..self.pos + n])
    }

    /// Like [`peek`](PeekReader::peek), but a source shorter than `n` bytes
    /// yields the short slice instead of an error.
    pub fn peek_to(&mut self, n: usize) -> io::Result<&[u8]> {
        let available = self.fill_to(n)?;
        Ok(&self.buffer[self.pos..self.pos + n.min(available)])
    }

    /// The bytes that have been peeked but not yet delivered by `read`.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[self.pos..]
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Reading from the source directly desynchronizes the peek buffer.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the source, discarding any peeked bytes not yet delivered.
    pub fn into_inner(self) -> R {
        self.inner
    }

    // Grow the undelivered region to `n` bytes with a single fill pass over
    // the source, stopping early at end of stream. Never discards bytes that
    // are already buffered.
    fn fill_to(&mut self, n: usize) -> io::Result<usize> {
        let buffered = self.buffer.len() - self.pos;
        if buffered < n {
            if self.pos > 0 {
                self.buffer.drain(..self.pos);
                self.pos = 0;
            }
            let missing = (n - buffered) as u64;
            self.inner.by_ref().take(missing).read_to_end(&mut self.buffer)?;
        }
        Ok(self.buffer.len() - self.pos)
    }

    // Drop the buffer the moment it is drained. Every read from here on
    // goes straight to the source.
    fn release(&mut self) {
        debug_assert_eq!(self.pos, self.buffer.len());
        self.buffer = Vec::new();
        self.pos = 0;
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.buffer.len() {
            let n = buf.len().min(self.buffer.len() - self.pos);
            buf[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
            self.pos += n;
            if self.pos == self.buffer.len() {
                self.release();
            }
            return Ok(n);
        }
        self.inner.read(buf)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        if self.pos < self.buffer.len() {
            let mut delivered = 0;
            for buf in bufs.iter_mut() {
                let n = buf.len().min(self.buffer.len() - self.pos);
                buf[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
                self.pos += n;
                delivered += n;
                if self.pos == self.buffer.len() {
                    self.release();
                    break;
                }
            }
            return Ok(delivered);
        }
        self.inner.read_vectored(bufs)
    }

    fn read_to_end(&mut self, out: &mut Vec<u8>) -> io::Result<usize> {
        let mut drained = 0;
        if self.pos < self.buffer.len() {
            out.extend_from_slice(&self.buffer[self.pos..]);
            drained = self.buffer.len() - self.pos;
            self.pos = self.buffer.len();
            self.release();
        }
        Ok(drained + self.inner.read_to_end(out)?)
    }

    fn read_to_string(&mut self, out: &mut String) -> io::Result<usize> {
        let mut bytes = Vec::new();
        let n = self.read_to_end(&mut bytes)?;
        let s = std::str::from_utf8(&bytes).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8")
        })?;
        out.push_str(s);
        Ok(n)
    }
}

impl<R> Debug for PeekReader<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeekReader")
            .field("buffered", &(self.buffer.len() - self.pos))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{read_vec, CountingReader, FailingReader, TrickleReader};
    use assert_matches::assert_matches;

    const GZIP_HEAD: [u8; 6] = [0x1f, 0x8b, 0x08, 0x00, 0x01, 0x02];

    #[test]
    fn peek_then_read_replays_everything() {
        let mut reader = PeekReader::new(&GZIP_HEAD[..]);
        assert_eq!(reader.peek(3).unwrap(), [0x1f, 0x8b, 0x08]);
        assert_eq!(read_vec(&mut reader), GZIP_HEAD);
    }

    #[test]
    fn peek_is_idempotent() {
        let mut reader = PeekReader::new(CountingReader::new(&GZIP_HEAD[..]));
        let first = reader.peek(4).unwrap().to_vec();
        let fills = reader.get_ref().reads();
        assert_eq!(reader.peek(4).unwrap(), first);
        assert_eq!(reader.peek(2).unwrap(), &first[..2]);
        assert_eq!(reader.get_ref().reads(), fills);
    }

    #[test]
    fn growing_peeks_extend_the_buffer() {
        let mut reader = PeekReader::new(&GZIP_HEAD[..]);
        assert_eq!(reader.peek(2).unwrap(), &GZIP_HEAD[..2]);
        assert_eq!(reader.peek(5).unwrap(), &GZIP_HEAD[..5]);
        assert_eq!(read_vec(&mut reader), GZIP_HEAD);
    }

    #[test]
    fn short_stream_reports_insufficient_data() {
        let mut reader = PeekReader::new(&b"ab"[..]);
        assert_matches!(
            reader.peek(3),
            Err(PeekError::InsufficientData {
                requested: 3,
                available: 2
            })
        );
        // The bytes that were available stay readable.
        assert_eq!(read_vec(&mut reader), b"ab");
    }

    #[test]
    fn peek_to_tolerates_short_streams() {
        let mut reader = PeekReader::new(&b"ab"[..]);
        assert_eq!(reader.peek_to(3).unwrap(), b"ab");
        assert_eq!(reader.peek_to(3).unwrap(), b"ab");

        let mut empty = PeekReader::new(&b""[..]);
        assert_eq!(empty.peek_to(3).unwrap(), b"");
        assert_eq!(read_vec(&mut empty), b"");
    }

    #[test]
    fn source_errors_are_propagated() {
        let mut reader = PeekReader::new(FailingReader);
        assert_matches!(reader.peek(3), Err(PeekError::Io(_)));
    }

    #[test]
    fn pass_through_skips_the_buffer() {
        let mut reader = PeekReader::new(CountingReader::new(&GZIP_HEAD[..]));
        reader.peek(3).unwrap();

        let mut head = [0u8; 6];
        assert_eq!(reader.read(&mut head).unwrap(), 3);
        assert!(reader.buffered().is_empty());

        let fills = reader.get_ref().reads();
        assert_eq!(reader.read(&mut head[3..]).unwrap(), 3);
        assert_eq!(reader.get_ref().reads(), fills + 1);
        assert_eq!(head, GZIP_HEAD);
    }

    #[test]
    fn peek_after_partial_read_covers_upcoming_bytes() {
        let mut reader = PeekReader::new(&GZIP_HEAD[..]);
        reader.peek(4).unwrap();

        let mut two = [0u8; 2];
        reader.read_exact(&mut two).unwrap();
        assert_eq!(two, GZIP_HEAD[..2]);

        assert_eq!(reader.peek(3).unwrap(), &GZIP_HEAD[2..5]);
        assert_eq!(read_vec(&mut reader), GZIP_HEAD[2..]);
    }

    #[test]
    fn trickle_source_accumulates_partial_reads() {
        let mut reader = PeekReader::new(TrickleReader::new(GZIP_HEAD));
        assert_eq!(reader.peek(5).unwrap(), &GZIP_HEAD[..5]);
        assert_eq!(read_vec(&mut reader), GZIP_HEAD);
    }

    #[test]
    fn read_to_end_counts_prefix_and_remainder_once() {
        let mut reader = PeekReader::new(&GZIP_HEAD[..]);
        reader.peek(3).unwrap();

        let mut out = Vec::new();
        assert_eq!(reader.read_to_end(&mut out).unwrap(), GZIP_HEAD.len());
        assert_eq!(out, GZIP_HEAD);
    }

    #[test]
    fn read_to_string_replays_the_prefix() {
        let mut reader = PeekReader::new(&b"hello world"[..]);
        reader.peek(5).unwrap();

        let mut out = String::new();
        assert_eq!(reader.read_to_string(&mut out).unwrap(), 11);
        assert_eq!(out, "hello world");
    }

    #[test]
    fn read_vectored_drains_the_buffer_first() {
        let mut reader = PeekReader::new(&GZIP_HEAD[..]);
        reader.peek(4).unwrap();

        let (mut a, mut b) = ([0u8; 2], [0u8; 8]);
        let mut bufs = [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)];
        assert_eq!(reader.read_vectored(&mut bufs).unwrap(), 4);
        assert_eq!(a, GZIP_HEAD[..2]);
        assert_eq!(b[..2], GZIP_HEAD[2..4]);
        assert_eq!(read_vec(&mut reader), GZIP_HEAD[4..]);
    }

    #[test]
    fn large_payload_is_delivered_intact() {
        let mut payload = GZIP_HEAD.to_vec();
        payload.resize(4 * 1024 * 1024, b'A');

        let mut reader = PeekReader::new(payload.as_slice());
        assert_eq!(reader.peek(3).unwrap(), &payload[..3]);
        let delivered = read_vec(&mut reader);
        assert_eq!(delivered.len(), payload.len());
        assert_eq!(delivered, payload);
    }

    #[test]
    fn end_of_stream_is_reported_once_and_cleanly() {
        let mut reader = PeekReader::new(&b"ab"[..]);
        reader.peek(2).unwrap();
        assert_eq!(read_vec(&mut reader), b"ab");

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
