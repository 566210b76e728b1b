use std::io::{self, IoSliceMut, Read};

use strum::Display;
use tracing::debug;

use crate::peek::PeekReader;

/// ID1, ID2 and the deflate compression method byte. RFC 1952 § 2.3.1.
pub const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StreamFormat {
    Gzip,
    Unknown,
}

impl StreamFormat {
    /// Classify a stream by its magic prefix without consuming anything:
    /// the reader still replays the stream from its first byte afterwards.
    ///
    /// Streams shorter than the magic classify as [`StreamFormat::Unknown`].
    pub fn detect<R: Read>(reader: &mut PeekReader<R>) -> io::Result<StreamFormat> {
        let head = reader.peek_to(GZIP_MAGIC.len())?;
        if infer::archive::is_gz(head) {
            debug!("detected gzip stream");
            Ok(StreamFormat::Gzip)
        } else {
            debug!("no known signature");
            Ok(StreamFormat::Unknown)
        }
    }
}

/// A classified stream: the detected format together with a reader that
/// yields the complete original byte sequence, magic prefix included.
#[derive(Debug)]
pub struct DetectedStream<R: Read> {
    pub format: StreamFormat,
    inner: PeekReader<R>,
}

impl<R: Read> DetectedStream<R> {
    pub fn from_reader(reader: R) -> io::Result<Self> {
        let mut inner = PeekReader::new(reader);
        let format = StreamFormat::detect(&mut inner)?;
        Ok(Self { format, inner })
    }

    pub fn get_ref(&self) -> &PeekReader<R> {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut PeekReader<R> {
        &mut self.inner
    }

    pub fn into_inner(self) -> PeekReader<R> {
        self.inner
    }
}

impl<R: Read> Read for DetectedStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        self.inner.read_vectored(bufs)
    }

    fn read_to_end(&mut self, out: &mut Vec<u8>) -> io::Result<usize> {
        self.inner.read_to_end(out)
    }
}
