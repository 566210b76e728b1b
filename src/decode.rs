use std::io::{self, Read};

use flate2::read::MultiGzDecoder;

use crate::format::{DetectedStream, StreamFormat};
use crate::peek::PeekReader;

/// A reader that transparently decompresses gzip input and passes any other
/// input through unchanged.
///
/// Gzip streams are decoded from their first byte: the peeked magic is
/// replayed into the decoder, which expects to see the full header.
#[derive(Debug)]
pub enum AutoDecoder<R: Read> {
    Gzip(MultiGzDecoder<PeekReader<R>>),
    Plain(PeekReader<R>),
}

impl<R: Read> AutoDecoder<R> {
    pub fn from_reader(reader: R) -> io::Result<Self> {
        let detected = DetectedStream::from_reader(reader)?;
        Ok(match detected.format {
            StreamFormat::Gzip => AutoDecoder::Gzip(MultiGzDecoder::new(detected.into_inner())),
            StreamFormat::Unknown => AutoDecoder::Plain(detected.into_inner()),
        })
    }

    pub fn format(&self) -> StreamFormat {
        match self {
            AutoDecoder::Gzip(_) => StreamFormat::Gzip,
            AutoDecoder::Plain(_) => StreamFormat::Unknown,
        }
    }

    pub fn get_ref(&self) -> &PeekReader<R> {
        match self {
            AutoDecoder::Gzip(reader) => reader.get_ref(),
            AutoDecoder::Plain(reader) => reader,
        }
    }

    pub fn into_inner(self) -> PeekReader<R> {
        match self {
            AutoDecoder::Gzip(reader) => reader.into_inner(),
            AutoDecoder::Plain(reader) => reader,
        }
    }
}

impl<R: Read> Read for AutoDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            AutoDecoder::Gzip(reader) => reader.read(buf),
            AutoDecoder::Plain(reader) => reader.read(buf),
        }
    }

    fn read_to_end(&mut self, out: &mut Vec<u8>) -> io::Result<usize> {
        match self {
            AutoDecoder::Gzip(reader) => reader.read_to_end(out),
            AutoDecoder::Plain(reader) => reader.read_to_end(out),
        }
    }
}
