//! Peek at the head of a byte stream without consuming it.
//!
//! [`PeekReader`] wraps any [`std::io::Read`] and lets a caller inspect the
//! next few bytes, decide what the stream is, and then read the complete
//! original byte sequence as if nothing had happened. It stays the single
//! handle on the source for its whole life, so after the peeked prefix has
//! been delivered all reads go straight through to the source and its bulk
//! read paths.
//!
//! ```
//! use std::io::Read;
//! use peekstream::{PeekReader, GZIP_MAGIC};
//!
//! let data: &[u8] = &[0x1f, 0x8b, 0x08, 0x00, 0x01, 0x02];
//! let mut reader = PeekReader::new(data);
//! assert_eq!(reader.peek(3)?, GZIP_MAGIC);
//!
//! let mut replayed = Vec::new();
//! reader.read_to_end(&mut replayed)?;
//! assert_eq!(replayed, data);
//! # Ok::<(), peekstream::PeekError>(())
//! ```
//!
//! [`StreamFormat::detect`] and [`AutoDecoder`] build the common use case on
//! top: classify a stream as gzip by its magic bytes and, if wanted,
//! decompress it in place.

mod decode;
mod format;
mod peek;


pub use decode::AutoDecoder;
pub use format::{DetectedStream, StreamFormat, GZIP_MAGIC};
pub use peek::{PeekError, PeekReader};
