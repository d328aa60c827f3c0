//! The stream chain.
//!
//! A chain is built once when a file is opened and never restructured:
//!
//! ```text
//! raw source -> CompressedStream (optional) -> ForwardSeek / NativeSeek
//! ```
//!
//! Each layer owns the one below it, so dropping the head of the chain
//! releases every layer, outermost first.

mod compressed;
mod decompress;
mod seek;

pub use compressed::{CompressedStream, DEFAULT_CHUNK_SIZE};
pub use decompress::{Bzip2, Decompress, Gzip};
pub use seek::{ForwardSeek, NativeSeek};

use std::io::{Read, SeekFrom};

use crate::error::Result;

/// Interface shared by every head of a stream chain.
pub trait TransStream: Read + Send {
    /// Number of bytes delivered to the caller so far.
    fn tell(&self) -> u64;

    /// Move forward to `pos`, which must not lie behind [`tell`](Self::tell).
    ///
    /// Only `SeekFrom::Start` and `SeekFrom::Current` are accepted. Returns
    /// the new position.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;
}
