//! # transread
//!
//! Transparent, forward-only reading of files that may be local or remote,
//! plain or compressed.
//!
//! [`open`] takes a local path or an HTTP(S) URL and returns a [`TransRead`]
//! that yields the decompressed bytes. The compression format is picked from
//! the name's suffix:
//!
//! | Suffix                | Content                                  |
//! |-----------------------|------------------------------------------|
//! | `.gz`                 | gzip                                     |
//! | `.bz2`                | bzip2                                    |
//! | `.tar.gz`, `.tgz`     | gzip-compressed tarball with one member  |
//! | `.tar.bz2`            | bzip2-compressed tarball with one member |
//! | anything else         | read as is                               |
//!
//! A path is always tried as a local file first; only when no such file
//! exists is it fetched as a URL.
//!
//! Seeking is emulated by reading and discarding data, so only forward seeks
//! are supported.
//!
//! ## Example
//!
//! ```no_run
//! use std::io::SeekFrom;
//!
//! fn main() -> transread::Result<()> {
//!     let mut reader = transread::open("https://example.com/disk.img.bz2")?;
//!
//!     // Skip the first MiB, then read the next 4 KiB
//!     reader.seek(SeekFrom::Start(1 << 20))?;
//!     let block = reader.read_chunk(4096)?;
//!     println!("read {} bytes, now at {}", block.len(), reader.tell());
//!
//!     reader.close();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod format;
pub mod io;
pub mod reader;
pub mod stream;

pub use cli::Cli;
pub use error::{Error, FormatError, OpenError, Result, SeekError};
pub use format::{Format, SUPPORTED_SUFFIXES};
pub use reader::{OpenOptions, TransRead, open};
pub use stream::{CompressedStream, Decompress, ForwardSeek, TransStream};
