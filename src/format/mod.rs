//! Format dispatch.
//!
//! The format is chosen from the name's suffix alone; the bytes themselves
//! are never sniffed. Unknown suffixes are read as uncompressed data.

mod tarball;

use std::fmt;

use log::debug;

use crate::error::Result;
use crate::io::{RawChannel, Source};
use crate::reader::OpenOptions;
use crate::stream::{Bzip2, CompressedStream, Decompress, ForwardSeek, Gzip, NativeSeek, TransStream};

/// Suffixes recognised as compressed.
pub const SUPPORTED_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".tar.bz2", ".gz", ".bz2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    TarGzip,
    TarBzip2,
    Gzip,
    Bzip2,
    Uncompressed,
}

impl Format {
    /// Pick the format from the suffix of a path or URL.
    ///
    /// The query string and fragment of a URL are not part of the suffix.
    pub fn detect(name: &str) -> Self {
        let name = if name.contains("://") {
            name.split(['?', '#']).next().unwrap_or(name)
        } else {
            name
        };

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Format::TarGzip
        } else if name.ends_with(".tar.bz2") {
            Format::TarBzip2
        } else if name.ends_with(".gz") {
            Format::Gzip
        } else if name.ends_with(".bz2") {
            Format::Bzip2
        } else {
            Format::Uncompressed
        }
    }

    pub fn is_compressed(self) -> bool {
        self != Format::Uncompressed
    }

    pub fn is_tarball(self) -> bool {
        matches!(self, Format::TarGzip | Format::TarBzip2)
    }

    /// A fresh decompression function for this format, if it needs one.
    pub fn decompressor(self) -> Option<Box<dyn Decompress>> {
        match self {
            Format::TarGzip | Format::Gzip => Some(Box::new(Gzip::new())),
            Format::TarBzip2 | Format::Bzip2 => Some(Box::new(Bzip2::new())),
            Format::Uncompressed => None,
        }
    }

    fn decompressed(self, channel: RawChannel, options: &OpenOptions) -> CompressedStream<RawChannel> {
        CompressedStream::new(channel, self.decompressor()).with_chunk_size(options.chunk_size)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::TarGzip => "tar.gz",
            Format::TarBzip2 => "tar.bz2",
            Format::Gzip => "gz",
            Format::Bzip2 => "bz2",
            Format::Uncompressed => "uncompressed",
        };
        f.write_str(name)
    }
}

/// The head of an assembled stream chain.
pub struct Chain {
    pub stream: Box<dyn TransStream>,
    /// Size of the decompressed content, when it is known upfront
    pub size: Option<u64>,
}

/// Build the stream chain for an opened source.
pub fn open(source: Source, format: Format, options: &OpenOptions) -> Result<Chain> {
    debug!("reading '{}' as {}", source.name, format);

    if format.is_tarball() {
        let (stream, size) = tarball::open_member(source, format, options)?;
        return Ok(Chain {
            stream,
            size: Some(size),
        });
    }

    let chain = match (format, source.channel) {
        (Format::Uncompressed, RawChannel::Local(file)) => Chain {
            stream: Box::new(NativeSeek::new(file)),
            size: source.size,
        },
        (Format::Uncompressed, RawChannel::Remote(stream)) => Chain {
            stream: Box::new(ForwardSeek::new(stream)),
            size: None,
        },
        (format, channel) => Chain {
            stream: Box::new(ForwardSeek::new(format.decompressed(channel, options))),
            size: None,
        },
    };
    Ok(chain)
}
