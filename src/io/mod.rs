//! Source resolution.
//!
//! A path is first opened as a local file. Only when that fails because the
//! path does not exist is it treated as an HTTP(S) URL.

mod http;
mod local;

pub use http::HttpStream;
pub use local::LocalFile;

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use log::debug;

use crate::error::{OpenError, Result};
use crate::reader::OpenOptions;

/// The raw, not yet decompressed byte channel of a [`Source`].
pub enum RawChannel {
    Local(LocalFile),
    Remote(HttpStream),
}

impl Read for RawChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            RawChannel::Local(file) => file.read(buf),
            RawChannel::Remote(stream) => stream.read(buf),
        }
    }
}

/// An opened file or URL.
pub struct Source {
    /// The path or URL exactly as given by the caller
    pub name: String,
    pub is_remote: bool,
    /// Size of the raw bytes, known only for local files
    pub size: Option<u64>,
    pub channel: RawChannel,
}

impl Source {
    /// Open `name` as a local file, falling back to a URL if no such file exists.
    pub fn open(name: &str, options: &OpenOptions) -> Result<Self> {
        match LocalFile::open(Path::new(name)) {
            Ok(file) => {
                debug!("opened local file '{}' ({} bytes)", name, file.size());
                Ok(Self {
                    name: name.to_string(),
                    is_remote: false,
                    size: Some(file.size()),
                    channel: RawChannel::Local(file),
                })
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("'{}' is not a local file, trying it as a URL", name);
                let stream = HttpStream::open(name, options)?;
                Ok(Self {
                    name: name.to_string(),
                    is_remote: true,
                    size: None,
                    channel: RawChannel::Remote(stream),
                })
            }
            Err(source) => Err(OpenError::File {
                path: name.to_string(),
                source,
            }
            .into()),
        }
    }

    /// Counter of bytes received from the network, for remote sources.
    pub fn transfer_counter(&self) -> Option<Arc<AtomicU64>> {
        match &self.channel {
            RawChannel::Remote(stream) => Some(stream.transfer_counter()),
            RawChannel::Local(_) => None,
        }
    }
}
